//! STM32F479 binding of the supervisor.

use core::cell::RefCell;
use core::sync::atomic::{compiler_fence, Ordering};

use cortex_m::interrupt::Mutex;
use cortex_m::peripheral::{NVIC, SCB};
use embedded_hal::blocking::delay::DelayMs;

use crate::hal;
use hal::gpio::{gpiob, gpioc, gpiod, gpioe, Edge, ErasedPin, ExtiPin, Input, Output, PushPull};
use hal::pac;
use hal::prelude::*;
use hal::rcc::Clocks;
use hal::syscfg::SysCfg;
use hal::timer::SysDelay;

use crate::bus::SignalBus;
use crate::config::Config;
use crate::error::{FaultReason, Result};
use crate::fault::{self, Halt};
use crate::led::{Led, Pattern};
use crate::pins::{self, Pins};
use crate::registry::PinRegistry;
use crate::signal::{ActiveLevel, ExtiIrq, Level, SignalDescriptor};
use crate::supervisor::Supervisor;
use crate::timer::CountDownTimer;
use crate::clocks;


// - types --------------------------------------------------------------------

#[cfg(not(feature = "fault-reset"))]
pub type BoardHalt = crate::fault::Park;
#[cfg(feature = "fault-reset")]
pub type BoardHalt = SystemReset;

pub type BoardSupervisor = Supervisor<Signals, CountDownTimer<pac::TIM2>, SysDelay, BoardHalt>;


// - global static state ------------------------------------------------------

// `no_mangle` is used here to prevent linking different minor
// versions of this crate as that would let you `take` the board
// more than once (one per minor version)
#[no_mangle]
static ORO_LINK_BOARD: () = ();

/// Set to `true` when `take` was called to make `Board` a singleton.
static mut TAKEN: bool = false;

static SUPERVISOR: Mutex<RefCell<Option<BoardSupervisor>>> = Mutex::new(RefCell::new(None));


// - Board --------------------------------------------------------------------

pub struct Board;

impl Board {
    #[inline]
    pub fn take() -> Option<Self> {
        cortex_m::interrupt::free(|_| {
            if unsafe { TAKEN } {
                None
            } else {
                unsafe { TAKEN = true; }
                Some(unsafe { Board::steal() })
            }
        })
    }

    #[inline]
    pub unsafe fn steal() -> Self {
        Board
    }

    pub fn freeze_clocks(&self, rcc: hal::rcc::Rcc) -> Clocks {
        clocks::configure(rcc)
    }

    /// Takes the board's GPIO peripherals and splits out the pins of the
    /// board signals.
    pub fn split_gpios(&self,
                       gpiob: gpiob::Parts,
                       gpioc: gpioc::Parts,
                       gpiod: gpiod::Parts,
                       gpioe: gpioe::Parts) -> Pins {
        Pins::new(gpiob, gpioc, gpiod, gpioe)
    }

    /// Builds the supervisor over the board pins. TIM2 paces the bounded
    /// waits, SysTick the fixed delays. SYSCFG and EXTI route the interrupt
    /// lines.
    pub fn supervisor(&self,
                      pins: Pins,
                      syscfg: pac::SYSCFG,
                      exti: pac::EXTI,
                      tim2: pac::TIM2,
                      syst: pac::SYST,
                      clocks: &Clocks,
                      config: Config) -> Result<BoardSupervisor> {
        let registry = PinRegistry::board()?;
        let signals = Signals::new(pins, syscfg.constrain(), exti);
        let timer = CountDownTimer::new(tim2.counter_ms(clocks));
        let delay = syst.delay(clocks);

        Ok(Supervisor::new(registry, config, signals, timer, delay, BoardHalt::default()))
    }
}


// - Error_Handler ------------------------------------------------------------

/// Hands the supervisor over to interrupt context and `error_handler`.
pub fn install(supervisor: BoardSupervisor) {
    cortex_m::interrupt::free(|cs| {
        *SUPERVISOR.borrow(cs).borrow_mut() = Some(supervisor);
    });
}

/// Runs `f` on the installed supervisor inside a critical section.
pub fn with_supervisor<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut BoardSupervisor) -> R,
{
    cortex_m::interrupt::free(|cs| SUPERVISOR.borrow(cs).borrow_mut().as_mut().map(f))
}

/// Terminal failure entry point, callable from any context.
///
/// Enters the installed supervisor's fault state. Without a reachable
/// supervisor the safe levels are forced straight into the GPIO registers
/// and the core parks with interrupts disabled.
pub fn error_handler(reason: FaultReason) -> ! {
    cortex_m::interrupt::free(|cs| {
        if let Ok(mut slot) = SUPERVISOR.borrow(cs).try_borrow_mut() {
            if let Some(supervisor) = slot.as_mut() {
                supervisor.enter_fault_state(reason);
            }
        }
    });

    log::error!("FAULT: {} (no supervisor)", reason);
    cortex_m::interrupt::disable();
    force_safe_outputs();
    loop {
        compiler_fence(Ordering::SeqCst);
    }
}

/// Writes the fault-state level of every board output through BSRR,
/// bypassing the HAL. For use from exception handlers.
pub fn force_safe_outputs() {
    let words = fault::safe_bsrr(&pins::SIGNALS);

    // Safety: BSRR writes are atomic and only touch the bits set.
    macro_rules! write_bsrr {
        ($($GPIOX:ident: $index:expr,)+) => {
            $(
                if words[$index] != 0 {
                    unsafe { (*pac::$GPIOX::ptr()).bsrr.write(|w| w.bits(words[$index])) };
                }
            )+
        }
    }

    write_bsrr! {
        GPIOA: 0,
        GPIOB: 1,
        GPIOC: 2,
        GPIOD: 3,
        GPIOE: 4,
        GPIOF: 5,
        GPIOG: 6,
        GPIOH: 7,
        GPIOI: 8,
        GPIOJ: 9,
        GPIOK: 10,
    }
}


// - halts --------------------------------------------------------------------

/// Software reset through the SCB, leaving recovery to the next boot.
#[derive(Default)]
pub struct SystemReset;

impl Halt for SystemReset {
    fn halt<L, D>(&mut self, reason: FaultReason, indicator: &mut L, delay: &mut D, pattern: Pattern) -> !
    where
        L: Led,
        D: DelayMs<u32>,
    {
        log::error!("resetting after fault: {}", reason);
        // one flash so the reset is visible on the board
        crate::led::blink(indicator, delay, pattern);
        SCB::sys_reset()
    }
}


// - Signals ------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// No pin of the right direction is bound to the signal.
    Unbound(&'static str),
}

type SignalIn = ErasedPin<Input>;
type SignalOut = ErasedPin<Output<PushPull>>;

/// The board pins, erased and looked up by signal name, together with the
/// peripherals that route their interrupt lines.
pub struct Signals {
    outputs: [(&'static str, SignalOut); 8],
    inputs: [(&'static str, SignalIn); 3],
    syscfg: SysCfg,
    exti: pac::EXTI,
}

impl Signals {
    /// Outputs come up low: resets asserted, everything else off.
    pub fn new(pins: Pins, syscfg: SysCfg, exti: pac::EXTI) -> Self {
        Self {
            outputs: [
                (pins::ETH2_RST, pins.eth2_rst.into_push_pull_output().erase()),
                (pins::PSU_ON, pins.psu_on.into_push_pull_output().erase()),
                (pins::ETH1_RST, pins.eth1_rst.into_push_pull_output().erase()),
                (pins::DBG_LED, pins.dbg_led.into_push_pull_output().erase()),
                (pins::SYS_POWER, pins.sys_power.into_push_pull_output().erase()),
                (pins::SYS_RESET, pins.sys_reset.into_push_pull_output().erase()),
                (pins::OLED_DC, pins.oled_dc.into_push_pull_output().erase()),
                (pins::OLED_RST, pins.oled_rst.into_push_pull_output().erase()),
            ],
            inputs: [
                (pins::PSU_OK, pins.psu_ok.into_pull_down_input().erase()),
                // PHY interrupts are open drain
                (pins::ETH1_INT, pins.eth1_int.into_pull_up_input().erase()),
                (pins::ETH2_INT, pins.eth2_int.into_pull_up_input().erase()),
            ],
            syscfg,
            exti,
        }
    }

    /// Acknowledges an interrupt on `signal`. Call from its EXTI handler.
    pub fn clear_pending(&mut self, signal: &SignalDescriptor) -> core::result::Result<(), BusError> {
        find(&mut self.inputs, signal.name)?.clear_interrupt_pending_bit();
        Ok(())
    }
}

fn find<'a, P>(pins: &'a mut [(&'static str, P)], name: &'static str) -> core::result::Result<&'a mut P, BusError> {
    pins.iter_mut()
        .find(|(n, _)| *n == name)
        .map(|(_, pin)| pin)
        .ok_or(BusError::Unbound(name))
}

impl SignalBus for Signals {
    type Error = BusError;

    fn write(&mut self, signal: &SignalDescriptor, level: Level) -> core::result::Result<(), BusError> {
        let pin = find(&mut self.outputs, signal.name)?;
        match level {
            Level::High => pin.set_high(),
            Level::Low => pin.set_low(),
        }
        Ok(())
    }

    fn read(&mut self, signal: &SignalDescriptor) -> core::result::Result<Level, BusError> {
        if signal.is_output() {
            return find(&mut self.outputs, signal.name).map(|pin| Level::from(pin.is_set_high()));
        }
        find(&mut self.inputs, signal.name).map(|pin| Level::from(pin.is_high()))
    }

    fn arm(&mut self, signal: &SignalDescriptor, irq: ExtiIrq) -> core::result::Result<(), BusError> {
        let pin = find(&mut self.inputs, signal.name)?;

        // trigger on assertion
        let edge = match signal.active {
            ActiveLevel::Low => Edge::Falling,
            ActiveLevel::High => Edge::Rising,
        };

        pin.make_interrupt_source(&mut self.syscfg);
        pin.trigger_on_edge(&mut self.exti, edge);
        pin.clear_interrupt_pending_bit();
        pin.enable_interrupt(&mut self.exti);

        unsafe {
            NVIC::unmask(vector(irq));
        }

        Ok(())
    }

    fn disarm(&mut self, signal: &SignalDescriptor, _irq: ExtiIrq) -> core::result::Result<(), BusError> {
        let pin = find(&mut self.inputs, signal.name)?;

        // EXTI9_5 and EXTI15_10 are shared, the NVIC stays unmasked
        pin.disable_interrupt(&mut self.exti);
        pin.clear_interrupt_pending_bit();

        Ok(())
    }
}

fn vector(irq: ExtiIrq) -> pac::Interrupt {
    match irq {
        ExtiIrq::Exti0 => pac::Interrupt::EXTI0,
        ExtiIrq::Exti1 => pac::Interrupt::EXTI1,
        ExtiIrq::Exti2 => pac::Interrupt::EXTI2,
        ExtiIrq::Exti3 => pac::Interrupt::EXTI3,
        ExtiIrq::Exti4 => pac::Interrupt::EXTI4,
        ExtiIrq::Exti9_5 => pac::Interrupt::EXTI9_5,
        ExtiIrq::Exti15_10 => pac::Interrupt::EXTI15_10,
    }
}
