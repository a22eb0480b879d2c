#![no_main]
#![no_std]

use cortex_m_rt::{entry, exception, ExceptionFrame};
use panic_halt as _;

use oro_link as oro;
use oro::board::{error_handler, force_safe_outputs, install, with_supervisor, Board};
use oro::hal;
use oro::pac;
use oro::led::{self, Led};
use oro::{pins, Config, Error};
use hal::prelude::*;
use pac::interrupt;


// - entry-point --------------------------------------------------------------

#[entry]
fn main() -> ! {
    #[cfg(feature = "log-semihosting")]
    oro::logger::init(log::LevelFilter::Info);

    // - board setup ----------------------------------------------------------

    let board = Board::take().unwrap();

    let cp = cortex_m::Peripherals::take().unwrap();
    let dp = pac::Peripherals::take().unwrap();

    let clocks = board.freeze_clocks(dp.RCC.constrain());

    let pins = board.split_gpios(
        dp.GPIOB.split(),
        dp.GPIOC.split(),
        dp.GPIOD.split(),
        dp.GPIOE.split(),
    );

    let config = Config::DEFAULT.with_power_retries(2);
    let supervisor = match board.supervisor(pins, dp.SYSCFG, dp.EXTI, dp.TIM2, cp.SYST, &clocks, config) {
        Ok(supervisor) => supervisor,
        Err(e) => panic!("{}", e),
    };

    // the EXTI handlers need the supervisor as soon as the lines are armed
    install(supervisor);

    // - bring-up -------------------------------------------------------------

    // runs in a critical section, armed lines fire once it completes
    match with_supervisor(|supervisor| supervisor.initialize()) {
        Some(Ok(ready)) => log::info!("ready, {} resets released, {} interrupts armed",
                                      ready.released(), ready.armed()),
        Some(Err(Error::Fault(reason))) => error_handler(reason),
        Some(Err(e)) => panic!("{}", e),
        None => unreachable!(),
    }

    // - main loop ------------------------------------------------------------

    let mut indicator = Indicator;
    let mut delay = dp.TIM5.delay_ms(&clocks);

    loop {
        match with_supervisor(|supervisor| supervisor.check_power()) {
            Some(Err(Error::Fault(reason))) => error_handler(reason),
            Some(Err(e)) => log::warn!("{}", e),
            _ => (),
        }

        led::blink(&mut indicator, &mut delay, config.heartbeat);
    }
}


// - heartbeat ----------------------------------------------------------------

/// Debug LED through the installed supervisor, one short critical section
/// per edge so the PHY interrupts keep running while the heartbeat waits.
struct Indicator;

impl Led for Indicator {
    fn on(&mut self) {
        with_supervisor(|supervisor| supervisor.indicate(true));
    }

    fn off(&mut self) {
        with_supervisor(|supervisor| supervisor.indicate(false));
    }
}


// - interrupts ---------------------------------------------------------------

#[interrupt]
fn EXTI1() {
    phy_interrupt(pins::ETH1_INT);
}

#[interrupt]
fn EXTI9_5() {
    phy_interrupt(pins::ETH2_INT);
}

fn phy_interrupt(name: &'static str) {
    with_supervisor(|supervisor| {
        let signal = match supervisor.registry().resolve(name) {
            Ok(signal) => *signal,
            Err(_) => return,
        };
        if supervisor.bus_mut().clear_pending(&signal).is_ok() {
            log::info!("{} asserted", signal);
        }
    });
}


// - exceptions ---------------------------------------------------------------

#[exception]
unsafe fn HardFault(_frame: &ExceptionFrame) -> ! {
    force_safe_outputs();
    loop {
        cortex_m::asm::nop();
    }
}
