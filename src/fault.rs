//! Terminal fault handling.
//!
//! Counterpart of the CubeMX `Error_Handler`: once a fault is latched the
//! board stays in a safe state until the MCU is reset.

use core::time::Duration;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::timer::CountDown;
use log::{error, warn};

use crate::bus::SignalBus;
use crate::error::{Error, FaultReason, Result};
use crate::led::{self, BusLed, Led, NoLed, Pattern};
use crate::signal::{Level, Port, Role, SignalDescriptor};
use crate::state::SupervisorState;
use crate::supervisor::Supervisor;


// - Halt ---------------------------------------------------------------------

/// What the MCU does once the fault state has been entered.
pub trait Halt {
    fn halt<L, D>(&mut self, reason: FaultReason, indicator: &mut L, delay: &mut D, pattern: Pattern) -> !
    where
        L: Led,
        D: DelayMs<u32>;
}

/// Blinks the indicator forever.
#[derive(Default)]
pub struct Park;

impl Halt for Park {
    fn halt<L, D>(&mut self, _reason: FaultReason, indicator: &mut L, delay: &mut D, pattern: Pattern) -> !
    where
        L: Led,
        D: DelayMs<u32>,
    {
        loop {
            led::blink(indicator, delay, pattern);
        }
    }
}


// - fault state --------------------------------------------------------------

impl<B, T, D, H> Supervisor<B, T, D, H>
where
    B: SignalBus,
    T: CountDown<Time = Duration>,
    D: DelayMs<u32>,
    H: Halt,
{
    /// Latches `reason` and drives the safe outputs without halting.
    ///
    /// Returns `true` for the call that entered the fault state. Later calls
    /// keep the first reason and only drive the safe outputs again.
    pub fn record_fault(&mut self, reason: FaultReason) -> bool {
        let first = self.state.transition(SupervisorState::Faulted).is_ok();

        if first {
            error!("FAULT: {}", reason);
            self.fault = Some(reason);
        } else {
            warn!("FAULT: {} (already faulted: {:?})", reason, self.fault);
        }

        self.drive_safe_outputs();
        first
    }

    /// Runtime fault entry for collaborators once the board is up.
    pub fn report_fault(&mut self, reason: FaultReason) -> Result<bool> {
        match self.state {
            SupervisorState::Ready | SupervisorState::Faulted => Ok(self.record_fault(reason)),
            state => Err(Error::InvalidState(state)),
        }
    }

    /// Enters the terminal fault state and never returns.
    ///
    /// Safe to call repeatedly; only the first reason is kept. After the safe
    /// outputs are driven the indicator is handed to the configured [`Halt`],
    /// which either parks the MCU or resets it.
    pub fn enter_fault_state(&mut self, reason: FaultReason) -> ! {
        self.record_fault(reason);

        let reason = self.fault.unwrap_or(reason);
        let pattern = self.config.fault_blink;
        match self.registry.indicator() {
            Some(signal) => {
                let mut indicator = BusLed::new(&mut self.bus, signal);
                self.halt.halt(reason, &mut indicator, &mut self.delay, pattern)
            }
            None => self.halt.halt(reason, &mut NoLed, &mut self.delay, pattern),
        }
    }

    /// Rails off, devices held in reset, interrupt lines masked, indicator
    /// on. Bus errors are logged and skipped so that one broken line cannot
    /// keep the others live.
    fn drive_safe_outputs(&mut self) {
        for signal in self.registry.iter() {
            if let Some(irq) = signal.interrupt {
                if let Err(e) = self.bus.disarm(signal, irq) {
                    error!("{}: disarm failed: {:?}", signal, e);
                }
            }

            if signal.is_output() {
                if let Err(e) = self.bus.assert(signal, safe_level(signal)) {
                    error!("{}: safe state failed: {:?}", signal, e);
                }
            }
        }
    }
}

/// Whether `signal` is asserted in the fault state.
pub fn safe_level(signal: &SignalDescriptor) -> bool {
    matches!(signal.role, Role::Reset | Role::Indicator)
}

/// BSRR words that put every output of `signals` at its fault-state level,
/// indexed by [`Port::index`](crate::signal::Port::index). Ports without
/// outputs get `0`.
pub fn safe_bsrr(signals: &[SignalDescriptor]) -> [u32; Port::COUNT] {
    let mut words = [0; Port::COUNT];

    for signal in signals.iter().filter(|s| s.is_output()) {
        let bit = match signal.level(safe_level(signal)) {
            Level::High => signal.pin,
            Level::Low => signal.pin + 16,
        };
        words[usize::from(signal.port.index())] |= 1 << bit;
    }

    words
}


// - tests --------------------------------------------------------------------
