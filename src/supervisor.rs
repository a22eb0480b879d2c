//! Peripheral fault supervisor.
//!
//! Owns the board registry, the hardware it drives and the
//! [`SupervisorState`]. Bring-up lives in [`crate::initializer`], the fault
//! path in [`crate::fault`]; both act on this type so that nothing else can
//! move the state.

use core::fmt::Debug;
use core::time::Duration;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::timer::CountDown;

use crate::bus::SignalBus;
use crate::config::Config;
use crate::error::{Error, FaultReason, Result};
use crate::fault::Halt;
use crate::led::{self, BusLed};
use crate::registry::PinRegistry;
use crate::signal::{Role, SignalDescriptor};
use crate::state::SupervisorState;


// - Ready --------------------------------------------------------------------

/// Proof of a completed bring-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ready {
    pub(crate) released: u8,
    pub(crate) armed: u8,
}

impl Ready {
    /// Reset lines pulsed and released.
    pub fn released(&self) -> u8 {
        self.released
    }

    /// Interrupt lines armed.
    pub fn armed(&self) -> u8 {
        self.armed
    }
}


// - Supervisor ---------------------------------------------------------------

pub struct Supervisor<B, T, D, H> {
    pub(crate) registry: PinRegistry,
    pub(crate) config: Config,
    pub(crate) bus: B,
    pub(crate) timer: T,
    pub(crate) delay: D,
    pub(crate) halt: H,
    pub(crate) state: SupervisorState,
    pub(crate) fault: Option<FaultReason>,
}

impl<B, T, D, H> Supervisor<B, T, D, H>
where
    B: SignalBus,
    T: CountDown<Time = Duration>,
    D: DelayMs<u32>,
    H: Halt,
{
    pub fn new(registry: PinRegistry, config: Config, bus: B, timer: T, delay: D, halt: H) -> Self {
        Self {
            registry,
            config,
            bus,
            timer,
            delay,
            halt,
            state: SupervisorState::Uninitialized,
            fault: None,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// Reason latched by the first fault.
    pub fn fault(&self) -> Option<FaultReason> {
        self.fault
    }

    pub fn registry(&self) -> &PinRegistry {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Power supervision while Ready.
    ///
    /// Samples every power-good input and reports the first one that has
    /// dropped. The caller routes the reason into the fault state.
    pub fn check_power(&mut self) -> Result<()> {
        if self.state != SupervisorState::Ready {
            return Err(Error::InvalidState(self.state));
        }

        for signal in self.registry.with_role(Role::PowerGood) {
            match self.bus.is_asserted(signal) {
                Ok(true) => {}
                Ok(false) => {
                    log::warn!("{} dropped", signal);
                    return Err(FaultReason::HardwareFault(signal.name).into());
                }
                Err(e) => return Err(hardware_fault(signal, e).into()),
            }
        }

        Ok(())
    }

    /// Drives the debug LED while Ready. For callers that pace the blink
    /// themselves, e.g. outside a critical section.
    pub fn indicate(&mut self, on: bool) -> Result<()> {
        if self.state != SupervisorState::Ready {
            return Err(Error::InvalidState(self.state));
        }

        if let Some(signal) = self.registry.indicator() {
            drive(&mut self.bus, signal, on)?;
        }

        Ok(())
    }

    /// One heartbeat blink on the debug LED while Ready.
    pub fn heartbeat(&mut self) -> Result<()> {
        if self.state != SupervisorState::Ready {
            return Err(Error::InvalidState(self.state));
        }

        if let Some(signal) = self.registry.indicator() {
            let mut led = BusLed::new(&mut self.bus, signal);
            led::blink(&mut led, &mut self.delay, self.config.heartbeat);
        }

        Ok(())
    }
}


// - helpers ------------------------------------------------------------------

pub(crate) fn hardware_fault<E: Debug>(signal: &SignalDescriptor, error: E) -> FaultReason {
    log::error!("{}: {:?}", signal, error);
    FaultReason::HardwareFault(signal.name)
}

pub(crate) fn drive<B: SignalBus>(bus: &mut B,
                                  signal: &SignalDescriptor,
                                  asserted: bool) -> core::result::Result<(), FaultReason> {
    bus.assert(signal, asserted).map_err(|e| hardware_fault(signal, e))
}


// - tests --------------------------------------------------------------------
