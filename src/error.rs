use core::fmt;

use crate::signal::Port;
use crate::state::SupervisorState;


// - Phase --------------------------------------------------------------------

/// Bring-up phase, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Power,
    Reset,
    Interrupt,
}

impl Phase {
    pub const fn name(self) -> &'static str {
        match self {
            Phase::Power => "power",
            Phase::Reset => "reset",
            Phase::Interrupt => "interrupt",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}


// - FaultReason --------------------------------------------------------------

/// Unrecoverable condition that puts the supervisor into the fault state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FaultReason {
    #[error("timed out in {0} phase")]
    Timeout(Phase),
    #[error("hardware fault on {0}")]
    HardwareFault(&'static str),
    /// Raised by a collaborator (watchdog, link monitor) after bring-up.
    #[error("fault reported by {0}")]
    Reported(&'static str),
}


// - Error --------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("unknown signal")]
    UnknownSignal,
    #[error("{second} claims {port} pin {pin} already used by {first}")]
    DuplicatePin {
        port: Port,
        pin: u8,
        first: &'static str,
        second: &'static str,
    },
    #[error("signal {0} registered twice")]
    DuplicateSignal(&'static str),
    #[error("pin {pin} of {name} is out of range")]
    PinOutOfRange { name: &'static str, pin: u8 },
    #[error("output {0} cannot have an interrupt line")]
    InterruptOnOutput(&'static str),
    #[error("interrupt vector of {0} does not serve its pin")]
    InterruptLineMismatch(&'static str),
    #[error("role of {0} does not fit its direction")]
    RoleMismatch(&'static str),
    #[error("too many signals")]
    TooManySignals,
    #[error("invalid supervisor state {0:?}")]
    InvalidState(SupervisorState),
    #[error(transparent)]
    Fault(#[from] FaultReason),
}

pub type Result<T> = core::result::Result<T, Error>;
