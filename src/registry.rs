//! Lookup from logical signal name to its wiring.

use heapless::Vec;

use crate::error::{Error, Result};
use crate::pins;
use crate::signal::{Direction, Role, SignalDescriptor};


// - constants ----------------------------------------------------------------

pub const MAX_SIGNALS: usize = 32;


// - PinRegistry --------------------------------------------------------------

/// Validated, read-only table of board signals.
#[derive(Debug, Clone)]
pub struct PinRegistry {
    signals: Vec<SignalDescriptor, MAX_SIGNALS>,
}

impl PinRegistry {
    /// Builds the registry from a fixed table, checking it for wiring
    /// conflicts.
    pub fn new(table: &[SignalDescriptor]) -> Result<Self> {
        let mut signals: Vec<SignalDescriptor, MAX_SIGNALS> = Vec::new();

        for descriptor in table {
            validate(descriptor)?;

            for existing in signals.iter() {
                if existing.name == descriptor.name {
                    return Err(Error::DuplicateSignal(descriptor.name));
                }
                if existing.port == descriptor.port && existing.pin == descriptor.pin {
                    return Err(Error::DuplicatePin {
                        port: descriptor.port,
                        pin: descriptor.pin,
                        first: existing.name,
                        second: descriptor.name,
                    });
                }
            }

            signals.push(*descriptor).map_err(|_| Error::TooManySignals)?;
        }

        Ok(Self { signals })
    }

    /// Registry for the Oro Link board.
    pub fn board() -> Result<Self> {
        Self::new(&pins::SIGNALS)
    }

    pub fn resolve(&self, name: &str) -> Result<&SignalDescriptor> {
        self.signals
            .iter()
            .find(|signal| signal.name == name)
            .ok_or_else(|| {
                log::warn!("unknown signal {}", name);
                Error::UnknownSignal
            })
    }

    /// Signals in table order.
    pub fn iter(&self) -> impl Iterator<Item = &SignalDescriptor> {
        self.signals.iter()
    }

    pub fn with_role(&self, role: Role) -> impl Iterator<Item = &SignalDescriptor> {
        self.signals.iter().filter(move |signal| signal.role == role)
    }

    /// First diagnostic LED in the table.
    pub fn indicator(&self) -> Option<&SignalDescriptor> {
        self.with_role(Role::Indicator).next()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

fn validate(descriptor: &SignalDescriptor) -> Result<()> {
    if descriptor.pin > 15 {
        return Err(Error::PinOutOfRange { name: descriptor.name, pin: descriptor.pin });
    }

    if !descriptor.role.allows(descriptor.direction) {
        return Err(Error::RoleMismatch(descriptor.name));
    }

    match (descriptor.interrupt, descriptor.direction) {
        (Some(_), Direction::Output) => Err(Error::InterruptOnOutput(descriptor.name)),
        (Some(irq), Direction::Input) if !irq.serves(descriptor.pin) => {
            Err(Error::InterruptLineMismatch(descriptor.name))
        }
        (Some(_), Direction::Input) if descriptor.role != Role::Interrupt => {
            Err(Error::RoleMismatch(descriptor.name))
        }
        (None, _) if descriptor.role == Role::Interrupt => {
            Err(Error::RoleMismatch(descriptor.name))
        }
        _ => Ok(()),
    }
}


// - tests --------------------------------------------------------------------
