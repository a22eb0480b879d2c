//! Hardware seam between the supervisor and the GPIO/EXTI peripherals.

use core::fmt::Debug;

use crate::signal::{ExtiIrq, Level, SignalDescriptor};


// - traits -------------------------------------------------------------------

/// Access to the board's signals by descriptor.
///
/// Implemented over the HAL's GPIO and EXTI peripherals for the board, and
/// by mocks in tests.
pub trait SignalBus {
    type Error: Debug;

    /// Drives an output to a physical level.
    fn write(&mut self, signal: &SignalDescriptor, level: Level) -> Result<(), Self::Error>;

    /// Samples the physical level of a signal.
    fn read(&mut self, signal: &SignalDescriptor) -> Result<Level, Self::Error>;

    /// Routes the signal's EXTI line to its port, enables it and unmasks
    /// `irq`.
    fn arm(&mut self, signal: &SignalDescriptor, irq: ExtiIrq) -> Result<(), Self::Error>;

    /// Masks the signal's EXTI line.
    fn disarm(&mut self, signal: &SignalDescriptor, irq: ExtiIrq) -> Result<(), Self::Error>;

    fn assert(&mut self, signal: &SignalDescriptor, asserted: bool) -> Result<(), Self::Error> {
        self.write(signal, signal.level(asserted))
    }

    fn is_asserted(&mut self, signal: &SignalDescriptor) -> Result<bool, Self::Error> {
        self.read(signal).map(|level| signal.is_asserted(level))
    }
}
