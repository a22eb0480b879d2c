use core::time::Duration;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;

use crate::bus::SignalBus;
use crate::config::millis;
use crate::signal::SignalDescriptor;

// - traits -------------------------------------------------------------------

/// Generic LED
pub trait Led {
    /// Turns the LED off
    fn off(&mut self);

    /// Turns the LED on
    fn on(&mut self);
}

// - DebugLed -----------------------------------------------------------------

/// LED on a dedicated, active-high push-pull pin.
pub struct DebugLed<PIN>(PIN);

impl<PIN> DebugLed<PIN>
where
    PIN: OutputPin,
{
    pub fn new(pin: PIN) -> Self {
        DebugLed(pin)
    }

    pub fn free(self) -> PIN {
        self.0
    }
}

impl<PIN> Led for DebugLed<PIN>
where
    PIN: OutputPin,
{
    fn on(&mut self) {
        if let Ok(()) = self.0.set_high() {}
    }

    fn off(&mut self) {
        if let Ok(()) = self.0.set_low() {}
    }
}

// - BusLed -------------------------------------------------------------------

/// LED reached through the signal bus, honouring its active level.
pub struct BusLed<'a, B> {
    bus: &'a mut B,
    signal: &'a SignalDescriptor,
}

impl<'a, B: SignalBus> BusLed<'a, B> {
    pub fn new(bus: &'a mut B, signal: &'a SignalDescriptor) -> Self {
        Self { bus, signal }
    }
}

impl<'a, B: SignalBus> Led for BusLed<'a, B> {
    fn on(&mut self) {
        if let Ok(()) = self.bus.assert(self.signal, true) {}
    }

    fn off(&mut self) {
        if let Ok(()) = self.bus.assert(self.signal, false) {}
    }
}

/// Stand-in when the board has no indicator.
pub struct NoLed;

impl Led for NoLed {
    fn on(&mut self) {}
    fn off(&mut self) {}
}

// - Pattern ------------------------------------------------------------------

/// One on/off blink cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    pub on: Duration,
    pub off: Duration,
}

impl Pattern {
    /// Short flash every two seconds while the board is up.
    pub const HEARTBEAT: Pattern = Pattern {
        on: Duration::from_millis(100),
        off: Duration::from_millis(2000),
    };

    /// Fast even blink in the fault state.
    pub const FAULT: Pattern = Pattern {
        on: Duration::from_millis(100),
        off: Duration::from_millis(100),
    };

    pub fn period(&self) -> Duration {
        self.on + self.off
    }
}

/// Runs one cycle of `pattern`, leaving the LED off.
pub fn blink<L, D>(led: &mut L, delay: &mut D, pattern: Pattern)
where
    L: Led,
    D: DelayMs<u32>,
{
    led.on();
    delay.delay_ms(millis(pattern.on));
    led.off();
    delay.delay_ms(millis(pattern.off));
}

// - tests --------------------------------------------------------------------
