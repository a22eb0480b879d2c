//! Host-side doubles for the hardware traits.

use std::collections::HashMap;
use std::time::Duration;
use std::vec::Vec;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::timer::CountDown;
use void::Void;

use crate::bus::SignalBus;
use crate::error::FaultReason;
use crate::fault::Halt;
use crate::led::{self, Led, Pattern};
use crate::registry::PinRegistry;
use crate::signal::{ExtiIrq, Level, SignalDescriptor};


// - MockBus ------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Write(&'static str, Level),
    Arm(&'static str, ExtiIrq),
    Disarm(&'static str),
}

#[derive(Debug, PartialEq, Eq)]
pub struct Broken(pub &'static str);

/// Simulated board: outputs latch what is written, inputs hold a level
/// that tests script.
pub struct MockBus {
    signals: Vec<SignalDescriptor>,
    levels: HashMap<&'static str, Level>,
    /// (output, input): the input follows the output's asserted state.
    links: Vec<(&'static str, &'static str)>,
    /// input asserts after this many reads
    pending: HashMap<&'static str, u32>,
    broken: Option<&'static str>,
    pub armed: Vec<&'static str>,
    pub events: Vec<Event>,
}

impl MockBus {
    /// Outputs start low, inputs start deasserted.
    pub fn new(registry: &PinRegistry) -> Self {
        let signals: Vec<SignalDescriptor> = registry.iter().copied().collect();
        let levels = signals
            .iter()
            .map(|s| (s.name, if s.is_output() { Level::Low } else { s.level(false) }))
            .collect();
        Self {
            signals,
            levels,
            links: Vec::new(),
            pending: HashMap::new(),
            broken: None,
            armed: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn link(mut self, output: &'static str, input: &'static str) -> Self {
        self.links.push((output, input));
        self
    }

    pub fn assert_after_reads(mut self, input: &'static str, reads: u32) -> Self {
        self.pending.insert(input, reads);
        self
    }

    pub fn break_signal(mut self, name: &'static str) -> Self {
        self.broken = Some(name);
        self
    }

    pub fn set_asserted(&mut self, name: &'static str, asserted: bool) {
        let level = self.descriptor(name).level(asserted);
        self.levels.insert(name, level);
    }

    pub fn level(&self, name: &str) -> Level {
        self.levels[name]
    }

    pub fn asserted(&self, name: &str) -> bool {
        self.descriptor(name).is_asserted(self.level(name))
    }

    /// Writes to `name`, in order.
    pub fn writes(&self, name: &str) -> Vec<Level> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Write(signal, level) if *signal == name => Some(*level),
                _ => None,
            })
            .collect()
    }

    pub fn position(&self, wanted: Event) -> Option<usize> {
        self.events.iter().position(|event| *event == wanted)
    }

    fn descriptor(&self, name: &str) -> SignalDescriptor {
        *self.signals.iter().find(|s| s.name == name).expect("signal not in registry")
    }

    fn check(&self, signal: &SignalDescriptor) -> Result<(), Broken> {
        match self.broken {
            Some(name) if name == signal.name => Err(Broken(name)),
            _ => Ok(()),
        }
    }
}

impl SignalBus for MockBus {
    type Error = Broken;

    fn write(&mut self, signal: &SignalDescriptor, level: Level) -> Result<(), Broken> {
        self.check(signal)?;
        self.levels.insert(signal.name, level);
        self.events.push(Event::Write(signal.name, level));

        let asserted = signal.is_asserted(level);
        let followers: Vec<&'static str> = self
            .links
            .iter()
            .filter(|(output, _)| *output == signal.name)
            .map(|(_, input)| *input)
            .collect();
        for input in followers {
            self.set_asserted(input, asserted);
        }
        Ok(())
    }

    fn read(&mut self, signal: &SignalDescriptor) -> Result<Level, Broken> {
        self.check(signal)?;
        let due = match self.pending.get_mut(signal.name) {
            Some(0) => true,
            Some(reads) => {
                *reads -= 1;
                false
            }
            None => false,
        };
        if due {
            self.pending.remove(signal.name);
            self.set_asserted(signal.name, true);
        }
        Ok(self.levels[signal.name])
    }

    fn arm(&mut self, signal: &SignalDescriptor, irq: ExtiIrq) -> Result<(), Broken> {
        self.check(signal)?;
        self.armed.push(signal.name);
        self.events.push(Event::Arm(signal.name, irq));
        Ok(())
    }

    fn disarm(&mut self, signal: &SignalDescriptor, _irq: ExtiIrq) -> Result<(), Broken> {
        self.check(signal)?;
        self.armed.retain(|name| *name != signal.name);
        self.events.push(Event::Disarm(signal.name));
        Ok(())
    }
}


// - Timer --------------------------------------------------------------------

/// Count-down that expires after `budget` polls.
#[derive(Default)]
pub struct Timer {
    budget: u32,
    remaining: u32,
    pub starts: Vec<Duration>,
}

impl Timer {
    pub fn expiring_after(budget: u32) -> Self {
        Self { budget, remaining: budget, starts: Vec::new() }
    }
}

impl CountDown for Timer {
    type Time = Duration;

    fn start<T>(&mut self, count: T)
    where
        T: Into<Duration>,
    {
        self.starts.push(count.into());
        self.remaining = self.budget;
    }

    fn wait(&mut self) -> nb::Result<(), Void> {
        if self.remaining == 0 {
            Ok(())
        } else {
            self.remaining -= 1;
            Err(nb::Error::WouldBlock)
        }
    }
}


// - Delay --------------------------------------------------------------------

#[derive(Default)]
pub struct Delay {
    pub calls: Vec<u32>,
}

impl DelayMs<u32> for Delay {
    fn delay_ms(&mut self, ms: u32) {
        self.calls.push(ms);
    }
}


// - PanicHalt ----------------------------------------------------------------

/// Blinks once, then unwinds so tests can observe the halt.
pub struct PanicHalt;

impl Halt for PanicHalt {
    fn halt<L, D>(&mut self, reason: FaultReason, indicator: &mut L, delay: &mut D, pattern: Pattern) -> !
    where
        L: Led,
        D: DelayMs<u32>,
    {
        led::blink(indicator, delay, pattern);
        panic!("halted: {}", reason)
    }
}
