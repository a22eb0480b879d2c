//! Typed description of a single board signal.

use core::fmt;
use core::ops::Not;


// - Port ---------------------------------------------------------------------

/// GPIO bank of the STM32F479.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
}

impl Port {
    pub const COUNT: usize = 11;

    /// Port code as used by the SYSCFG EXTICR registers (A = 0).
    pub const fn index(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{:?}", self)
    }
}


// - levels -------------------------------------------------------------------

/// Physical level of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// Which physical level means "asserted" for a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveLevel {
    High,
    Low,
}

impl ActiveLevel {
    pub const fn asserted(self) -> Level {
        match self {
            ActiveLevel::High => Level::High,
            ActiveLevel::Low => Level::Low,
        }
    }

    pub const fn deasserted(self) -> Level {
        match self {
            ActiveLevel::High => Level::Low,
            ActiveLevel::Low => Level::High,
        }
    }
}


// - Role ---------------------------------------------------------------------

/// What the supervisor does with a signal during bring-up and in the fault
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Output enabling a power rail, driven in the power phase.
    PowerEnable,
    /// Input reporting a stable rail, awaited in the power phase.
    PowerGood,
    /// Device reset output, pulsed in the reset phase.
    Reset,
    /// Interrupt-capable input, armed last.
    Interrupt,
    /// Diagnostic LED.
    Indicator,
    /// Anything else. Outputs are held deasserted.
    General,
}

impl Role {
    /// Whether a signal with this role may have the given direction.
    pub const fn allows(self, direction: Direction) -> bool {
        match (self, direction) {
            (Role::PowerEnable, Direction::Output) => true,
            (Role::PowerGood, Direction::Input) => true,
            (Role::Reset, Direction::Output) => true,
            (Role::Interrupt, Direction::Input) => true,
            (Role::Indicator, Direction::Output) => true,
            (Role::General, _) => true,
            _ => false,
        }
    }
}


// - ExtiIrq ------------------------------------------------------------------

/// NVIC vector serving an EXTI line.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtiIrq {
    Exti0,
    Exti1,
    Exti2,
    Exti3,
    Exti4,
    Exti9_5,
    Exti15_10,
}

impl ExtiIrq {
    /// Vector for EXTI line `line`, which is the pin number on any port.
    pub const fn for_line(line: u8) -> Option<Self> {
        match line {
            0 => Some(ExtiIrq::Exti0),
            1 => Some(ExtiIrq::Exti1),
            2 => Some(ExtiIrq::Exti2),
            3 => Some(ExtiIrq::Exti3),
            4 => Some(ExtiIrq::Exti4),
            5..=9 => Some(ExtiIrq::Exti9_5),
            10..=15 => Some(ExtiIrq::Exti15_10),
            _ => None,
        }
    }

    pub fn serves(self, line: u8) -> bool {
        ExtiIrq::for_line(line) == Some(self)
    }
}


// - SignalDescriptor ---------------------------------------------------------

/// Wiring of one logical signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalDescriptor {
    pub name: &'static str,
    pub port: Port,
    pub pin: u8,
    pub direction: Direction,
    pub active: ActiveLevel,
    pub role: Role,
    pub interrupt: Option<ExtiIrq>,
}

impl SignalDescriptor {
    pub const fn output(name: &'static str,
                        port: Port,
                        pin: u8,
                        active: ActiveLevel,
                        role: Role) -> Self {
        Self {
            name,
            port,
            pin,
            direction: Direction::Output,
            active,
            role,
            interrupt: None,
        }
    }

    pub const fn input(name: &'static str,
                       port: Port,
                       pin: u8,
                       active: ActiveLevel,
                       role: Role) -> Self {
        Self {
            name,
            port,
            pin,
            direction: Direction::Input,
            active,
            role,
            interrupt: None,
        }
    }

    pub const fn with_interrupt(mut self, irq: ExtiIrq) -> Self {
        self.interrupt = Some(irq);
        self
    }

    pub fn is_output(&self) -> bool {
        self.direction == Direction::Output
    }

    /// Physical level to drive for the logical state `asserted`.
    pub fn level(&self, asserted: bool) -> Level {
        if asserted { self.active.asserted() } else { self.active.deasserted() }
    }

    pub fn is_asserted(&self, level: Level) -> bool {
        level == self.active.asserted()
    }
}

impl fmt::Display for SignalDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (P{:?}{})", self.name, self.port, self.pin)
    }
}


// - tests --------------------------------------------------------------------
