//! Bring-up timing.
//!
//! The defaults are placeholders until they are checked against the PSU and
//! PHY datasheets.

use core::time::Duration;

use crate::led::Pattern;


// - constants ----------------------------------------------------------------

const POWER_GOOD_TIMEOUT: Duration = Duration::from_millis(500);
const POWER_OFF_TIME: Duration = Duration::from_millis(100);
const RESET_HOLD: Duration = Duration::from_millis(10);
// the OLED needs ~50ms after reset before it accepts commands
const RESET_SETTLE: Duration = Duration::from_millis(50);
const INTERRUPT_IDLE_TIMEOUT: Duration = Duration::from_millis(100);


// - Config -------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Bounded wait for every power-good input after the rails are enabled.
    pub power_good_timeout: Duration,
    /// Extra power-up attempts after the first timeout.
    pub power_retries: u8,
    /// How long enables are held off between attempts.
    pub power_off_time: Duration,
    /// Minimum reset assertion per device.
    pub reset_hold: Duration,
    /// Wait after the last reset release.
    pub reset_settle: Duration,
    /// Bounded wait for interrupt inputs to idle before arming.
    pub interrupt_idle_timeout: Duration,
    pub heartbeat: Pattern,
    pub fault_blink: Pattern,
}

impl Config {
    pub const DEFAULT: Config = Config {
        power_good_timeout: POWER_GOOD_TIMEOUT,
        power_retries: 0,
        power_off_time: POWER_OFF_TIME,
        reset_hold: RESET_HOLD,
        reset_settle: RESET_SETTLE,
        interrupt_idle_timeout: INTERRUPT_IDLE_TIMEOUT,
        heartbeat: Pattern::HEARTBEAT,
        fault_blink: Pattern::FAULT,
    };

    pub const fn with_power_good_timeout(mut self, timeout: Duration) -> Self {
        self.power_good_timeout = timeout;
        self
    }

    pub const fn with_power_retries(mut self, retries: u8) -> Self {
        self.power_retries = retries;
        self
    }

    pub const fn with_power_off_time(mut self, off: Duration) -> Self {
        self.power_off_time = off;
        self
    }

    pub const fn with_reset_hold(mut self, hold: Duration) -> Self {
        self.reset_hold = hold;
        self
    }

    pub const fn with_reset_settle(mut self, settle: Duration) -> Self {
        self.reset_settle = settle;
        self
    }

    pub const fn with_interrupt_idle_timeout(mut self, timeout: Duration) -> Self {
        self.interrupt_idle_timeout = timeout;
        self
    }

    pub const fn with_heartbeat(mut self, heartbeat: Pattern) -> Self {
        self.heartbeat = heartbeat;
        self
    }

    pub const fn with_fault_blink(mut self, fault_blink: Pattern) -> Self {
        self.fault_blink = fault_blink;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::DEFAULT
    }
}

/// Milliseconds for `DelayMs<u32>`, saturating.
pub(crate) fn millis(duration: Duration) -> u32 {
    let ms = duration.as_millis();
    if ms > u32::MAX as u128 { u32::MAX } else { ms as u32 }
}
