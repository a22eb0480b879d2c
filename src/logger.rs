//! `log` sink over semihosting.
//!
//! Slow, halts the core while the debugger services each line. Good enough
//! for bring-up traces, keep it out of timing sensitive builds.

use cortex_m_semihosting::hprintln;
use log::{LevelFilter, Log, Metadata, Record};


struct Semihosting;

static LOGGER: Semihosting = Semihosting;

impl Log for Semihosting {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        hprintln!("{:<5} [{}] {}", record.level(), record.target(), record.args());
    }

    fn flush(&self) {}
}

/// Installs the semihosting logger. Later calls are ignored.
pub fn init(level: LevelFilter) {
    // log::set_logger fails only when a logger is already installed
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
