//! Board support crate for the Oro Link board (STM32F479VG)
//!
//! The hardware independent part - signal registry, bring-up sequencing and
//! the fault state - builds for any target. The STM32F479 binding is behind
//! the `board` feature.
//!
//! # Usage - see demos/
//!
//! ```ignore
//! let mut supervisor = board.supervisor(pins, dp.SYSCFG, dp.EXTI, dp.TIM2, cp.SYST, &clocks, Config::DEFAULT)?;
//! match supervisor.initialize() {
//!     Ok(ready) => log::info!("ready: {:?}", ready),
//!     Err(Error::Fault(reason)) => supervisor.enter_fault_state(reason),
//!     Err(e) => panic!("{}", e),
//! }
//! ```

//#![deny(warnings)]
#![cfg_attr(not(test), no_std)]

#[cfg(feature = "board")]
pub use stm32f4xx_hal as hal;
#[cfg(feature = "board")]
pub use hal::pac;


// - modules ------------------------------------------------------------------

pub mod bus;
pub mod config;
pub mod error;
pub mod fault;
pub mod initializer;
pub mod led;
pub mod pins;
pub mod registry;
pub mod signal;
pub mod state;
pub mod supervisor;
pub mod timer;

#[cfg(feature = "board")]
pub mod board;
#[cfg(feature = "board")]
pub mod clocks;
#[cfg(feature = "board")]
pub use clocks::configure as configure_clocks;
#[cfg(feature = "log-semihosting")]
pub mod logger;

#[cfg(test)]
mod testing;

pub use bus::SignalBus;
pub use config::Config;
pub use error::{Error, FaultReason, Phase, Result};
pub use fault::{Halt, Park};
pub use registry::PinRegistry;
pub use signal::{ActiveLevel, Direction, ExtiIrq, Level, Port, Role, SignalDescriptor};
pub use state::SupervisorState;
pub use supervisor::{Ready, Supervisor};
