//! Supervisor lifecycle.
//!
//! ```text
//! Uninitialized -> Initializing -> Ready
//!       |               |            |
//!       +-------------> Faulted <----+
//! ```
//!
//! `Faulted` is terminal until the MCU is reset.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Uninitialized,
    Initializing,
    Ready,
    Faulted,
}

impl Default for SupervisorState {
    fn default() -> Self {
        SupervisorState::Uninitialized
    }
}

impl SupervisorState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, SupervisorState::Faulted)
    }

    /// Whether `self -> next` is a legal transition.
    pub const fn can_transition_to(self, next: SupervisorState) -> bool {
        use SupervisorState::*;
        matches!(
            (self, next),
            (Uninitialized, Initializing)
                | (Initializing, Ready)
                | (Uninitialized, Faulted)
                | (Initializing, Faulted)
                | (Ready, Faulted)
        )
    }

    /// Moves to `next`, leaving `self` untouched if the move is illegal.
    pub fn transition(&mut self, next: SupervisorState) -> Result<()> {
        if self.can_transition_to(next) {
            log::debug!("supervisor {:?} -> {:?}", self, next);
            *self = next;
            Ok(())
        } else {
            Err(Error::InvalidState(*self))
        }
    }
}


// - tests --------------------------------------------------------------------
