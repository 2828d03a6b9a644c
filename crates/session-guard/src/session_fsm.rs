//! Session state machine using rust-fsm.
//!
//! ```text
//!                  LoginSuccess
//!   ┌───────────┐ ─────────────► ┌──────────┐  TokenExpired   ┌────────────┐
//!   │ LoggedOut │                │ LoggedIn │ ──────────────► │ Refreshing │
//!   └───────────┘ ◄───────────── └──────────┘ ◄────────────── └────────────┘
//!         ▲        SessionCleared               RefreshSuccess       │
//!         │                                     RefreshError         │
//!         └──────────────────────────────────────────────────────────┘
//!                          RefreshEmpty / SessionCleared
//! ```
//!
//! The machine is observational. Storage remains the source of truth for the
//! request path, so a rejected transition is logged and ignored.

use rust_fsm::*;
use serde::{Deserialize, Serialize};

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub session_machine(LoggedOut)

    LoggedOut => {
        LoginSuccess => LoggedIn,
        SessionCleared => LoggedOut
    },
    LoggedIn => {
        LoginSuccess => LoggedIn,
        TokenExpired => Refreshing,
        // A concurrent per-request refresh already finished.
        RefreshSuccess => LoggedIn,
        SessionCleared => LoggedOut
    },
    Refreshing => {
        // Another request observed the same stale token.
        TokenExpired => Refreshing,
        LoginSuccess => LoggedIn,
        RefreshSuccess => LoggedIn,
        RefreshEmpty => LoggedOut,
        // Refresh call failed; the stored session is left as it was.
        RefreshError => LoggedIn,
        SessionCleared => LoggedOut
    }
}

pub use session_machine::Input as SessionMachineInput;
pub use session_machine::State as SessionMachineState;
pub use session_machine::StateMachine as SessionMachine;

/// Serializable view of the machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    LoggedOut,
    LoggedIn,
    Refreshing,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::LoggedIn)
    }
}

impl From<&SessionMachineState> for SessionState {
    fn from(state: &SessionMachineState) -> Self {
        match state {
            SessionMachineState::LoggedOut => SessionState::LoggedOut,
            SessionMachineState::LoggedIn => SessionState::LoggedIn,
            SessionMachineState::Refreshing => SessionState::Refreshing,
        }
    }
}
