//! Session Token Guard for the ContentHub REST client.
//!
//! The guard sits between callers and the HTTP transport:
//!
//! - **Pre-send** ([`SessionGuard::before_send`]): reads the persisted token,
//!   refreshes it through the login provider when stale, and attaches
//!   `Authorization: Bearer <jwt>`.
//! - **Post-receive** ([`SessionGuard::after_failure`]): classifies failed
//!   responses and returns a [`NavigationIntent`] for the UI layer instead of
//!   navigating itself.
//!
//! Session state lives in an explicit [`SessionContext`] created at startup and
//! handed to the [`ApiClient`].

mod client;
mod context;
mod dto;
mod error;
mod guard;
mod login;
mod navigation;
mod provider;
mod refresh;
mod session_fsm;
mod user;

pub use client::ApiClient;
pub use context::{ClearReason, GuardEvent, GuardEventCallback, SessionContext, SessionSnapshot};
pub use dto::{ErrorBody, ErrorCode, LoginUserResponse};
pub use error::{ApiError, ApiFailure, GuardError, GuardResult};
pub use guard::{GuardConfig, SessionGuard};
pub use login::LoginFlow;
pub use navigation::{Destination, NavigationIntent, Notification, NotificationKind};
pub use provider::LoginProvider;
pub use refresh::{HttpSessionRefresher, SessionRefresher};
pub use session_fsm::{SessionMachine, SessionMachineInput, SessionMachineState, SessionState};
pub use user::{UserProfile, UserStore};

pub use hub_config::RefreshPolicy;
pub use hub_session_store::TokenSet;
