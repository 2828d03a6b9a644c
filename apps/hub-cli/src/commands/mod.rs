//! CLI command implementations.

mod api;
mod auth;

pub use api::get;
pub use auth::{login_kakao, login_naver, logout, restore, status};

use crate::output::{self, OutputFormat};
use anyhow::Result;
use hub_config::{Config, Paths};
use hub_session_store::{FileStorage, SessionVault};
use session_guard::{ApiClient, ApiError, GuardEvent, NavigationIntent, SessionContext};
use std::sync::Arc;
use tracing::debug;

/// Session context over the on-disk record plus a client bound to it.
struct Session {
    context: Arc<SessionContext>,
    client: Arc<ApiClient>,
}

fn open_session(paths: &Paths, config: &Config, format: OutputFormat) -> Result<Session> {
    let storage = FileStorage::open(paths.session_file())?;
    let context = Arc::new(SessionContext::bootstrap(SessionVault::new(Box::new(storage)))?);

    context.set_event_callback(Box::new(move |event| match event {
        GuardEvent::LoginPromptRequested => output::print_error(
            "Your session has ended. Log in again with 'contenthub login'.",
            &format,
        ),
        other => debug!(event = ?other, "session event"),
    }));

    let client = Arc::new(ApiClient::new(config, context.clone())?);
    Ok(Session { context, client })
}

/// Turn a failed call into a CLI error, honoring the navigation intent.
fn api_failure(err: ApiError) -> anyhow::Error {
    match err.intent() {
        // The prompt was already shown by the event callback.
        Some(NavigationIntent::PromptLogin) => anyhow::anyhow!("Not logged in"),
        Some(intent) => anyhow::anyhow!("{}", intent),
        None => match err {
            ApiError::Rejected(e) if e.is_transport() => {
                anyhow::anyhow!("Backend unreachable, check your connection: {}", e)
            }
            other => other.into(),
        },
    }
}
