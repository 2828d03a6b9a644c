//! Guard error types.

use crate::dto::ErrorBody;
use crate::navigation::NavigationIntent;
use std::fmt;
use thiserror::Error;

/// Errors raised by the guard and its collaborators.
#[derive(Error, Debug)]
pub enum GuardError {
    /// The provider refresh endpoint answered with a failure
    #[error("Token refresh failed: {0}")]
    Refresh(String),

    #[error("Unknown login provider: {0}")]
    UnknownProvider(String),

    #[error("Storage error: {0}")]
    Storage(#[from] hub_session_store::StorageError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The bearer value could not be encoded as a header
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("Configuration error: {0}")]
    Config(#[from] hub_config::CoreError),
}

impl GuardError {
    /// Returns true for failures where no response was received at all.
    pub fn is_transport(&self) -> bool {
        match self {
            GuardError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }
}

pub type GuardResult<T> = Result<T, GuardError>;

/// A call that did not succeed, as seen by the post-receive hook.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFailure {
    /// No response object at all (connection refused, timeout, DNS).
    Transport { message: String },
    /// A non-success status. `body` is `None` when it was missing or malformed.
    Status {
        status: u16,
        url: String,
        body: Option<ErrorBody>,
    },
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiFailure::Transport { message } => write!(f, "network error: {message}"),
            ApiFailure::Status {
                status,
                url,
                body: Some(body),
            } => write!(
                f,
                "HTTP {status} from {url}: {}",
                body.message.as_deref().unwrap_or(&body.status)
            ),
            ApiFailure::Status { status, url, .. } => write!(f, "HTTP {status} from {url}"),
        }
    }
}

/// Error returned by [`ApiClient`](crate::ApiClient) calls.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The pre-send hook failed; the request was never sent.
    #[error("Request rejected before send: {0}")]
    Rejected(#[source] GuardError),

    /// The request failed; `intent` tells the UI what to do about it.
    #[error("{failure}")]
    Failed {
        failure: ApiFailure,
        intent: NavigationIntent,
    },

    /// A success response whose body did not match the expected shape.
    #[error("Invalid response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The call succeeded but the local session could not be updated.
    #[error("Session update failed: {0}")]
    Session(#[source] GuardError),
}

impl ApiError {
    pub fn intent(&self) -> Option<&NavigationIntent> {
        match self {
            ApiError::Failed { intent, .. } => Some(intent),
            _ => None,
        }
    }
}
