//! What the UI layer should do after a failed call.

use crate::dto::ErrorBody;
use std::fmt;
use url::form_urlencoded;

const ERROR_PATH: &str = "/error";
const MAINTENANCE_PATH: &str = "/maintenance";

const FORBIDDEN_MESSAGE: &str = "You do not have permission to access this page.";

/// Signal returned by the post-receive hook. The guard never navigates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationIntent {
    /// The session was cleared; ask the user whether to log in again.
    PromptLogin,
    /// Leave the current view for a static error or maintenance view.
    Redirect(Destination),
    /// Show a transient notification.
    Notify(Notification),
}

impl NavigationIntent {
    /// Redirects and notifications are dropped while the UI already shows an
    /// error or maintenance view, so reloading those views cannot loop.
    pub fn is_suppressed_at(&self, current_path: &str) -> bool {
        match self {
            NavigationIntent::PromptLogin => false,
            NavigationIntent::Redirect(_) | NavigationIntent::Notify(_) => {
                current_path.starts_with(ERROR_PATH) || current_path.starts_with(MAINTENANCE_PATH)
            }
        }
    }
}

impl fmt::Display for NavigationIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationIntent::PromptLogin => f.write_str("login required"),
            NavigationIntent::Redirect(destination) => write!(f, "redirect to {}", destination.path()),
            NavigationIntent::Notify(notification) => write!(f, "{notification}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    ErrorPage {
        status: Option<String>,
        message: Option<String>,
    },
    Maintenance,
}

impl Destination {
    pub fn forbidden(status: &str) -> Self {
        Destination::ErrorPage {
            status: Some(status.to_string()),
            message: Some(FORBIDDEN_MESSAGE.to_string()),
        }
    }

    pub fn not_found() -> Self {
        Destination::ErrorPage {
            status: None,
            message: None,
        }
    }

    /// Application path including the encoded query, e.g.
    /// `/error?status=403&message=You+do+not...`.
    pub fn path(&self) -> String {
        match self {
            Destination::Maintenance => MAINTENANCE_PATH.to_string(),
            Destination::ErrorPage { status, message } => {
                let mut query = form_urlencoded::Serializer::new(String::new());
                if let Some(status) = status {
                    query.append_pair("status", status);
                }
                if let Some(message) = message {
                    query.append_pair("message", message);
                }
                let query = query.finish();
                if query.is_empty() {
                    ERROR_PATH.to_string()
                } else {
                    format!("{ERROR_PATH}?{query}")
                }
            }
        }
    }
}

/// Known error categories and their user-facing texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    NetworkError,
    AuthorizationError,
    ValidationError,
    ApiResponseError,
    BusinessError,
    ServerError,
    UnexpectedError,
    BadRequestError,
    SystemError,
}

impl NotificationKind {
    const ALL: [NotificationKind; 9] = [
        NotificationKind::NetworkError,
        NotificationKind::AuthorizationError,
        NotificationKind::ValidationError,
        NotificationKind::ApiResponseError,
        NotificationKind::BusinessError,
        NotificationKind::ServerError,
        NotificationKind::UnexpectedError,
        NotificationKind::BadRequestError,
        NotificationKind::SystemError,
    ];

    /// Category name as sent by the backend in `ErrorBody::name`.
    pub fn name(&self) -> &'static str {
        match self {
            NotificationKind::NetworkError => "Network Error",
            NotificationKind::AuthorizationError => "Authentication/Authorization Error",
            NotificationKind::ValidationError => "Validation Error",
            NotificationKind::ApiResponseError => "API Response Error",
            NotificationKind::BusinessError => "Business Error",
            NotificationKind::ServerError => "Server Error",
            NotificationKind::UnexpectedError => "Unexpected Error",
            NotificationKind::BadRequestError => "Bad Request Error",
            NotificationKind::SystemError => "System Error",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            NotificationKind::NetworkError => {
                "A network error occurred. Please check your internet connection."
            }
            NotificationKind::AuthorizationError => "An authentication or authorization error occurred.",
            NotificationKind::ValidationError => "The input is not valid.",
            NotificationKind::ApiResponseError => {
                "An error occurred while fetching data. Please try again."
            }
            NotificationKind::BusinessError => "The request is not valid.",
            NotificationKind::ServerError => {
                "A server problem occurred. Please try again in a moment."
            }
            NotificationKind::UnexpectedError => "An unexpected error occurred.",
            NotificationKind::BadRequestError => "The request is not valid. Please check your input.",
            NotificationKind::SystemError => {
                "A system problem occurred. Please try again in a moment."
            }
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// A toast-style notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    /// Category name shown in brackets. Kept verbatim from the backend.
    pub name: String,
    pub message: String,
    /// Deduplication key: identical ids replace each other.
    pub toast_id: &'static str,
}

impl Notification {
    pub fn network_error() -> Self {
        let kind = NotificationKind::NetworkError;
        Self {
            kind,
            name: kind.name().to_string(),
            message: kind.message().to_string(),
            toast_id: "networkError",
        }
    }

    pub fn api_response_error() -> Self {
        let kind = NotificationKind::ApiResponseError;
        Self {
            kind,
            name: kind.name().to_string(),
            message: kind.message().to_string(),
            toast_id: "apiResponseError",
        }
    }

    /// Notification for a structured error body, looked up by its `name`.
    /// Unknown names keep their label and get the unexpected-error text.
    pub fn from_error_body(body: &ErrorBody) -> Self {
        let name = body
            .name
            .clone()
            .unwrap_or_else(|| NotificationKind::UnexpectedError.name().to_string());
        let kind = NotificationKind::from_name(&name).unwrap_or(NotificationKind::UnexpectedError);
        Self {
            kind,
            name,
            message: kind.message().to_string(),
            toast_id: "apiResponseError",
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: {}", self.name, self.message)
    }
}
