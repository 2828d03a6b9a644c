//! # Observability
//!
//! Structured logging for the ContentHub session tooling.
//!
//! Binaries call `observability::init_with_config()` once at startup and use
//! standard `tracing` macros everywhere else. Library crates never install a
//! subscriber themselves.
//!
//! ## Dev Mode
//!
//! With the default `dev` feature every event is appended as one JSON line to
//! `~/.contenthub/logs/contenthub.jsonl`:
//!
//! - `tail -f ~/.contenthub/logs/contenthub.jsonl | jq` for pretty JSON
//! - `lnav ~/.contenthub/logs/contenthub.jsonl` for interactive exploration
//!
//! Credential-shaped fields (`jwt`, `access_token`, `authorization`, bearer
//! values) are replaced with `[REDACTED]` before they are written.
//!
//! ## Usage
//!
//! ```rust,ignore
//! fn main() {
//!     observability::init_with_config(observability::LogConfig {
//!         service_name: "contenthub".into(),
//!         default_level: "debug".into(),
//!         also_stderr: true,
//!         ..Default::default()
//!     });
//!
//!     tracing::info!("ready");
//! }
//! ```

#[cfg(feature = "dev")]
mod dev;

mod json_layer;
mod redact;

use std::path::PathBuf;

pub use json_layer::{JsonLayer, LogEntry};
pub use redact::{is_sensitive_key, looks_like_sensitive_value};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service, included in every log line.
    pub service_name: String,

    /// Default level filter. Overridden by `RUST_LOG`.
    pub default_level: String,

    /// Optional log file path.
    /// Defaults to `~/.contenthub/logs/contenthub.jsonl` in dev mode.
    pub log_path: Option<PathBuf>,

    /// Also emit compact logs to stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Initialize logging with default settings for `service_name`.
pub fn init(service_name: &str) {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    });
}

/// Initialize logging with custom configuration.
///
/// Calling this more than once per process is a no-op after the first call.
pub fn init_with_config(config: LogConfig) {
    #[cfg(feature = "dev")]
    {
        dev::init_dev_subscriber(&config);
    }

    #[cfg(not(feature = "dev"))]
    {
        use tracing_subscriber::util::SubscriberInitExt;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.default_level)),
            )
            .with_target(true)
            .compact()
            .finish()
            .try_init();
    }
}

pub use tracing::{debug, error, info, instrument, trace, warn};

pub use tracing::span;

pub use tracing::Level;
