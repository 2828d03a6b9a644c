//! Configuration, paths and shared utilities for the ContentHub client.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{Config, RefreshPolicy, DEFAULT_BACKEND_URL, DEFAULT_LOG_LEVEL};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
