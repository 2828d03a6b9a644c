//! Logging bootstrap for ContentHub binaries.

use crate::Paths;

pub use observability::LogConfig;

const SERVICE_NAME: &str = "contenthub";

/// Initialize structured logging.
///
/// Events go to `Paths::log_file()`. Setting `CONTENTHUB_LOG_STDERR` to a
/// truthy value mirrors them to stderr.
pub fn init_logging(level: &str, paths: &Paths) {
    let also_stderr = std::env::var("CONTENTHUB_LOG_STDERR")
        .map(|v| is_truthy(&v))
        .unwrap_or(false);

    observability::init_with_config(LogConfig {
        service_name: SERVICE_NAME.into(),
        default_level: level.into(),
        log_path: Some(paths.log_file()),
        also_stderr,
    });
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
