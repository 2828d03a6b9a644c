//! Client configuration.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use url::Url;

pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";

const DEFAULT_NAVER_CLIENT_ID: &str = "naver_client_id_placeholder";
const DEFAULT_NAVER_REDIRECT_URI: &str = "http://localhost:3000/login/naver";
const DEFAULT_KAKAO_CLIENT_ID: &str = "kakao_client_id_placeholder";
const DEFAULT_KAKAO_REDIRECT_URI: &str = "http://localhost:3000/login/kakao";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// How concurrent requests that find a stale token share the refresh call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Every request that observes a stale token refreshes on its own.
    PerRequest,
    /// One in-flight refresh per provider; concurrent requests reuse its result.
    #[default]
    SingleFlight,
}

impl FromStr for RefreshPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "per_request" => Ok(Self::PerRequest),
            "single_flight" => Ok(Self::SingleFlight),
            other => Err(CoreError::Config(format!(
                "unknown refresh policy: {other}"
            ))),
        }
    }
}

/// Main client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Base URL of the ContentHub REST backend.
    pub backend_url: String,
    pub naver_client_id: String,
    pub naver_redirect_uri: String,
    pub kakao_client_id: String,
    pub kakao_redirect_uri: String,
    /// Per-request timeout applied to every backend call, including refresh.
    pub request_timeout_secs: u64,
    pub refresh_policy: RefreshPolicy,
    /// Ask the user to log in again when a user is present but no token is stored.
    pub prompt_on_inconsistent_session: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            naver_client_id: DEFAULT_NAVER_CLIENT_ID.to_string(),
            naver_redirect_uri: DEFAULT_NAVER_REDIRECT_URI.to_string(),
            kakao_client_id: DEFAULT_KAKAO_CLIENT_ID.to_string(),
            kakao_redirect_uri: DEFAULT_KAKAO_REDIRECT_URI.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            refresh_policy: RefreshPolicy::default(),
            prompt_on_inconsistent_session: false,
        }
    }
}

impl Config {
    /// Defaults, then environment overrides.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load from the config file if present (defaults otherwise), then apply
    /// environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        tracing::debug!(
            path = %config_path.display(),
            backend_url = %config.backend_url,
            refresh_policy = ?config.refresh_policy,
            "configuration loaded"
        );

        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    fn load_from_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `CONTENTHUB_*` overrides from `lookup`. Unparseable numeric or
    /// policy values are ignored with a warning.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("CONTENTHUB_LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = get("CONTENTHUB_BACKEND_URL") {
            self.backend_url = v;
        }
        if let Some(v) = get("CONTENTHUB_NAVER_CLIENT_ID") {
            self.naver_client_id = v;
        }
        if let Some(v) = get("CONTENTHUB_NAVER_REDIRECT_URI") {
            self.naver_redirect_uri = v;
        }
        if let Some(v) = get("CONTENTHUB_KAKAO_CLIENT_ID") {
            self.kakao_client_id = v;
        }
        if let Some(v) = get("CONTENTHUB_KAKAO_REDIRECT_URI") {
            self.kakao_redirect_uri = v;
        }
        if let Some(v) = get("CONTENTHUB_REQUEST_TIMEOUT_SECS") {
            match v.trim().parse::<u64>() {
                Ok(secs) => self.request_timeout_secs = secs,
                Err(_) => tracing::warn!(value = %v, "ignoring invalid CONTENTHUB_REQUEST_TIMEOUT_SECS"),
            }
        }
        if let Some(v) = get("CONTENTHUB_REFRESH_POLICY") {
            match v.parse::<RefreshPolicy>() {
                Ok(policy) => self.refresh_policy = policy,
                Err(e) => tracing::warn!(error = %e, "ignoring CONTENTHUB_REFRESH_POLICY"),
            }
        }
    }

    /// The backend URL, parsed.
    pub fn backend_url(&self) -> CoreResult<Url> {
        Url::parse(&self.backend_url).map_err(CoreError::from)
    }
}
