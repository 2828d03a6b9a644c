//! Guarded REST client for the ContentHub backend.

use crate::{
    ApiError, ApiFailure, ErrorBody, GuardConfig, GuardError, GuardResult, HttpSessionRefresher,
    SessionContext, SessionGuard,
};
use hub_config::Config;
use reqwest::{Client, Request, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Join `path` onto `base`, keeping any path prefix the base already has.
pub(crate) fn endpoint(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let joined = format!(
        "{}/{}",
        base.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    url.set_path(&joined);
    url.set_query(None);
    url
}

/// The cookie-enabled client shared by regular calls and session refresh.
pub(crate) fn build_http_client(config: &Config) -> GuardResult<Client> {
    let client = Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;
    Ok(client)
}

/// Every call goes through the [`SessionGuard`] on the way out and on the way
/// back.
pub struct ApiClient {
    http: Client,
    base_url: Url,
    guard: SessionGuard,
}

impl ApiClient {
    pub fn new(config: &Config, context: Arc<SessionContext>) -> GuardResult<Self> {
        let http = build_http_client(config)?;
        let refresher = HttpSessionRefresher::new(http.clone(), config)?;
        let guard = SessionGuard::new(context, Arc::new(refresher), GuardConfig::from(config));
        Ok(Self::with_guard(http, config.backend_url()?, guard))
    }

    /// Assemble a client around an existing guard, e.g. one with a custom refresher.
    pub fn with_guard(http: Client, base_url: Url, guard: SessionGuard) -> Self {
        Self {
            http,
            base_url,
            guard,
        }
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn guard(&self) -> &SessionGuard {
        &self.guard
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        self.guard.context()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn url(&self, path: &str, query: &[(&str, &str)]) -> Url {
        let mut url = endpoint(&self.base_url, path);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    /// Send `request` through the guard.
    ///
    /// Non-success statuses come back as [`ApiError::Failed`] carrying the
    /// intent produced by the post-receive hook.
    pub async fn execute(&self, request: Request) -> Result<Response, ApiError> {
        let request = self
            .guard
            .before_send(request)
            .await
            .map_err(ApiError::Rejected)?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(method = %method, path = url.path(), "sending API request");

        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                return Err(self.fail(ApiFailure::Transport {
                    message: e.to_string(),
                }))
            }
        };

        let status = response.status();
        if status.is_success() {
            self.guard.after_success(&response);
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(text) => serde_json::from_str::<ErrorBody>(&text).ok(),
            Err(e) => {
                warn!(error = %e, status = %status, "failed to read error body");
                None
            }
        };

        Err(self.fail(ApiFailure::Status {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        }))
    }

    /// GET `path` and decode the JSON body. An empty body decodes as `null`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let request = self
            .http
            .get(self.url(path, query))
            .build()
            .map_err(|e| ApiError::Rejected(GuardError::Http(e)))?;

        let response = self.execute(request).await?;
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                return Err(self.fail(ApiFailure::Transport {
                    message: e.to_string(),
                }))
            }
        };

        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text).map_err(ApiError::Decode)
    }

    fn fail(&self, failure: ApiFailure) -> ApiError {
        let intent = self.guard.after_failure(&failure);
        ApiError::Failed { failure, intent }
    }
}
