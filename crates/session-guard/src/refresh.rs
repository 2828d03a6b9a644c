//! Provider-specific session refresh.

use crate::client::endpoint;
use crate::{GuardError, GuardResult, LoginProvider, LoginUserResponse};
use async_trait::async_trait;
use chrono::Utc;
use hub_config::Config;
use hub_session_store::TokenSet;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

/// Re-issues tokens for the session held by `provider`.
#[async_trait]
pub trait SessionRefresher: Send + Sync {
    /// `Ok(None)` means the backend had nothing to give back; the caller
    /// clears the session. `Err` means the refresh call itself failed.
    async fn refresh(&self, provider: LoginProvider) -> GuardResult<Option<TokenSet>>;
}

/// Calls the backend refresh endpoints.
///
/// The backend identifies the provider session by cookie, so `http` must be
/// the same cookie-enabled client used for the login call.
pub struct HttpSessionRefresher {
    http: Client,
    base_url: Url,
    kakao_client_id: String,
}

impl HttpSessionRefresher {
    pub fn new(http: Client, config: &Config) -> GuardResult<Self> {
        Ok(Self {
            http,
            base_url: config.backend_url()?,
            kakao_client_id: config.kakao_client_id.clone(),
        })
    }

    fn refresh_url(&self, provider: LoginProvider) -> Url {
        let mut url = endpoint(&self.base_url, provider.refresh_path());
        if provider == LoginProvider::Kakao {
            url.query_pairs_mut()
                .append_pair("clientId", &self.kakao_client_id);
        }
        url
    }
}

#[async_trait]
impl SessionRefresher for HttpSessionRefresher {
    async fn refresh(&self, provider: LoginProvider) -> GuardResult<Option<TokenSet>> {
        let url = self.refresh_url(provider);
        debug!(provider = %provider, path = provider.refresh_path(), "requesting session refresh");

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(provider = %provider, status = %status, body = %body, "session refresh rejected");
            return Err(GuardError::Refresh(format!("HTTP {}: {}", status, body)));
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            debug!(provider = %provider, "session refresh returned an empty body");
            return Ok(None);
        }

        let Some(dto) = serde_json::from_str::<Option<LoginUserResponse>>(&text)? else {
            return Ok(None);
        };

        let tokens = dto.token_set(Utc::now());
        if tokens.is_none() {
            debug!(
                provider = %provider,
                resultcode = dto.resultcode.as_deref().unwrap_or("-"),
                message = dto.message.as_deref().unwrap_or("-"),
                "session refresh returned no token set"
            );
        }
        Ok(tokens)
    }
}
