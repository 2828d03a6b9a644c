//! Login completion, startup restore and logout.

use crate::context::ClearReason;
use crate::{ApiClient, ApiError, LoginProvider, LoginUserResponse, UserProfile};
use chrono::Utc;
use hub_config::Config;
use std::sync::Arc;
use tracing::{info, warn};

/// Drives the provider login endpoints and records the outcome in the
/// client's [`SessionContext`](crate::SessionContext).
pub struct LoginFlow {
    client: Arc<ApiClient>,
    kakao_client_id: String,
    kakao_redirect_uri: String,
}

impl LoginFlow {
    pub fn new(client: Arc<ApiClient>, config: &Config) -> Self {
        Self {
            client,
            kakao_client_id: config.kakao_client_id.clone(),
            kakao_redirect_uri: config.kakao_redirect_uri.clone(),
        }
    }

    /// Exchange a Naver OAuth callback for a session.
    pub async fn complete_naver_login(
        &self,
        code: &str,
        state: &str,
    ) -> Result<Option<UserProfile>, ApiError> {
        let provider = LoginProvider::Naver;
        let response = self
            .client
            .get_json::<Option<LoginUserResponse>>(
                provider.login_path(),
                &[("code", code), ("state", state)],
            )
            .await?;
        self.accept(provider, response)
    }

    /// Exchange a Kakao OAuth callback for a session.
    pub async fn complete_kakao_login(&self, code: &str) -> Result<Option<UserProfile>, ApiError> {
        let provider = LoginProvider::Kakao;
        let response = self
            .client
            .get_json::<Option<LoginUserResponse>>(
                provider.login_path(),
                &[
                    ("client_id", self.kakao_client_id.as_str()),
                    ("redirect_uri", self.kakao_redirect_uri.as_str()),
                    ("code", code),
                ],
            )
            .await?;
        self.accept(provider, response)
    }

    /// Re-login from the provider session the backend still holds.
    ///
    /// Local state is dropped first, so a failed restore leaves the user
    /// logged out.
    pub async fn restore(&self, provider: LoginProvider) -> Result<Option<UserProfile>, ApiError> {
        let context = self.client.context();
        context
            .clear(ClearReason::Restore)
            .map_err(ApiError::Session)?;

        let query: Vec<(&str, &str)> = match provider {
            LoginProvider::Naver => Vec::new(),
            LoginProvider::Kakao => vec![("client_id", self.kakao_client_id.as_str())],
        };
        let response = self
            .client
            .get_json::<Option<LoginUserResponse>>(provider.refresh_path(), &query)
            .await?;

        let user = self.accept(provider, response)?;
        if user.is_none() {
            context
                .clear(ClearReason::Restore)
                .map_err(ApiError::Session)?;
        }
        Ok(user)
    }

    /// Revoke the provider token when there is one, then clear the session.
    ///
    /// Revocation failures are logged and otherwise ignored.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let context = self.client.context();
        let access_token = context.vault().get_access_token().map_err(|e| ApiError::Session(e.into()))?;
        let provider = context.users().provider();

        if let (Some(access_token), Some(provider)) = (access_token, provider) {
            let query: Vec<(&str, &str)> = match provider {
                LoginProvider::Naver => vec![("access_token", access_token.as_str())],
                LoginProvider::Kakao => vec![
                    ("access_token", access_token.as_str()),
                    ("target_id", self.kakao_client_id.as_str()),
                ],
            };

            match self
                .client
                .get_json::<serde_json::Value>(provider.revoke_path(), &query)
                .await
            {
                Ok(_) => info!(provider = %provider, "provider token revoked"),
                Err(e) => warn!(provider = %provider, error = %e, "provider token revocation failed"),
            }
        }

        context
            .clear(ClearReason::Logout)
            .map_err(ApiError::Session)
    }

    fn accept(
        &self,
        provider: LoginProvider,
        response: Option<LoginUserResponse>,
    ) -> Result<Option<UserProfile>, ApiError> {
        let Some(response) = response else {
            warn!(provider = %provider, "login returned an empty body");
            return Ok(None);
        };

        let tokens = response.token_set(Utc::now());
        let (Some(user), Some(tokens)) = (response.user_info, tokens) else {
            warn!(
                provider = %provider,
                resultcode = response.resultcode.as_deref().unwrap_or("-"),
                message = response.message.as_deref().unwrap_or("-"),
                "login response carried no complete session"
            );
            return Ok(None);
        };

        self.client
            .context()
            .establish(provider, user.clone(), &tokens)
            .map_err(ApiError::Session)?;
        info!(provider = %provider, user = user.display_name(), "login completed");
        Ok(Some(user))
    }
}
