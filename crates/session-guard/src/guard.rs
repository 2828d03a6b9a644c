//! Pre-send and post-receive hooks.

use crate::context::ClearReason;
use crate::dto::ErrorCode;
use crate::navigation::{Destination, NavigationIntent, Notification};
use crate::session_fsm::SessionMachineInput;
use crate::{ApiFailure, GuardError, GuardResult, LoginProvider, SessionContext, SessionRefresher};
use chrono::Utc;
use hub_config::{Config, RefreshPolicy};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Default)]
pub struct GuardConfig {
    pub refresh_policy: RefreshPolicy,
    /// Request a login prompt when a user is present without a stored token.
    pub prompt_on_inconsistent_session: bool,
}

impl From<&Config> for GuardConfig {
    fn from(config: &Config) -> Self {
        Self {
            refresh_policy: config.refresh_policy,
            prompt_on_inconsistent_session: config.prompt_on_inconsistent_session,
        }
    }
}

/// Attaches a valid bearer token to outgoing requests and turns failed
/// responses into a [`NavigationIntent`].
pub struct SessionGuard {
    context: Arc<SessionContext>,
    refresher: Arc<dyn SessionRefresher>,
    config: GuardConfig,
    naver_refresh: Mutex<()>,
    kakao_refresh: Mutex<()>,
}

impl SessionGuard {
    pub fn new(
        context: Arc<SessionContext>,
        refresher: Arc<dyn SessionRefresher>,
        config: GuardConfig,
    ) -> Self {
        Self {
            context,
            refresher,
            config,
            naver_refresh: Mutex::new(()),
            kakao_refresh: Mutex::new(()),
        }
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    // ==========================================
    // Request path
    // ==========================================

    /// The bearer token the next request should carry, refreshing it first
    /// when it is stale. `Ok(None)` sends the request unauthenticated.
    pub async fn resolve_bearer(&self) -> GuardResult<Option<String>> {
        let vault = self.context.vault();
        let users = self.context.users();
        // Taken before reading so a concurrent logout or login wins over our refresh.
        let epoch = self.context.epoch();

        let Some(jwt) = vault.get_jwt()? else {
            if users.is_logged_in() {
                warn!("user present without a stored token, clearing session");
                self.context.clear(ClearReason::MissingToken)?;
                if self.config.prompt_on_inconsistent_session {
                    self.context.request_login_prompt();
                }
            }
            return Ok(None);
        };

        if !vault.is_token_expired(Utc::now())? {
            return Ok(Some(jwt));
        }

        if !users.is_logged_in() {
            info!("stale token without an active user, clearing session");
            self.context.clear(ClearReason::StaleTokenWithoutUser)?;
            return Ok(None);
        }

        let Some(provider) = users.provider() else {
            warn!("stale token without a login provider, clearing session");
            self.context.clear(ClearReason::MissingProvider)?;
            return Ok(None);
        };

        match self.config.refresh_policy {
            RefreshPolicy::PerRequest => self.refresh(provider, epoch).await,
            RefreshPolicy::SingleFlight => self.refresh_single_flight(provider, epoch).await,
        }
    }

    /// Pre-send hook. Adds `Authorization: Bearer <jwt>` when a token is
    /// available and otherwise forwards the request unchanged. An error means
    /// the request must not be sent.
    pub async fn before_send(&self, mut request: reqwest::Request) -> GuardResult<reqwest::Request> {
        if let Some(jwt) = self.resolve_bearer().await? {
            let value = HeaderValue::from_str(&format!("Bearer {}", jwt))
                .map_err(|e| GuardError::InvalidHeader(e.to_string()))?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        Ok(request)
    }

    async fn refresh_single_flight(
        &self,
        provider: LoginProvider,
        epoch: u64,
    ) -> GuardResult<Option<String>> {
        let lock = match provider {
            LoginProvider::Naver => &self.naver_refresh,
            LoginProvider::Kakao => &self.kakao_refresh,
        };
        let _in_flight = lock.lock().await;

        // Whoever held the lock before us may already have settled the session.
        let vault = self.context.vault();
        let Some(jwt) = vault.get_jwt()? else {
            debug!(provider = %provider, "session cleared by concurrent refresh");
            return Ok(None);
        };
        if !vault.is_token_expired(Utc::now())? {
            debug!(provider = %provider, "reusing token from concurrent refresh");
            return Ok(Some(jwt));
        }

        self.refresh(provider, epoch).await
    }

    async fn refresh(&self, provider: LoginProvider, epoch: u64) -> GuardResult<Option<String>> {
        info!(provider = %provider, "session token stale, refreshing");
        self.context.transition(&SessionMachineInput::TokenExpired);

        match self.refresher.refresh(provider).await {
            Ok(Some(tokens)) => {
                if !self.context.store_tokens_if_current(&tokens, epoch)? {
                    info!(provider = %provider, "session changed during refresh, discarding tokens");
                    return Ok(None);
                }
                self.context.transition(&SessionMachineInput::RefreshSuccess);
                info!(provider = %provider, expire_at = %tokens.expire_at, "session token refreshed");
                Ok(Some(tokens.jwt))
            }
            Ok(None) => {
                warn!(provider = %provider, "session refresh returned nothing, clearing session");
                self.context.transition(&SessionMachineInput::RefreshEmpty);
                self.context
                    .clear_if_current(ClearReason::RefreshReturnedNothing, epoch)?;
                Ok(None)
            }
            Err(e) => {
                self.context.transition(&SessionMachineInput::RefreshError);
                if e.is_transport() {
                    warn!(provider = %provider, error = %e, "session refresh endpoint unreachable");
                } else {
                    error!(provider = %provider, error = %e, "session refresh failed");
                }
                Err(e)
            }
        }
    }

    // ==========================================
    // Response path
    // ==========================================

    /// Post-receive hook for successful responses. Observational only.
    pub fn after_success(&self, response: &reqwest::Response) {
        debug!(status = %response.status(), url = %response.url(), "API call succeeded");
    }

    /// Post-receive hook for failures. Never retries.
    pub fn after_failure(&self, failure: &ApiFailure) -> NavigationIntent {
        match failure {
            ApiFailure::Transport { message } => {
                warn!(error = %message, "API call failed without a response");
                NavigationIntent::Notify(Notification::network_error())
            }
            ApiFailure::Status {
                status,
                url,
                body: None,
            } => {
                warn!(status, url = %url, "API call failed without a readable error body");
                NavigationIntent::Notify(Notification::api_response_error())
            }
            ApiFailure::Status {
                status,
                url,
                body: Some(body),
            } => {
                error!(
                    name = body.name.as_deref().unwrap_or("-"),
                    path = body.path.as_deref().unwrap_or(url.as_str()),
                    status = %body.status,
                    http_status = status,
                    message = body.message.as_deref().unwrap_or("-"),
                    "API call failed"
                );

                match body.code() {
                    ErrorCode::Unauthorized => {
                        if let Err(e) = self.context.clear(ClearReason::Unauthorized) {
                            warn!(error = %e, "failed to clear persisted session");
                        }
                        self.context.request_login_prompt();
                        NavigationIntent::PromptLogin
                    }
                    ErrorCode::Forbidden => {
                        NavigationIntent::Redirect(Destination::forbidden(&body.status))
                    }
                    ErrorCode::NotFound => NavigationIntent::Redirect(Destination::not_found()),
                    ErrorCode::ServiceUnavailable => {
                        NavigationIntent::Redirect(Destination::Maintenance)
                    }
                    ErrorCode::Other => {
                        NavigationIntent::Notify(Notification::from_error_body(body))
                    }
                }
            }
        }
    }
}
