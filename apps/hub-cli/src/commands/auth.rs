//! Login, restore, logout and status commands.

use super::{api_failure, open_session, Session};
use crate::output::{self, OutputFormat};
use anyhow::{bail, Result};
use hub_config::{Config, Paths};
use session_guard::{LoginFlow, LoginProvider, SessionState, UserProfile};

fn login_flow(session: &Session, config: &Config) -> LoginFlow {
    LoginFlow::new(session.client.clone(), config)
}

fn report_login(user: Option<UserProfile>, format: &OutputFormat) -> Result<()> {
    match user {
        Some(user) => {
            output::print_success(&format!("Logged in as {}", user.display_name()), format);
            Ok(())
        }
        None => bail!("Login failed: the backend returned no session"),
    }
}

/// Complete a Naver login.
pub async fn login_naver(
    paths: &Paths,
    config: &Config,
    code: &str,
    state: &str,
    format: &OutputFormat,
) -> Result<()> {
    let session = open_session(paths, config, *format)?;
    let user = login_flow(&session, config)
        .complete_naver_login(code, state)
        .await
        .map_err(api_failure)?;
    report_login(user, format)
}

/// Complete a Kakao login.
pub async fn login_kakao(
    paths: &Paths,
    config: &Config,
    code: &str,
    format: &OutputFormat,
) -> Result<()> {
    let session = open_session(paths, config, *format)?;
    let user = login_flow(&session, config)
        .complete_kakao_login(code)
        .await
        .map_err(api_failure)?;
    report_login(user, format)
}

/// Re-login through `provider`, or the stored provider when none is given.
pub async fn restore(
    paths: &Paths,
    config: &Config,
    provider: Option<LoginProvider>,
    format: &OutputFormat,
) -> Result<()> {
    let session = open_session(paths, config, *format)?;
    let Some(provider) = provider.or_else(|| session.context.users().provider()) else {
        bail!("No stored login provider. Pass one of: naver, kakao");
    };

    let user = login_flow(&session, config)
        .restore(provider)
        .await
        .map_err(api_failure)?;
    match user {
        Some(user) => {
            output::print_success(&format!("Restored session for {}", user.display_name()), format);
            Ok(())
        }
        None => bail!("No {} session to restore", provider),
    }
}

/// Revoke the provider token and clear the local session.
pub async fn logout(paths: &Paths, config: &Config, format: &OutputFormat) -> Result<()> {
    let session = open_session(paths, config, *format)?;
    if !session.context.users().is_logged_in() {
        output::print_success("Not logged in", format);
        return Ok(());
    }

    login_flow(&session, config)
        .logout()
        .await
        .map_err(api_failure)?;
    output::print_success("Logged out", format);
    Ok(())
}

fn signed_in_label(state: SessionState) -> &'static str {
    if state.is_authenticated() {
        "yes"
    } else {
        "no"
    }
}

/// Show the stored session.
pub async fn status(paths: &Paths, config: &Config, format: &OutputFormat) -> Result<()> {
    let session = open_session(paths, config, *format)?;
    let snapshot = session.context.snapshot()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        OutputFormat::Text => {
            let user = snapshot
                .user
                .as_ref()
                .map(|u| u.display_name().to_string())
                .unwrap_or_else(|| "-".to_string());
            let provider = snapshot
                .provider
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string());
            let expires = snapshot
                .expire_at
                .map(|at| at.to_rfc3339())
                .unwrap_or_else(|| "-".to_string());
            let stale = snapshot
                .expire_at
                .map(|at| at <= chrono::Utc::now())
                .unwrap_or(snapshot.has_token);

            output::print_row("Signed in", signed_in_label(snapshot.state));
            output::print_row("State", &format!("{:?}", snapshot.state));
            output::print_row("User", &user);
            output::print_row("Provider", &provider);
            output::print_row("Token", if snapshot.has_token { "present" } else { "none" });
            output::print_row("Expires", &expires);
            if snapshot.has_token && stale {
                output::print_row("Note", "token is stale and refreshes on the next call");
            }
            output::print_row("Backend", &config.backend_url);
        }
    }
    Ok(())
}
