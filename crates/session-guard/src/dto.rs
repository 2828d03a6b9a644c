//! Backend wire types.

use crate::UserProfile;
use chrono::{DateTime, Duration, Utc};
use hub_session_store::{parse_expire_date, TokenSet};
use serde::{Deserialize, Deserializer, Serialize};

/// Response of the login, restore and refresh endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUserResponse {
    #[serde(default)]
    pub resultcode: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user_info: Option<UserProfile>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub jwt: Option<String>,
    /// Token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Absolute expiry, `YYYYMMDDHHmmss` local time or RFC 3339.
    #[serde(default)]
    pub expire_date: Option<String>,
}

impl LoginUserResponse {
    /// The issued token set, or `None` unless both tokens and an expiry are
    /// present. `expireDate` wins over `expiresIn`.
    pub fn token_set(&self, now: DateTime<Utc>) -> Option<TokenSet> {
        let access_token = self.access_token.as_deref().filter(|t| !t.is_empty())?;
        let jwt = self.jwt.as_deref().filter(|t| !t.is_empty())?;

        let expire_at = self
            .expire_date
            .as_deref()
            .and_then(parse_expire_date)
            .or_else(|| {
                self.expires_in
                    .filter(|secs| *secs > 0)
                    .map(|secs| now + Duration::seconds(secs))
            })?;

        Some(TokenSet {
            access_token: access_token.to_string(),
            jwt: jwt.to_string(),
            expire_at,
        })
    }
}

/// Structured error body attached to failed responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Status code as text. Numeric JSON values are accepted.
    #[serde(deserialize_with = "status_as_string")]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    /// Error category name, e.g. "Validation Error".
    #[serde(default)]
    pub name: Option<String>,
}

impl ErrorBody {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::classify(&self.status)
    }
}

fn status_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(i64),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Text(s) => s,
        Repr::Number(n) => n.to_string(),
    })
}

/// Status values the post-receive hook acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    ServiceUnavailable,
    Other,
}

impl ErrorCode {
    pub fn classify(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "401" | "unauthorized" => ErrorCode::Unauthorized,
            "403" | "forbidden" => ErrorCode::Forbidden,
            "404" | "not_found" | "not found" => ErrorCode::NotFound,
            "503" | "service_unavailable" | "service unavailable" => {
                ErrorCode::ServiceUnavailable
            }
            _ => ErrorCode::Other,
        }
    }
}
