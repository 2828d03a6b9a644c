//! Login providers.

use crate::GuardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity service that issued the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoginProvider {
    Naver,
    Kakao,
}

impl LoginProvider {
    pub const ALL: [LoginProvider; 2] = [LoginProvider::Naver, LoginProvider::Kakao];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoginProvider::Naver => "NAVER",
            LoginProvider::Kakao => "KAKAO",
        }
    }

    /// Backend path that re-issues tokens from the server-side provider session.
    pub fn refresh_path(&self) -> &'static str {
        match self {
            LoginProvider::Naver => "/login/updateNaverLoginInfo",
            LoginProvider::Kakao => "/login/updateKakaoLoginInfo",
        }
    }

    /// Backend path that exchanges an OAuth callback code for a session.
    pub fn login_path(&self) -> &'static str {
        match self {
            LoginProvider::Naver => "/login/getNaverLoginInfo",
            LoginProvider::Kakao => "/login/getKakaoLoginInfo",
        }
    }

    /// Backend path that revokes the provider access token.
    pub fn revoke_path(&self) -> &'static str {
        match self {
            LoginProvider::Naver => "/login/deleteNaverToken",
            LoginProvider::Kakao => "/login/deleteKakaoToken",
        }
    }
}

impl fmt::Display for LoginProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoginProvider {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NAVER" => Ok(LoginProvider::Naver),
            "KAKAO" => Ok(LoginProvider::Kakao),
            _ => Err(GuardError::UnknownProvider(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("naver".parse::<LoginProvider>().unwrap(), LoginProvider::Naver);
        assert_eq!(" KAKAO ".parse::<LoginProvider>().unwrap(), LoginProvider::Kakao);
        assert!(matches!(
            "google".parse::<LoginProvider>(),
            Err(GuardError::UnknownProvider(_))
        ));
    }

    #[test]
    fn test_serde_uses_upper_case_names() {
        assert_eq!(
            serde_json::to_string(&LoginProvider::Kakao).unwrap(),
            "\"KAKAO\""
        );
        let parsed: LoginProvider = serde_json::from_str("\"NAVER\"").unwrap();
        assert_eq!(parsed, LoginProvider::Naver);
    }

    #[test]
    fn test_display_roundtrips_through_from_str() {
        for provider in LoginProvider::ALL {
            assert_eq!(provider.to_string().parse::<LoginProvider>().unwrap(), provider);
        }
    }

    #[test]
    fn test_paths_are_provider_specific() {
        assert_eq!(LoginProvider::Naver.refresh_path(), "/login/updateNaverLoginInfo");
        assert_eq!(LoginProvider::Kakao.refresh_path(), "/login/updateKakaoLoginInfo");
        assert_ne!(LoginProvider::Naver.revoke_path(), LoginProvider::Kakao.revoke_path());
    }
}
