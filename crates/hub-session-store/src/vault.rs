//! Typed access to the persisted session record.

use crate::expiry::parse_expire_date;
use crate::{SessionStorage, StorageError, StorageKeys, StorageResult};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Credentials issued by a login or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub jwt: String,
    pub expire_at: DateTime<Utc>,
}

/// High-level API over a [`SessionStorage`] backend.
pub struct SessionVault {
    storage: Box<dyn SessionStorage>,
}

impl SessionVault {
    pub fn new(storage: Box<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    // ==========================================
    // Tokens
    // ==========================================

    /// Store all three token keys in one backend write.
    pub fn set_tokens(&self, tokens: &TokenSet) -> StorageResult<()> {
        let expire_date = tokens.expire_at.to_rfc3339();
        self.storage.set_many(&[
            (StorageKeys::ACCESS_TOKEN, tokens.access_token.as_str()),
            (StorageKeys::JWT, tokens.jwt.as_str()),
            (StorageKeys::EXPIRE_DATE, expire_date.as_str()),
        ])
    }

    pub fn get_access_token(&self) -> StorageResult<Option<String>> {
        self.storage.get(StorageKeys::ACCESS_TOKEN)
    }

    pub fn get_jwt(&self) -> StorageResult<Option<String>> {
        self.storage.get(StorageKeys::JWT)
    }

    /// Stored expiry. An unparseable value reads as `None`.
    pub fn get_expire_at(&self) -> StorageResult<Option<DateTime<Utc>>> {
        Ok(self
            .storage
            .get(StorageKeys::EXPIRE_DATE)?
            .and_then(|raw| {
                let parsed = parse_expire_date(&raw);
                if parsed.is_none() {
                    tracing::warn!(value = %raw, "unparseable expireDate in session record");
                }
                parsed
            }))
    }

    /// The complete token set, if all three parts are present and valid.
    pub fn get_tokens(&self) -> StorageResult<Option<TokenSet>> {
        let (Some(access_token), Some(jwt), Some(expire_at)) = (
            self.get_access_token()?,
            self.get_jwt()?,
            self.get_expire_at()?,
        ) else {
            return Ok(None);
        };
        Ok(Some(TokenSet {
            access_token,
            jwt,
            expire_at,
        }))
    }

    /// `true` once `now >= expire_at`. A missing or unparseable expiry
    /// counts as expired.
    pub fn is_token_expired(&self, now: DateTime<Utc>) -> StorageResult<bool> {
        Ok(match self.get_expire_at()? {
            Some(expire_at) => now >= expire_at,
            None => true,
        })
    }

    pub fn clear_tokens(&self) -> StorageResult<()> {
        for key in StorageKeys::TOKEN_KEYS {
            self.storage.delete(key)?;
        }
        Ok(())
    }

    // ==========================================
    // Provider and user
    // ==========================================

    pub fn set_provider(&self, provider: &str) -> StorageResult<()> {
        self.storage.set(StorageKeys::PROVIDER, provider)
    }

    pub fn get_provider(&self) -> StorageResult<Option<String>> {
        self.storage.get(StorageKeys::PROVIDER)
    }

    pub fn set_user_json<T: Serialize>(&self, user: &T) -> StorageResult<()> {
        let json =
            serde_json::to_string(user).map_err(|e| StorageError::Encoding(e.to_string()))?;
        self.storage.set(StorageKeys::USER_INFO, &json)
    }

    pub fn get_user_json<T: DeserializeOwned>(&self) -> StorageResult<Option<T>> {
        match self.storage.get(StorageKeys::USER_INFO)? {
            Some(json) => {
                let user =
                    serde_json::from_str(&json).map_err(|e| StorageError::Encoding(e.to_string()))?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    // ==========================================
    // Clear All
    // ==========================================

    /// Remove every key of the session record. Keeps going past individual
    /// failures and reports the first one.
    pub fn clear_all(&self) -> StorageResult<()> {
        let mut first_error = None;
        for key in StorageKeys::ALL {
            if let Err(e) = self.storage.delete(key) {
                tracing::warn!(key, error = %e, "failed to delete session key");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStorage;
    use chrono::Duration;

    fn vault() -> SessionVault {
        SessionVault::new(Box::new(MemoryStorage::new()))
    }

    fn tokens(expire_at: DateTime<Utc>) -> TokenSet {
        TokenSet {
            access_token: "t1".to_string(),
            jwt: "j1".to_string(),
            expire_at,
        }
    }

    #[test]
    fn test_tokens_roundtrip() {
        let vault = vault();
        let expire_at = Utc::now() + Duration::hours(1);
        vault.set_tokens(&tokens(expire_at)).unwrap();

        assert_eq!(vault.get_jwt().unwrap(), Some("j1".to_string()));
        assert_eq!(vault.get_access_token().unwrap(), Some("t1".to_string()));
        assert_eq!(vault.get_expire_at().unwrap(), Some(expire_at));
        assert_eq!(vault.get_tokens().unwrap(), Some(tokens(expire_at)));
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let vault = vault();
        let expire_at = Utc::now();
        vault.set_tokens(&tokens(expire_at)).unwrap();

        assert!(!vault.is_token_expired(expire_at - Duration::seconds(1)).unwrap());
        assert!(vault.is_token_expired(expire_at).unwrap());
        assert!(vault.is_token_expired(expire_at + Duration::minutes(1)).unwrap());
    }

    #[test]
    fn test_missing_or_garbage_expiry_counts_as_expired() {
        let storage = MemoryStorage::new();
        storage.set(StorageKeys::JWT, "j1").unwrap();
        storage.set(StorageKeys::EXPIRE_DATE, "someday").unwrap();
        let vault = SessionVault::new(Box::new(storage));

        assert!(vault.is_token_expired(Utc::now()).unwrap());
        assert_eq!(vault.get_expire_at().unwrap(), None);
        assert_eq!(vault.get_tokens().unwrap(), None);

        vault.clear_tokens().unwrap();
        assert!(vault.is_token_expired(Utc::now()).unwrap());
    }

    #[test]
    fn test_reads_compact_expiry_written_by_backend() {
        let storage = MemoryStorage::new();
        storage.set(StorageKeys::EXPIRE_DATE, "20990101000000").unwrap();
        let vault = SessionVault::new(Box::new(storage));

        assert!(!vault.is_token_expired(Utc::now()).unwrap());
    }

    #[test]
    fn test_user_and_provider() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Profile {
            id: String,
        }

        let vault = vault();
        assert_eq!(vault.get_user_json::<Profile>().unwrap(), None);

        vault.set_provider("KAKAO").unwrap();
        vault.set_user_json(&Profile { id: "u1".into() }).unwrap();

        assert_eq!(vault.get_provider().unwrap(), Some("KAKAO".to_string()));
        assert_eq!(
            vault.get_user_json::<Profile>().unwrap(),
            Some(Profile { id: "u1".into() })
        );
    }

    #[test]
    fn test_clear_tokens_keeps_user() {
        let vault = vault();
        vault.set_tokens(&tokens(Utc::now())).unwrap();
        vault.set_provider("NAVER").unwrap();

        vault.clear_tokens().unwrap();
        assert_eq!(vault.get_jwt().unwrap(), None);
        assert_eq!(vault.get_provider().unwrap(), Some("NAVER".to_string()));
    }

    #[test]
    fn test_failed_token_write_keeps_previous_set() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("state");
        let vault = SessionVault::new(Box::new(
            crate::FileStorage::open(parent.join("session.json")).unwrap(),
        ));
        let old = tokens(Utc::now() + Duration::hours(1));
        vault.set_tokens(&old).unwrap();

        // Make the directory unusable so the next write cannot land.
        std::fs::remove_dir_all(&parent).unwrap();
        std::fs::write(&parent, "not a directory").unwrap();

        let new = TokenSet {
            access_token: "t2".to_string(),
            jwt: "j2".to_string(),
            expire_at: Utc::now() + Duration::hours(2),
        };
        assert!(vault.set_tokens(&new).is_err());
        assert_eq!(vault.get_tokens().unwrap(), Some(old));
    }

    #[test]
    fn test_clear_all() {
        let vault = vault();
        vault.set_tokens(&tokens(Utc::now())).unwrap();
        vault.set_provider("NAVER").unwrap();
        vault.set_user_json(&serde_json::json!({"id": "u1"})).unwrap();

        vault.clear_all().unwrap();
        assert_eq!(vault.get_jwt().unwrap(), None);
        assert_eq!(vault.get_provider().unwrap(), None);
        assert_eq!(vault.get_user_json::<serde_json::Value>().unwrap(), None);
    }
}
