//! Current user and provider state.

use crate::LoginProvider;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Profile returned by the backend after a provider login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthyear: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
}

impl UserProfile {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Best label for display: nickname, then name, then email, then id.
    pub fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .or(self.name.as_deref())
            .or(self.email.as_deref())
            .or(self.id.as_deref())
            .unwrap_or("unknown")
    }
}

#[derive(Debug, Default)]
struct UserSlot {
    user: Option<UserProfile>,
    provider: Option<LoginProvider>,
}

/// In-memory `{ user, provider }` store.
#[derive(Debug, Default)]
pub struct UserStore {
    inner: RwLock<UserSlot>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.inner.read().user.clone()
    }

    pub fn provider(&self) -> Option<LoginProvider> {
        self.inner.read().provider
    }

    pub fn set_user(&self, user: UserProfile) {
        self.inner.write().user = Some(user);
    }

    pub fn clear_user(&self) {
        self.inner.write().user = None;
    }

    pub fn set_provider(&self, provider: LoginProvider) {
        self.inner.write().provider = Some(provider);
    }

    pub fn clear_provider(&self) {
        self.inner.write().provider = None;
    }

    pub fn is_logged_in(&self) -> bool {
        self.inner.read().user.is_some()
    }
}
