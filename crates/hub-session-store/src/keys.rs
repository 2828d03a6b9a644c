//! Storage key constants.

/// Keys of the persisted session record.
pub struct StorageKeys;

impl StorageKeys {
    /// Provider-issued access token
    pub const ACCESS_TOKEN: &'static str = "accessToken";

    /// Backend-issued JWT sent as the bearer credential
    pub const JWT: &'static str = "jwt";

    /// Token expiry (RFC 3339; older records use `YYYYMMDDHHmmss`)
    pub const EXPIRE_DATE: &'static str = "expireDate";

    /// Login provider (`NAVER` / `KAKAO`)
    pub const PROVIDER: &'static str = "provider";

    /// User profile (JSON)
    pub const USER_INFO: &'static str = "userInfo";

    pub const TOKEN_KEYS: [&'static str; 3] = [Self::ACCESS_TOKEN, Self::JWT, Self::EXPIRE_DATE];

    pub const ALL: [&'static str; 5] = [
        Self::ACCESS_TOKEN,
        Self::JWT,
        Self::EXPIRE_DATE,
        Self::PROVIDER,
        Self::USER_INFO,
    ];
}
