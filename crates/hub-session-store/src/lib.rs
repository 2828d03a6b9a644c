//! Persisted session record for the ContentHub client.
//!
//! The record is a flat string key/value map (`accessToken`, `jwt`,
//! `expireDate`, `provider`, `userInfo`). Backends:
//! - [`MemoryStorage`]: process-local, lost on exit
//! - [`FileStorage`]: a JSON object file rewritten atomically on every change
//!
//! [`SessionVault`] is the typed API the session context works against.

mod expiry;
mod file;
mod keys;
mod memory;
mod traits;
mod vault;

pub use expiry::{parse_expire_date, COMPACT_EXPIRE_FORMAT};
pub use file::FileStorage;
pub use keys::StorageKeys;
pub use memory::MemoryStorage;
pub use traits::SessionStorage;
pub use vault::{SessionVault, TokenSet};

use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend-specific failure
    #[error("Platform storage error: {0}")]
    Platform(String),

    #[error("Key not found: {0}")]
    NotFound(String),

    /// A stored value could not be encoded or decoded
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;
