//! Storage trait definitions.

use crate::StorageResult;

/// A string key/value store holding the persisted session record.
pub trait SessionStorage: Send + Sync {
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Returns whether a value was removed.
    fn delete(&self, key: &str) -> StorageResult<bool>;

    /// Write several keys at once. Backends that can commit them together
    /// override this; the default writes them one by one and may leave a
    /// partial update behind on failure.
    fn set_many(&self, entries: &[(&str, &str)]) -> StorageResult<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
