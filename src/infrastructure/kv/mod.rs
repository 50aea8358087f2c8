pub mod file;
pub mod in_memory;

use crate::core::errors::LedgerError;

/// Local string key-value persistence, the same shape as browser local storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError>;
    fn set(&self, key: &str, value: &str) -> Result<(), LedgerError>;
    fn remove(&self, key: &str) -> Result<(), LedgerError>;
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for Box<K> {
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LedgerError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), LedgerError> {
        (**self).remove(key)
    }
}
