//! Persisted wallet state
//!
//! Two string keys, no version field:
//! - `encrypted_vault`: base64 vault blob
//! - `account_count`: decimal number of derived accounts
//!
//! [`VaultStore`] is the seam backends implement; [`MemoryStore`] is the
//! process-local implementation.

use crate::chain::MAX_ACCOUNT_INDEX;
use crate::vault::EncryptedVault;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

pub const ENCRYPTED_VAULT_KEY: &str = "encrypted_vault";
pub const ACCOUNT_COUNT_KEY: &str = "account_count";

/// Account count assumed when none has been persisted
pub const DEFAULT_ACCOUNT_COUNT: u32 = 1;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(#[source] BoxError),
    #[error("Stored account count is invalid: {0:?}")]
    CorruptCount(String),
}

impl StoreError {
    fn backend<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
        StoreError::Backend(Box::new(err))
    }
}

/// Key-value persistence for wallet state
pub trait VaultStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;
    fn delete(&self, key: &str) -> Result<(), Self::Error>;
}

impl<S: VaultStore + ?Sized> VaultStore for &S {
    type Error = S::Error;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), Self::Error> {
        (**self).delete(key)
    }
}

/// Raw vault blob text, if one has been saved
pub fn load_vault<S: VaultStore>(store: &S) -> Result<Option<String>, StoreError> {
    store.get(ENCRYPTED_VAULT_KEY).map_err(StoreError::backend)
}

pub fn save_vault<S: VaultStore>(
    store: &S,
    vault: &EncryptedVault,
) -> Result<(), StoreError> {
    store
        .set(ENCRYPTED_VAULT_KEY, &vault.to_string())
        .map_err(StoreError::backend)
}

/// Largest account count that still fits the hardened index range
pub const MAX_ACCOUNT_COUNT: u32 = MAX_ACCOUNT_INDEX + 1;

/// Persisted account count; [`DEFAULT_ACCOUNT_COUNT`] when absent.
///
/// The value is not authenticated, so anything above [`MAX_ACCOUNT_COUNT`]
/// is reported as corrupt.
pub fn load_account_count<S: VaultStore>(store: &S) -> Result<u32, StoreError> {
    let Some(raw) = store.get(ACCOUNT_COUNT_KEY).map_err(StoreError::backend)? else {
        return Ok(DEFAULT_ACCOUNT_COUNT);
    };
    match raw.trim().parse::<u32>() {
        Ok(count) if count <= MAX_ACCOUNT_COUNT => Ok(count),
        _ => Err(StoreError::CorruptCount(raw)),
    }
}

pub fn save_account_count<S: VaultStore>(
    store: &S,
    count: u32,
) -> Result<(), StoreError> {
    store
        .set(ACCOUNT_COUNT_KEY, &count.to_string())
        .map_err(StoreError::backend)
}

/// Remove the vault and the account count
pub fn clear<S: VaultStore>(store: &S) -> Result<(), StoreError> {
    store.delete(ENCRYPTED_VAULT_KEY).map_err(StoreError::backend)?;
    store.delete(ACCOUNT_COUNT_KEY).map_err(StoreError::backend)?;
    log::info!("Wallet state cleared");
    Ok(())
}

#[derive(Error, Debug)]
#[error("Memory store lock poisoned")]
pub struct MemoryStoreError;

impl<T> From<PoisonError<T>> for MemoryStoreError {
    fn from(_: PoisonError<T>) -> Self {
        MemoryStoreError
    }
}

/// In-process store backed by a `HashMap`
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl VaultStore for MemoryStore {
    type Error = MemoryStoreError;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.entries.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.entries
            .lock()?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), Self::Error> {
        self.entries.lock()?.remove(key);
        Ok(())
    }
}
