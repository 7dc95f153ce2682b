//! In-process backends. Nothing here survives a restart; used for tests and
//! for `storage.backend = "memory"` throwaway sessions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::{CredentialStore, SessionCache, StorageError};
use crate::models::StoredCredentials;

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    record: Mutex<Option<StoredCredentials>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_record(credentials: StoredCredentials) -> Self {
        Self {
            record: Mutex::new(Some(credentials)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<StoredCredentials>>, StorageError> {
        self.record
            .lock()
            .map_err(|_| StorageError::Unavailable("credential store lock poisoned".to_string()))
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn save(&self, credentials: &StoredCredentials) -> Result<(), StorageError> {
        *self.lock()? = Some(credentials.clone());
        Ok(())
    }

    async fn load(&self) -> Option<StoredCredentials> {
        self.lock().ok().and_then(|record| record.clone())
    }

    async fn remove(&self) -> Result<(), StorageError> {
        *self.lock()? = None;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("session cache lock poisoned".to_string()))
    }
}

#[async_trait]
impl SessionCache for MemorySessionCache {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}
