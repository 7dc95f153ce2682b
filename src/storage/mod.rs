//! Durable storage for the credential record and the session token.
//!
//! The credential store is the only thing the auth flows know about; which
//! backend sits behind it is decided once, when the application is composed.

pub mod file;
pub mod memory;
pub mod remote;
pub mod session_cache;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::config::{Config, CredentialBackend};
use crate::models::StoredCredentials;

pub use file::FileCredentialStore;
pub use memory::{MemoryCredentialStore, MemorySessionCache};
pub use remote::RemoteCredentialStore;
pub use session_cache::{FileSessionCache, SessionCache};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Remote store error: {0}")]
    Remote(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        Self::Remote(err.to_string())
    }
}

/// Persistence contract for the single credential record.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Replaces whatever record is stored.
    async fn save(&self, credentials: &StoredCredentials) -> Result<(), StorageError>;

    /// Returns the stored record.
    ///
    /// Read and decode failures are logged and reported as `None`: an
    /// unreadable store is the same as an empty one for callers.
    async fn load(&self) -> Option<StoredCredentials>;

    /// Deletes the record. Deleting an absent record succeeds.
    async fn remove(&self) -> Result<(), StorageError>;
}

/// Decodes a stored payload, rejecting anything that is not an object with
/// string `username`, `password` and `displayName` fields.
pub(crate) fn decode_credentials(payload: &[u8], source: &str) -> Option<StoredCredentials> {
    match serde_json::from_slice::<StoredCredentials>(payload) {
        Ok(credentials) => Some(credentials),
        Err(e) => {
            warn!("Invalid credentials format in {}: {}", source, e);
            None
        }
    }
}

/// Builds the credential store selected by `storage.backend`.
pub fn build_credential_store(
    config: &Config,
    http: reqwest::Client,
) -> anyhow::Result<Arc<dyn CredentialStore>> {
    let store: Arc<dyn CredentialStore> = match config.storage.backend {
        CredentialBackend::File => {
            Arc::new(FileCredentialStore::new(config.credentials_path()))
        }
        CredentialBackend::Remote => {
            let remote = &config.storage.remote;
            let base_url = url::Url::parse(&remote.url)?;
            Arc::new(RemoteCredentialStore::new(
                http,
                base_url,
                remote.document_key.clone(),
                remote.api_key.clone(),
            ))
        }
        CredentialBackend::Memory => Arc::new(MemoryCredentialStore::new()),
    };

    Ok(store)
}
