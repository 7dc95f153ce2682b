//! Credential store backed by a JSON file.
//!
//! Point the path at a directory the platform syncs off-device (iCloud Drive,
//! a synced home folder, ...) to make the record recoverable after data loss.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use super::{CredentialStore, StorageError, decode_credentials};
use crate::models::StoredCredentials;

#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}.tmp", uuid::Uuid::new_v4()));
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn save(&self, credentials: &StoredCredentials) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io("creating credentials directory", e))?;
        }

        let content = serde_json::to_vec_pretty(credentials)?;

        // Write-then-rename so a crash never leaves a half-written record.
        let temp = self.temp_path();
        if let Err(e) = fs::write(&temp, &content).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StorageError::io("writing credentials", e));
        }
        if let Err(e) = fs::rename(&temp, &self.path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StorageError::io("replacing credentials file", e));
        }

        info!("Credentials saved to {}", self.path.display());
        Ok(())
    }

    async fn load(&self) -> Option<StoredCredentials> {
        match fs::read(&self.path).await {
            Ok(content) => decode_credentials(&content, &self.path.display().to_string()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No credentials file at {}", self.path.display());
                None
            }
            Err(e) => {
                warn!(
                    "Failed to read credentials from {}: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    async fn remove(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("Credentials removed from {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io("removing credentials", e)),
        }
    }
}
