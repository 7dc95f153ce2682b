//! Local key-value cache for the session token.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::warn;

use super::StorageError;

#[async_trait]
pub trait SessionCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Session cache persisted as a flat JSON object on the local device.
pub struct FileSessionCache {
    path: PathBuf,
    // Serializes read-modify-write of the whole file.
    lock: Mutex<()>,
}

impl FileSessionCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read(&self.path).await {
            Ok(content) => match serde_json::from_slice(&content) {
                Ok(entries) => Ok(entries),
                Err(e) => {
                    warn!(
                        "Discarding unreadable session cache {}: {}",
                        self.path.display(),
                        e
                    );
                    Ok(BTreeMap::new())
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StorageError::io("reading session cache", e)),
        }
    }

    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io("creating session cache directory", e))?;
        }

        let content = serde_json::to_vec(entries)?;

        let temp = self.temp_path();
        if let Err(e) = fs::write(&temp, &content).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StorageError::io("writing session cache", e));
        }
        if let Err(e) = fs::rename(&temp, &self.path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StorageError::io("replacing session cache", e));
        }

        Ok(())
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
impl SessionCache for FileSessionCache {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_entries().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_entries(&entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_cache() -> (FileSessionCache, PathBuf) {
        let dir = std::env::temp_dir().join(format!("playparty-session-{}", uuid::Uuid::new_v4()));
        (FileSessionCache::new(dir.join("session.json")), dir)
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let (cache, dir) = temp_cache();

        cache.set("auth_token", "tok").await.unwrap();
        cache.set("theme", "dark").await.unwrap();
        cache.remove("auth_token").await.unwrap();

        assert_eq!(cache.get("auth_token").await.unwrap(), None);
        assert_eq!(cache.get("theme").await.unwrap().as_deref(), Some("dark"));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn values_survive_a_new_handle() {
        let (cache, dir) = temp_cache();
        cache.set("auth_token", "tok").await.unwrap();

        let reopened = FileSessionCache::new(cache.path());
        assert_eq!(reopened.get("auth_token").await.unwrap().as_deref(), Some("tok"));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_empty() {
        let (cache, dir) = temp_cache();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(cache.path(), b"not json").unwrap();

        assert_eq!(cache.get("auth_token").await.unwrap(), None);

        cache.set("auth_token", "fresh").await.unwrap();
        assert_eq!(cache.get("auth_token").await.unwrap().as_deref(), Some("fresh"));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn writes_replace_the_file_without_leftovers() {
        let (cache, dir) = temp_cache();

        cache.set("auth_token", "first").await.unwrap();
        cache.set("auth_token", "second").await.unwrap();
        cache.remove("auth_token").await.unwrap();
        cache.set("theme", "dark").await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("session.json")]);

        // A stray temp file from an interrupted write does not affect reads.
        std::fs::write(dir.join("session.json.partial.tmp"), b"{\"auth_tok").unwrap();
        assert_eq!(cache.get("theme").await.unwrap().as_deref(), Some("dark"));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn removing_missing_key_does_not_create_file() {
        let (cache, dir) = temp_cache();
        cache.remove("auth_token").await.unwrap();
        assert!(!cache.path().exists());

        let _ = std::fs::remove_dir_all(dir);
    }
}
