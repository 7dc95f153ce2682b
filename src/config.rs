use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::{DEFAULT_API_URL, USER_AGENT, keys};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub api: ApiConfig,

    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Directory for local state (session cache, file credential store).
    /// Empty means the platform data directory.
    pub data_dir: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            data_dir: String::new(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,

    /// Request timeout in seconds (default: 30). Also bounds how long startup
    /// waits to validate a cached session.
    pub request_timeout_seconds: u64,

    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout_seconds: 30,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    #[default]
    File,
    Remote,
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: CredentialBackend,

    /// Credential file for the `file` backend. Point it at a synced folder to
    /// make it recoverable. Defaults to `<data_dir>/user_credentials.json`.
    pub credentials_path: Option<String>,

    /// Defaults to `<data_dir>/session.json`.
    pub session_path: Option<String>,

    pub remote: RemoteStoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteStoreConfig {
    pub url: String,

    pub document_key: String,

    pub api_key: Option<String>,
}

impl Default for RemoteStoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            document_key: keys::CREDENTIALS.to_string(),
            api_key: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("playparty").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".playparty").join("config.toml"));
        }

        paths
    }

    /// Writes a default config to `path` unless a file is already there.
    /// Returns whether one was written.
    pub fn create_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }

        Self::default().save_to_path(path)?;
        info!("Created default config file: {}", path.display());
        Ok(true)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            anyhow::bail!("API base URL cannot be empty");
        }
        url::Url::parse(&self.api.base_url)
            .with_context(|| format!("Invalid API base URL: {}", self.api.base_url))?;

        if self.api.request_timeout_seconds == 0 {
            anyhow::bail!("API request timeout must be > 0");
        }

        if self.storage.backend == CredentialBackend::Remote {
            if self.storage.remote.url.is_empty() {
                anyhow::bail!("Remote credential store URL cannot be empty when backend is remote");
            }
            url::Url::parse(&self.storage.remote.url).with_context(|| {
                format!(
                    "Invalid remote credential store URL: {}",
                    self.storage.remote.url
                )
            })?;
            if self.storage.remote.document_key.is_empty() {
                anyhow::bail!("Remote credential store document key cannot be empty");
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        if !self.general.data_dir.is_empty() {
            return PathBuf::from(&self.general.data_dir);
        }

        dirs::data_dir().map_or_else(|| PathBuf::from(".playparty"), |d| d.join("playparty"))
    }

    #[must_use]
    pub fn credentials_path(&self) -> PathBuf {
        self.storage.credentials_path.as_ref().map_or_else(
            || self.data_dir().join(format!("{}.json", keys::CREDENTIALS)),
            PathBuf::from,
        )
    }

    #[must_use]
    pub fn session_path(&self) -> PathBuf {
        self.storage
            .session_path
            .as_ref()
            .map_or_else(|| self.data_dir().join("session.json"), PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://miniplayparty.fly.dev");
        assert_eq!(config.api.request_timeout_seconds, 30);
        assert_eq!(config.storage.backend, CredentialBackend::File);
        assert_eq!(config.storage.remote.document_key, "user_credentials");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[storage]"));
        assert!(toml_str.contains("backend = \"file\""));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [storage]
            backend = "remote"

            [storage.remote]
            url = "https://docs.example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.backend, CredentialBackend::Remote);
        assert_eq!(config.storage.remote.document_key, "user_credentials");
        assert_eq!(config.general.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_failures() {
        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.storage.backend = CredentialBackend::Remote;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.api.request_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_storage_paths() {
        let mut config = Config::default();
        config.general.data_dir = "/tmp/playparty-test".to_string();
        assert_eq!(
            config.credentials_path(),
            PathBuf::from("/tmp/playparty-test/user_credentials.json")
        );
        assert_eq!(
            config.session_path(),
            PathBuf::from("/tmp/playparty-test/session.json")
        );

        config.storage.credentials_path = Some("/sync/creds.json".to_string());
        assert_eq!(config.credentials_path(), PathBuf::from("/sync/creds.json"));
    }

    #[test]
    fn test_create_default_if_missing() {
        let dir = std::env::temp_dir().join(format!("playparty-init-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");

        assert!(Config::create_default_if_missing(&path).unwrap());
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[storage]"));

        std::fs::write(&path, "[general]\nlog_level = \"debug\"\n").unwrap();
        assert!(!Config::create_default_if_missing(&path).unwrap());
        let kept = Config::load_from_path(&path).unwrap();
        assert_eq!(kept.general.log_level, "debug");

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = std::env::temp_dir().join(format!("playparty-config-{}.toml", uuid::Uuid::new_v4()));

        let mut config = Config::default();
        config.storage.backend = CredentialBackend::Memory;
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.storage.backend, CredentialBackend::Memory);

        let _ = std::fs::remove_file(path);
    }
}
