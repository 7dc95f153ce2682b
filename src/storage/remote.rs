//! Credential store backed by a remote JSON document service.
//!
//! The record lives at `{base}/documents/{key}`: `GET` reads it (404 means
//! nothing stored), `PUT` replaces it, `DELETE` removes it.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::{debug, info, warn};
use url::Url;

use super::{CredentialStore, StorageError, decode_credentials};
use crate::models::StoredCredentials;

#[derive(Debug, Clone)]
pub struct RemoteCredentialStore {
    client: Client,
    document_url: String,
    api_key: Option<String>,
}

impl RemoteCredentialStore {
    #[must_use]
    pub fn new(client: Client, base_url: Url, document_key: String, api_key: Option<String>) -> Self {
        let document_url = format!(
            "{}/documents/{}",
            base_url.as_str().trim_end_matches('/'),
            urlencoding::encode(&document_key)
        );

        Self {
            client,
            document_url,
            api_key,
        }
    }

    #[must_use]
    pub fn document_url(&self) -> &str {
        &self.document_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn fetch(&self) -> Result<Option<Vec<u8>>, StorageError> {
        let response = self
            .authorize(self.client.get(&self.document_url))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Remote(format!("{status} - {body}")));
        }

        Ok(Some(response.bytes().await?.to_vec()))
    }
}

#[async_trait]
impl CredentialStore for RemoteCredentialStore {
    async fn save(&self, credentials: &StoredCredentials) -> Result<(), StorageError> {
        let response = self
            .authorize(self.client.put(&self.document_url))
            .json(credentials)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Remote(format!("{status} - {body}")));
        }

        info!("Credentials saved to {}", self.document_url);
        Ok(())
    }

    async fn load(&self) -> Option<StoredCredentials> {
        match self.fetch().await {
            Ok(Some(payload)) => decode_credentials(&payload, &self.document_url),
            Ok(None) => {
                debug!("No credentials document at {}", self.document_url);
                None
            }
            Err(e) => {
                warn!("Failed to load credentials from {}: {}", self.document_url, e);
                None
            }
        }
    }

    async fn remove(&self) -> Result<(), StorageError> {
        let response = self
            .authorize(self.client.delete(&self.document_url))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            info!("Credentials removed from {}", self.document_url);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(StorageError::Remote(format!("{status} - {body}")))
    }
}
