//! Domain service for account bootstrap and session management.
//!
//! Covers seamless sign-up (generated credentials), restoring a stored
//! identity, manual login/registration, logout and cold-start reconciliation.

use thiserror::Error;

use crate::clients::api::RemoteError;
use crate::models::{Session, StoredCredentials};
use crate::services::credentials::GenerationError;
use crate::storage::StorageError;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Failure reported by the remote service, passed through unchanged.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Failed to create account after multiple attempts")]
    ExhaustedRetries { attempts: u32 },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("No stored credentials to restore")]
    NoStoredCredentials,
}

impl AuthError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether trying the same operation again later may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ExhaustedRetries { .. } | Self::Remote(RemoteError::Transport(_)))
    }
}

/// Outcome of cold-start reconciliation.
///
/// `stored_credentials` is only looked up when there is no live session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub session: Option<Session>,
    pub stored_credentials: Option<StoredCredentials>,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Determines the starting auth state from the session cache and the
    /// credential store. Never fails.
    async fn reconcile(&self) -> Reconciliation;

    /// Creates an account from a display name alone.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for a blank name,
    /// [`AuthError::ExhaustedRetries`] if every generated username collided,
    /// [`AuthError::Storage`] if the new credentials could not be persisted,
    /// or the remote error for any other registration failure.
    async fn seamless_register(&self, display_name: &str) -> Result<Session, AuthError>;

    /// Signs in with credentials found by [`AuthService::reconcile`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NoStoredCredentials`] when `stored` is `None`.
    async fn restore_from_cloud(
        &self,
        stored: Option<&StoredCredentials>,
    ) -> Result<Session, AuthError>;

    async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError>;

    async fn register(
        &self,
        username: &str,
        password: &str,
        name: &str,
    ) -> Result<Session, AuthError>;

    /// Drops the cached session token. Stored credentials are kept.
    async fn logout(&self) -> Result<(), AuthError>;

    /// Current contents of the credential store.
    async fn stored_credentials(&self) -> Option<StoredCredentials>;
}
