//! Local generation of account credentials for seamless sign-up.
//!
//! Usernames are the sanitized display name plus a random suffix; passwords are
//! uniform draws from a fixed alphabet. Every random byte comes from a
//! [`RandomSource`], which in production is the operating system CSPRNG.

use rand::TryRngCore;
use rand::rngs::OsRng;
use std::sync::Arc;
use thiserror::Error;

use crate::constants::generation::{
    PASSWORD_ALPHABET, PASSWORD_LEN, PASSWORD_MAX_LEN, PASSWORD_MIN_LEN, USERNAME_ALPHABET,
    USERNAME_FALLBACK_BASE, USERNAME_MAX_BASE_LEN, USERNAME_MAX_LEN, USERNAME_MIN_LEN,
    USERNAME_SUFFIX_LEN,
};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Secure random source unavailable: {0}")]
    RandomSource(String),

    #[error("Generated username does not meet requirements")]
    InvalidUsername,

    #[error("Generated password does not meet requirements")]
    InvalidPassword,
}

/// Source of raw random bytes.
///
/// Implementations must be cryptographically secure: the generated password is
/// the only secret protecting a seamlessly created account.
pub trait RandomSource: Send + Sync {
    fn random_bytes(&self, len: usize) -> Result<Vec<u8>, GenerationError>;
}

/// Operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn random_bytes(&self, len: usize) -> Result<Vec<u8>, GenerationError> {
        let mut bytes = vec![0u8; len];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| GenerationError::RandomSource(e.to_string()))?;
        Ok(bytes)
    }
}

#[derive(Clone)]
pub struct CredentialGenerator {
    random: Arc<dyn RandomSource>,
}

impl Default for CredentialGenerator {
    fn default() -> Self {
        Self::new(Arc::new(OsRandom))
    }
}

impl CredentialGenerator {
    #[must_use]
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// Builds `<base><8 random alphanumerics>` from a display name.
    pub fn generate_username(&self, display_name: &str) -> Result<String, GenerationError> {
        let base = username_base(display_name);
        let suffix = self.random_string(USERNAME_SUFFIX_LEN, USERNAME_ALPHABET)?;
        let username = base + &suffix;

        if !is_valid_username(&username) {
            return Err(GenerationError::InvalidUsername);
        }

        Ok(username)
    }

    pub fn generate_password(&self) -> Result<String, GenerationError> {
        let password = self.random_string(PASSWORD_LEN, PASSWORD_ALPHABET)?;

        if !is_valid_password(&password) {
            return Err(GenerationError::InvalidPassword);
        }

        Ok(password)
    }

    fn random_string(&self, len: usize, alphabet: &[u8]) -> Result<String, GenerationError> {
        let bytes = self.random.random_bytes(len)?;
        if bytes.len() != len {
            return Err(GenerationError::RandomSource(format!(
                "expected {len} random bytes, got {}",
                bytes.len()
            )));
        }

        Ok(bytes
            .iter()
            .map(|b| char::from(alphabet[usize::from(*b) % alphabet.len()]))
            .collect())
    }
}

/// Strips everything outside `[A-Za-z0-9]`.
#[must_use]
pub fn sanitize_display_name(display_name: &str) -> String {
    display_name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

/// The deterministic prefix of a generated username.
#[must_use]
pub fn username_base(display_name: &str) -> String {
    let sanitized = sanitize_display_name(display_name);
    let mut base = if sanitized.is_empty() {
        USERNAME_FALLBACK_BASE.to_string()
    } else {
        sanitized
    };

    // ASCII only after sanitizing, so byte truncation is safe.
    base.truncate(USERNAME_MAX_BASE_LEN);

    if base.is_empty() {
        base.push('u');
    }

    base
}

#[must_use]
pub fn is_valid_username(username: &str) -> bool {
    (USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&username.len())
        && username.chars().all(|c| c.is_ascii_alphanumeric())
}

#[must_use]
pub fn is_valid_password(password: &str) -> bool {
    (PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&password.chars().count())
}
