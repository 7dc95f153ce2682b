use serde::{Deserialize, Serialize};
use std::fmt;

/// Generated account credentials kept in the credential store so the account
/// can be restored on another device.
///
/// Field names match the stored JSON document (`username`, `password`,
/// `displayName`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredentials {
    pub username: String,

    pub password: String,

    /// Raw display name as typed by the user. Only the username derived from
    /// it is sanitized.
    pub display_name: String,
}

impl StoredCredentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            display_name: display_name.into(),
        }
    }
}

impl fmt::Debug for StoredCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("display_name", &self.display_name)
            .finish()
    }
}
