use serde::{Deserialize, Serialize};
use std::fmt;

/// Bearer token issued by the remote auth service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Profile returned by `GET /auth/user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,

    pub username: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_admin.unwrap_or(false)
    }
}

/// An authenticated session: the token plus the user it was validated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: AuthToken,

    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_deserializes_optional_fields() {
        let user: User =
            serde_json::from_str(r#"{"id": 7, "username": "alice", "name": "Alice"}"#).unwrap();
        assert_eq!(user.id, 7);
        assert!(user.avatar.is_none());
        assert!(!user.is_admin());

        let admin: User = serde_json::from_str(
            r#"{"id": 1, "username": "root", "name": "Root", "isAdmin": true}"#,
        )
        .unwrap();
        assert!(admin.is_admin());
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = AuthToken::new("oat_secret");
        assert_eq!(format!("{token:?}"), "AuthToken(<redacted>)");
        assert_eq!(token.as_str(), "oat_secret");
    }
}
