//! Application-wide auth state and its transitions.
//!
//! The state is a plain value owned by the application root. Every change
//! goes through [`AuthState::apply`], which is a pure function of the old
//! state and an [`AuthEvent`].

use std::fmt;

use crate::models::{AuthToken, Session, StoredCredentials, User};
use crate::services::auth_service::Reconciliation;

/// Where the user stands, derived from [`AuthState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    /// Reconciliation has not finished yet.
    Loading,
    /// No session and nothing to restore.
    AnonymousNew,
    /// No session, but stored credentials can be restored.
    AnonymousReturning,
    Authenticated,
}

impl fmt::Display for AuthPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Loading => "loading",
            Self::AnonymousNew => "anonymous (new)",
            Self::AnonymousReturning => "anonymous (returning)",
            Self::Authenticated => "authenticated",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// Cold-start reconciliation finished.
    Reconciled(Reconciliation),

    /// Login, manual registration or seamless registration succeeded.
    SignedIn(Session),

    /// Stored credentials were used to sign back in.
    Restored(Session),

    /// Session token dropped. Carries whatever the credential store holds now
    /// so the user can be offered a restore right away.
    LoggedOut {
        stored_credentials: Option<StoredCredentials>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub token: Option<AuthToken>,

    pub user: Option<User>,

    /// Restorable credentials, present only while signed out.
    pub stored_credentials: Option<StoredCredentials>,

    pub is_loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            token: None,
            user: None,
            stored_credentials: None,
            is_loading: true,
        }
    }
}

impl AuthState {
    #[must_use]
    pub fn apply(self, event: AuthEvent) -> Self {
        match event {
            AuthEvent::Reconciled(Reconciliation {
                session: Some(session),
                ..
            }) => Self::signed_in(session),
            AuthEvent::Reconciled(Reconciliation {
                session: None,
                stored_credentials,
            }) => Self::signed_out(stored_credentials),
            AuthEvent::SignedIn(session) | AuthEvent::Restored(session) => {
                Self::signed_in(session)
            }
            AuthEvent::LoggedOut { stored_credentials } => Self::signed_out(stored_credentials),
        }
    }

    fn signed_in(session: Session) -> Self {
        Self {
            token: Some(session.token),
            user: Some(session.user),
            stored_credentials: None,
            is_loading: false,
        }
    }

    fn signed_out(stored_credentials: Option<StoredCredentials>) -> Self {
        Self {
            token: None,
            user: None,
            stored_credentials,
            is_loading: false,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> AuthPhase {
        if self.is_loading {
            AuthPhase::Loading
        } else if self.token.is_some() && self.user.is_some() {
            AuthPhase::Authenticated
        } else if self.stored_credentials.is_some() {
            AuthPhase::AnonymousReturning
        } else {
            AuthPhase::AnonymousNew
        }
    }

    /// Display name of the restorable account, for "welcome back" prompts.
    #[must_use]
    pub fn returning_display_name(&self) -> Option<&str> {
        self.stored_credentials
            .as_ref()
            .map(|c| c.display_name.as_str())
    }
}
