//! Default implementation of the `AuthService` trait on top of the remote auth
//! API, a credential store and a session cache.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::clients::api::{AuthApi, LoginRequest, RegisterRequest, RemoteError};
use crate::constants::keys::SESSION_TOKEN;
use crate::constants::limits::MAX_REGISTRATION_ATTEMPTS;
use crate::models::{AuthToken, Session, StoredCredentials};
use crate::services::auth_service::{AuthError, AuthService, Reconciliation};
use crate::services::credentials::CredentialGenerator;
use crate::storage::{CredentialStore, SessionCache};

/// Whether a registration failure means "that username is already in use".
///
/// The auth API has no structured error code for this, so the decision rests
/// on its message wording: it must mention "username" together with "taken",
/// "exists" or "already" (case-insensitive).
#[must_use]
pub fn is_username_conflict(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("username")
        && (message.contains("taken") || message.contains("exists") || message.contains("already"))
}

pub struct DefaultAuthService {
    api: Arc<dyn AuthApi>,
    credentials: Arc<dyn CredentialStore>,
    session_cache: Arc<dyn SessionCache>,
    generator: CredentialGenerator,
    // One auth flow at a time, so a store load/save pair is never interleaved.
    flow_lock: Mutex<()>,
}

impl DefaultAuthService {
    #[must_use]
    pub fn new(
        api: Arc<dyn AuthApi>,
        credentials: Arc<dyn CredentialStore>,
        session_cache: Arc<dyn SessionCache>,
        generator: CredentialGenerator,
    ) -> Self {
        Self {
            api,
            credentials,
            session_cache,
            generator,
            flow_lock: Mutex::new(()),
        }
    }

    /// Caches the token, then validates it by fetching its user.
    async fn establish_session(&self, token: AuthToken) -> Result<Session, AuthError> {
        self.session_cache
            .set(SESSION_TOKEN, token.as_str())
            .await?;
        let user = self.api.get_user(&token).await?;

        info!("Signed in as {}", user.username);
        Ok(Session { token, user })
    }

    async fn cached_token(&self) -> Option<AuthToken> {
        match self.session_cache.get(SESSION_TOKEN).await {
            Ok(token) => token.filter(|t| !t.is_empty()).map(AuthToken::new),
            Err(e) => {
                warn!("Failed to read session cache: {}", e);
                None
            }
        }
    }

    async fn clear_cached_token(&self) {
        if let Err(e) = self.session_cache.remove(SESSION_TOKEN).await {
            warn!("Failed to clear cached session token: {}", e);
        }
    }
}

#[async_trait]
impl AuthService for DefaultAuthService {
    async fn reconcile(&self) -> Reconciliation {
        let _guard = self.flow_lock.lock().await;

        if let Some(token) = self.cached_token().await {
            match self.api.get_user(&token).await {
                Ok(user) => {
                    info!("Resumed session for {}", user.username);
                    return Reconciliation {
                        session: Some(Session { token, user }),
                        stored_credentials: None,
                    };
                }
                Err(e) => {
                    warn!("Cached session token rejected, clearing it: {}", e);
                    self.clear_cached_token().await;
                }
            }
        }

        let stored_credentials = self.credentials.load().await;
        if let Some(creds) = &stored_credentials {
            info!("Found stored credentials for {}", creds.display_name);
        } else {
            debug!("No session and no stored credentials");
        }

        Reconciliation {
            session: None,
            stored_credentials,
        }
    }

    async fn seamless_register(&self, display_name: &str) -> Result<Session, AuthError> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(AuthError::validation("Please enter a display name"));
        }

        let _guard = self.flow_lock.lock().await;

        let mut attempt = 0;
        let (credentials, token) = loop {
            attempt += 1;

            let username = self.generator.generate_username(display_name)?;
            let password = self.generator.generate_password()?;
            debug!(
                "Registration attempt {}/{} as {}",
                attempt, MAX_REGISTRATION_ATTEMPTS, username
            );

            let request = RegisterRequest {
                username,
                password,
                name: display_name.to_string(),
                avatar: None,
            };

            match self.api.register(&request).await {
                Ok(response) => {
                    let credentials =
                        StoredCredentials::new(request.username, request.password, request.name);
                    break (credentials, response.token);
                }
                Err(e) if is_conflict(&e) => {
                    if attempt >= MAX_REGISTRATION_ATTEMPTS {
                        warn!(
                            "Username still taken after {} attempts, giving up",
                            attempt
                        );
                        return Err(AuthError::ExhaustedRetries { attempts: attempt });
                    }
                    debug!("Username {} taken, retrying", request.username);
                }
                Err(e) => return Err(e.into()),
            }
        };

        // Persist before the session exists: an account we could not store
        // must not look signed in.
        self.credentials.save(&credentials).await?;
        info!(
            "Created account {} after {} attempt(s)",
            credentials.username, attempt
        );

        self.establish_session(token).await
    }

    async fn restore_from_cloud(
        &self,
        stored: Option<&StoredCredentials>,
    ) -> Result<Session, AuthError> {
        let stored = stored.ok_or(AuthError::NoStoredCredentials)?;

        let _guard = self.flow_lock.lock().await;

        info!("Restoring account {}", stored.username);
        let response = self
            .api
            .login(&LoginRequest {
                username: stored.username.clone(),
                password: stored.password.clone(),
            })
            .await?;

        self.establish_session(response.token).await
    }

    async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::validation("Please enter username and password"));
        }

        let _guard = self.flow_lock.lock().await;

        let response = self
            .api
            .login(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await?;

        self.establish_session(response.token).await
    }

    async fn register(
        &self,
        username: &str,
        password: &str,
        name: &str,
    ) -> Result<Session, AuthError> {
        let username = username.trim();
        let name = name.trim();
        if username.is_empty() || password.is_empty() || name.is_empty() {
            return Err(AuthError::validation("Please fill in all fields"));
        }

        let _guard = self.flow_lock.lock().await;

        let response = self
            .api
            .register(&RegisterRequest {
                username: username.to_string(),
                password: password.to_string(),
                name: name.to_string(),
                avatar: None,
            })
            .await?;

        self.establish_session(response.token).await
    }

    async fn logout(&self) -> Result<(), AuthError> {
        let _guard = self.flow_lock.lock().await;

        self.session_cache.remove(SESSION_TOKEN).await?;
        info!("Logged out");
        Ok(())
    }

    async fn stored_credentials(&self) -> Option<StoredCredentials> {
        self.credentials.load().await
    }
}

fn is_conflict(err: &RemoteError) -> bool {
    is_username_conflict(&err.to_string())
}
