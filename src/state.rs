use std::sync::Arc;

use crate::clients::api::ApiClient;
use crate::config::{Config, CredentialBackend};
use crate::domain::auth::{AuthEvent, AuthPhase, AuthState};
use crate::models::{AuthToken, User};
use crate::services::credentials::CredentialGenerator;
use crate::services::{AuthError, AuthService, DefaultAuthService};
use crate::storage::{
    FileSessionCache, MemorySessionCache, SessionCache, build_credential_store,
};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// The same client backs the API client and the remote credential store.
fn build_shared_http_client(config: &Config) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(
            config.api.request_timeout_seconds,
        ))
        .user_agent(config.api.user_agent.clone())
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// Application root: owns the auth state and the services that change it.
pub struct App {
    auth: Arc<dyn AuthService>,

    api: Arc<ApiClient>,

    state: AuthState,
}

impl App {
    #[must_use]
    pub fn new(auth: Arc<dyn AuthService>, api: Arc<ApiClient>) -> Self {
        Self {
            auth,
            api,
            state: AuthState::default(),
        }
    }

    /// Wires the services selected by `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = build_shared_http_client(config)?;
        let api = Arc::new(ApiClient::new(http.clone(), config.api.base_url.clone()));

        let credentials = build_credential_store(config, http)?;
        let session_cache: Arc<dyn SessionCache> = match config.storage.backend {
            CredentialBackend::Memory => Arc::new(MemorySessionCache::new()),
            CredentialBackend::File | CredentialBackend::Remote => {
                Arc::new(FileSessionCache::new(config.session_path()))
            }
        };

        let auth = Arc::new(DefaultAuthService::new(
            api.clone(),
            credentials,
            session_cache,
            CredentialGenerator::default(),
        ));

        Ok(Self::new(auth, api))
    }

    #[must_use]
    pub const fn state(&self) -> &AuthState {
        &self.state
    }

    #[must_use]
    pub const fn phase(&self) -> AuthPhase {
        self.state.phase()
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    #[must_use]
    pub fn token(&self) -> Option<&AuthToken> {
        self.state.token.as_ref()
    }

    fn dispatch(&mut self, event: AuthEvent) {
        self.state = std::mem::take(&mut self.state).apply(event);
    }

    /// Runs cold-start reconciliation. Always ends in a definite phase.
    pub async fn start(&mut self) -> AuthPhase {
        let reconciliation = self.auth.reconcile().await;
        self.dispatch(AuthEvent::Reconciled(reconciliation));
        self.phase()
    }

    pub async fn seamless_register(&mut self, display_name: &str) -> Result<User, AuthError> {
        let session = self.auth.seamless_register(display_name).await?;
        let user = session.user.clone();
        self.dispatch(AuthEvent::SignedIn(session));
        Ok(user)
    }

    pub async fn restore(&mut self) -> Result<User, AuthError> {
        let session = self
            .auth
            .restore_from_cloud(self.state.stored_credentials.as_ref())
            .await?;
        let user = session.user.clone();
        self.dispatch(AuthEvent::Restored(session));
        Ok(user)
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<User, AuthError> {
        let session = self.auth.login(username, password).await?;
        let user = session.user.clone();
        self.dispatch(AuthEvent::SignedIn(session));
        Ok(user)
    }

    pub async fn register(
        &mut self,
        username: &str,
        password: &str,
        name: &str,
    ) -> Result<User, AuthError> {
        let session = self.auth.register(username, password, name).await?;
        let user = session.user.clone();
        self.dispatch(AuthEvent::SignedIn(session));
        Ok(user)
    }

    pub async fn logout(&mut self) -> Result<(), AuthError> {
        self.auth.logout().await?;
        let stored_credentials = self.auth.stored_credentials().await;
        self.dispatch(AuthEvent::LoggedOut { stored_credentials });
        Ok(())
    }
}
