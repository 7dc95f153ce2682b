//! Shared fakes for the auth flow tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use playparty::clients::api::{AuthApi, LoginRequest, RegisterRequest, RemoteError, TokenResponse};
use playparty::models::{AuthToken, StoredCredentials, User};
use playparty::services::{CredentialGenerator, DefaultAuthService};
use playparty::storage::{CredentialStore, MemoryCredentialStore, MemorySessionCache, StorageError};

/// In-process stand-in for the remote auth service.
///
/// Registration outcomes can be scripted; once the script runs out every
/// registration succeeds and creates a real account that can log in.
#[derive(Default)]
pub struct FakeAuthApi {
    register_script: Mutex<VecDeque<RemoteError>>,
    accounts: Mutex<HashMap<String, (String, User)>>,
    tokens: Mutex<HashMap<String, User>>,
    register_requests: Mutex<Vec<RegisterRequest>>,
    login_requests: Mutex<Vec<LoginRequest>>,
    get_user_calls: AtomicUsize,
}

impl FakeAuthApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues failures returned by the next registrations, in order.
    pub fn fail_registrations(&self, errors: impl IntoIterator<Item = RemoteError>) {
        self.register_script.lock().unwrap().extend(errors);
    }

    pub fn add_account(&self, username: &str, password: &str, name: &str) {
        let user = make_user(self.accounts.lock().unwrap().len() as i64 + 1, username, name);
        self.accounts
            .lock()
            .unwrap()
            .insert(username.to_string(), (password.to_string(), user));
    }

    /// Makes `token` valid for an existing account.
    pub fn issue_token(&self, token: &str, username: &str) {
        let user = self.accounts.lock().unwrap()[username].1.clone();
        self.tokens.lock().unwrap().insert(token.to_string(), user);
    }

    pub fn register_requests(&self) -> Vec<RegisterRequest> {
        self.register_requests.lock().unwrap().clone()
    }

    pub fn login_requests(&self) -> Vec<LoginRequest> {
        self.login_requests.lock().unwrap().clone()
    }

    pub fn get_user_calls(&self) -> usize {
        self.get_user_calls.load(Ordering::SeqCst)
    }

    fn sign_in(&self, user: User) -> TokenResponse {
        let token = format!("token-{}-{}", user.username, self.tokens.lock().unwrap().len());
        self.tokens.lock().unwrap().insert(token.clone(), user);
        TokenResponse {
            token_type: "bearer".to_string(),
            token: AuthToken::new(token),
        }
    }
}

#[async_trait]
impl AuthApi for FakeAuthApi {
    async fn register(&self, request: &RegisterRequest) -> Result<TokenResponse, RemoteError> {
        self.register_requests.lock().unwrap().push(request.clone());

        if let Some(err) = self.register_script.lock().unwrap().pop_front() {
            return Err(err);
        }
        if self.accounts.lock().unwrap().contains_key(&request.username) {
            return Err(RemoteError::rejected(422, "Username already taken"));
        }

        self.add_account(&request.username, &request.password, &request.name);
        let user = self.accounts.lock().unwrap()[&request.username].1.clone();
        Ok(self.sign_in(user))
    }

    async fn login(&self, request: &LoginRequest) -> Result<TokenResponse, RemoteError> {
        self.login_requests.lock().unwrap().push(request.clone());

        let account = self.accounts.lock().unwrap().get(&request.username).cloned();
        match account {
            Some((password, user)) if password == request.password => Ok(self.sign_in(user)),
            _ => Err(RemoteError::rejected(400, "Invalid user credentials")),
        }
    }

    async fn get_user(&self, token: &AuthToken) -> Result<User, RemoteError> {
        self.get_user_calls.fetch_add(1, Ordering::SeqCst);
        self.tokens
            .lock()
            .unwrap()
            .get(token.as_str())
            .cloned()
            .ok_or_else(|| RemoteError::rejected(401, "Unauthorized access"))
    }
}

/// Credential store whose writes always fail.
pub struct ReadOnlyCredentialStore;

#[async_trait]
impl CredentialStore for ReadOnlyCredentialStore {
    async fn save(&self, _credentials: &StoredCredentials) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("store is read-only".to_string()))
    }

    async fn load(&self) -> Option<StoredCredentials> {
        None
    }

    async fn remove(&self) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("store is read-only".to_string()))
    }
}

pub fn make_user(id: i64, username: &str, name: &str) -> User {
    User {
        id,
        username: username.to_string(),
        name: name.to_string(),
        avatar: None,
        is_admin: None,
    }
}

pub fn conflict() -> RemoteError {
    RemoteError::rejected(422, "Username already taken")
}

pub struct Harness {
    pub api: Arc<FakeAuthApi>,
    pub credentials: Arc<dyn CredentialStore>,
    pub session_cache: Arc<MemorySessionCache>,
    pub service: Arc<DefaultAuthService>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryCredentialStore::new()))
    }

    pub fn with_store(credentials: Arc<dyn CredentialStore>) -> Self {
        let api = Arc::new(FakeAuthApi::new());
        let session_cache = Arc::new(MemorySessionCache::new());
        let service = Arc::new(DefaultAuthService::new(
            api.clone(),
            credentials.clone(),
            session_cache.clone(),
            CredentialGenerator::default(),
        ));

        Self {
            api,
            credentials,
            session_cache,
            service,
        }
    }
}
