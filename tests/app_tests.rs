//! Application-level tests: phase transitions driven through [`App`].

mod common;

use std::sync::Arc;

use common::{FakeAuthApi, conflict};
use mockito::{Matcher, Server};
use playparty::config::{Config, CredentialBackend};
use playparty::constants::keys::SESSION_TOKEN;
use playparty::domain::AuthPhase;
use playparty::models::StoredCredentials;
use playparty::services::{AuthError, CredentialGenerator, DefaultAuthService};
use playparty::state::App;
use playparty::cli::{Commands, dispatch};
use playparty::clients::ApiClient;
use playparty::storage::{CredentialStore, MemoryCredentialStore, MemorySessionCache, SessionCache};

struct TestApp {
    app: App,
    api: Arc<FakeAuthApi>,
    credentials: Arc<MemoryCredentialStore>,
    session_cache: Arc<MemorySessionCache>,
}

fn test_app(credentials: MemoryCredentialStore) -> TestApp {
    let api = Arc::new(FakeAuthApi::new());
    let credentials = Arc::new(credentials);
    let session_cache = Arc::new(MemorySessionCache::new());
    let auth = Arc::new(DefaultAuthService::new(
        api.clone(),
        credentials.clone(),
        session_cache.clone(),
        CredentialGenerator::default(),
    ));

    TestApp {
        app: App::new(auth, Arc::new(ApiClient::default())),
        api,
        credentials,
        session_cache,
    }
}

#[tokio::test]
async fn new_user_onboards_then_restores_after_logout() {
    let mut t = test_app(MemoryCredentialStore::new());
    assert_eq!(t.app.phase(), AuthPhase::Loading);

    assert_eq!(t.app.start().await, AuthPhase::AnonymousNew);

    let user = t.app.seamless_register("Alice").await.unwrap();
    assert_eq!(t.app.phase(), AuthPhase::Authenticated);
    assert_eq!(t.app.user().map(|u| u.username.as_str()), Some(user.username.as_str()));
    assert!(t.app.state().stored_credentials.is_none());

    t.app.logout().await.unwrap();
    assert_eq!(t.app.phase(), AuthPhase::AnonymousReturning);
    assert_eq!(t.app.state().returning_display_name(), Some("Alice"));
    assert!(t.credentials.load().await.is_some());

    let restored = t.app.restore().await.unwrap();
    assert_eq!(restored.username, user.username);
    assert_eq!(t.app.phase(), AuthPhase::Authenticated);
}

#[tokio::test]
async fn returning_user_is_offered_a_restore() {
    let mut t = test_app(MemoryCredentialStore::with_record(StoredCredentials::new(
        "bob123abcd",
        "p",
        "Bob",
    )));
    t.api.add_account("bob123abcd", "p", "Bob");

    assert_eq!(t.app.start().await, AuthPhase::AnonymousReturning);
    assert_eq!(t.app.state().returning_display_name(), Some("Bob"));

    let user = t.app.restore().await.unwrap();
    assert_eq!(user.username, "bob123abcd");
    assert!(t.app.state().stored_credentials.is_none());
    assert!(t.app.token().is_some());
}

#[tokio::test]
async fn cached_session_resumes_on_start() {
    let t = test_app(MemoryCredentialStore::new());
    t.api.add_account("bob123abcd", "p", "Bob");
    t.api.issue_token("live", "bob123abcd");
    t.session_cache.set(SESSION_TOKEN, "live").await.unwrap();
    let mut app = t.app;

    assert_eq!(app.start().await, AuthPhase::Authenticated);
    assert_eq!(app.user().unwrap().name, "Bob");
}

#[tokio::test]
async fn failed_onboarding_leaves_state_untouched() {
    let mut t = test_app(MemoryCredentialStore::new());
    t.app.start().await;
    t.api.fail_registrations((0..5).map(|_| conflict()));

    let err = t.app.seamless_register("Alice").await.unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(t.app.phase(), AuthPhase::AnonymousNew);
}

#[tokio::test]
async fn restore_with_nothing_stored_fails() {
    let mut t = test_app(MemoryCredentialStore::new());
    t.app.start().await;

    let err = t.app.restore().await.unwrap_err();

    assert!(matches!(err, AuthError::NoStoredCredentials));
    assert!(t.api.login_requests().is_empty());
}

#[tokio::test]
async fn manual_login_replaces_returning_state() {
    let mut t = test_app(MemoryCredentialStore::with_record(StoredCredentials::new(
        "bob123abcd",
        "p",
        "Bob",
    )));
    t.api.add_account("carol", "hunter22", "Carol");
    t.app.start().await;

    t.app.login("carol", "hunter22").await.unwrap();

    assert_eq!(t.app.phase(), AuthPhase::Authenticated);
    assert!(t.app.state().stored_credentials.is_none());

    t.app.logout().await.unwrap();
    // Manual login never replaced the stored identity.
    assert_eq!(t.app.state().returning_display_name(), Some("Bob"));
}

#[tokio::test]
async fn onboarding_over_http_with_memory_backend() {
    let mut server = Server::new_async().await;
    let register = server
        .mock("POST", "/auth/register")
        .match_body(Matcher::PartialJson(serde_json::json!({ "name": "Dana" })))
        .with_status(200)
        .with_body(r#"{"type":"bearer","token":"oat_dana"}"#)
        .create_async()
        .await;
    let user = server
        .mock("GET", "/auth/user")
        .match_header("authorization", "Bearer oat_dana")
        .with_status(200)
        .with_body(r#"{"id":7,"username":"Dana1a2b3c4d","name":"Dana"}"#)
        .create_async()
        .await;

    let mut config = Config::default();
    config.api.base_url = server.url();
    config.storage.backend = CredentialBackend::Memory;
    config.validate().unwrap();

    let mut app = App::from_config(&config).unwrap();
    assert_eq!(app.start().await, AuthPhase::AnonymousNew);

    let created = app.seamless_register("Dana").await.unwrap();

    register.assert_async().await;
    user.assert_async().await;
    assert_eq!(created.id, 7);
    assert_eq!(app.token().map(|t| t.as_str()), Some("oat_dana"));
}

#[tokio::test]
async fn onboarding_over_http_retries_taken_usernames() {
    let mut server = Server::new_async().await;
    let taken = server
        .mock("POST", "/auth/register")
        .with_status(422)
        .with_body(r#"{"errors":[{"message":"The username has already been taken"}]}"#)
        .expect(5)
        .create_async()
        .await;

    let mut config = Config::default();
    config.api.base_url = server.url();
    config.storage.backend = CredentialBackend::Memory;

    let mut app = App::from_config(&config).unwrap();
    app.start().await;

    let err = app.seamless_register("Eve").await.unwrap_err();

    taken.assert_async().await;
    assert!(matches!(err, AuthError::ExhaustedRetries { attempts: 5 }));
    assert_eq!(app.phase(), AuthPhase::AnonymousNew);
}

#[tokio::test]
async fn failed_onboard_command_returns_an_error() {
    let mut t = test_app(MemoryCredentialStore::new());
    t.app.start().await;
    t.api.fail_registrations((0..5).map(|_| conflict()));

    let result = dispatch(
        &mut t.app,
        Some(Commands::Onboard {
            name: vec!["Eve".to_string()],
        }),
    )
    .await;

    let err = result.expect_err("exhausted retries must fail the command");
    assert!(matches!(
        err.downcast_ref::<AuthError>(),
        Some(AuthError::ExhaustedRetries { attempts: 5 })
    ));
    assert_eq!(t.api.register_requests().len(), 5);
}

#[tokio::test]
async fn restore_command_without_stored_account_returns_an_error() {
    let mut t = test_app(MemoryCredentialStore::new());
    t.app.start().await;

    let err = dispatch(&mut t.app, Some(Commands::Restore))
        .await
        .expect_err("nothing to restore");

    assert!(matches!(
        err.downcast_ref::<AuthError>(),
        Some(AuthError::NoStoredCredentials)
    ));
}

#[tokio::test]
async fn successful_onboard_command_returns_ok() {
    let mut t = test_app(MemoryCredentialStore::new());
    t.app.start().await;

    dispatch(
        &mut t.app,
        Some(Commands::Onboard {
            name: vec!["Eve".to_string()],
        }),
    )
    .await
    .unwrap();

    assert_eq!(t.app.phase(), AuthPhase::Authenticated);
    assert!(t.credentials.load().await.is_some());
}
