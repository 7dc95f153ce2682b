//! Account command handlers

use std::path::Path;

use crate::clients::api::UpdateUserRequest;
use crate::config::Config;
use crate::domain::auth::AuthPhase;
use crate::services::AuthError;
use crate::state::App;

fn prompt(label: &str) -> anyhow::Result<String> {
    println!("{label}:");
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

/// Prints the failure and hands it back so the process exits non-zero.
fn auth_failure(action: &str, err: AuthError) -> anyhow::Error {
    println!("✗ {action}: {err}");
    if err.is_retryable() {
        println!("  Please try again.");
    }
    anyhow::Error::new(err).context(action.to_string())
}

pub fn cmd_status(app: &App) {
    let state = app.state();
    println!("Status: {}", app.phase());

    match app.phase() {
        AuthPhase::Authenticated => {
            if let Some(user) = &state.user {
                println!("  Signed in as {} ({})", user.name, user.username);
            }
        }
        AuthPhase::AnonymousReturning => {
            if let Some(name) = state.returning_display_name() {
                println!("  Welcome back! We found your previous account: {name}");
            }
            println!("  Restore it with: playparty restore");
            println!("  Or start over with: playparty onboard \"<display name>\"");
        }
        AuthPhase::AnonymousNew => {
            println!("  Get started with: playparty onboard \"<display name>\"");
            println!("  Have username and password? playparty login");
        }
        AuthPhase::Loading => {}
    }
}

pub fn cmd_whoami(app: &App) {
    match app.user() {
        Some(user) => {
            println!("{} ({})", user.name, user.username);
            println!("  ID: {}", user.id);
            if let Some(avatar) = &user.avatar {
                println!("  Avatar: {avatar}");
            }
            if user.is_admin() {
                println!("  Admin: yes");
            }
        }
        None => println!("Not signed in."),
    }
}

pub async fn cmd_onboard(app: &mut App, display_name: &str) -> anyhow::Result<()> {
    if app.phase() == AuthPhase::Authenticated {
        println!("Already signed in. Log out first with: playparty logout");
        return Ok(());
    }

    println!("Creating your account...");
    match app.seamless_register(display_name).await {
        Ok(user) => {
            println!("✓ Welcome, {}!", user.name);
            println!("  Your username is {}", user.username);
            println!("  Your credentials are stored for easy access next time.");
        }
        Err(e) => return Err(auth_failure("Failed to create account", e)),
    }

    Ok(())
}

pub async fn cmd_restore(app: &mut App) -> anyhow::Result<()> {
    if app.phase() == AuthPhase::Authenticated {
        println!("Already signed in.");
        return Ok(());
    }

    match app.restore().await {
        Ok(user) => println!("✓ Restored account: {} ({})", user.name, user.username),
        Err(AuthError::NoStoredCredentials) => {
            println!("No stored account found on this device.");
            println!("Create one with: playparty onboard \"<display name>\"");
            return Err(anyhow::Error::new(AuthError::NoStoredCredentials)
                .context("Failed to restore account"));
        }
        Err(e) => return Err(auth_failure("Failed to restore account", e)),
    }

    Ok(())
}

pub async fn cmd_login(
    app: &mut App,
    username: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let username = match username {
        Some(u) => u,
        None => prompt("Username")?,
    };
    let password = match password {
        Some(p) => p,
        None => prompt("Password")?,
    };

    match app.login(&username, &password).await {
        Ok(user) => println!("✓ Signed in as {} ({})", user.name, user.username),
        Err(e) => return Err(auth_failure("Failed to sign in", e)),
    }

    Ok(())
}

pub async fn cmd_register(
    app: &mut App,
    username: &str,
    name: &str,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt("Password")?,
    };

    match app.register(username, &password, name).await {
        Ok(user) => println!("✓ Registered and signed in as {}", user.username),
        Err(e) => return Err(auth_failure("Failed to register", e)),
    }

    Ok(())
}

pub async fn cmd_logout(app: &mut App) -> anyhow::Result<()> {
    if app.phase() != AuthPhase::Authenticated {
        println!("Not signed in.");
        return Ok(());
    }

    app.logout().await?;
    println!("✓ Logged out.");
    if let Some(name) = app.state().returning_display_name() {
        println!("  Your account ({name}) can be restored with: playparty restore");
    }

    Ok(())
}

pub async fn cmd_rename(app: &mut App, name: &str) -> anyhow::Result<()> {
    let Some(token) = app.token().cloned() else {
        println!("Not signed in.");
        return Ok(());
    };

    let name = name.trim();
    if name.is_empty() {
        println!("Display name cannot be empty.");
        return Ok(());
    }

    let request = UpdateUserRequest {
        name: Some(name.to_string()),
        ..UpdateUserRequest::default()
    };
    let user = app.api().update_user(&token, &request).await?;
    println!("✓ Display name changed to {}", user.name);

    Ok(())
}

pub fn cmd_init(path: &Path) -> anyhow::Result<()> {
    if !Config::create_default_if_missing(path)? {
        println!("Config already exists: {}", path.display());
        return Ok(());
    }

    println!("✓ Created default config: {}", path.display());
    println!("  Edit [storage] to choose where your credentials are kept.");
    Ok(())
}
