pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod domain;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;

use std::path::{Path, PathBuf};

pub use cli::Cli;
use cli::Commands;
pub use config::Config;
use state::App;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Loads the config named on the command line, or searches the usual
/// locations. A named file must exist unless `allow_missing` is set, in which
/// case a missing file yields defaults (used by `init`).
pub fn load_config(path: Option<&Path>, allow_missing: bool) -> anyhow::Result<Config> {
    match path {
        Some(path) if path.exists() => Config::load_from_path(path),
        Some(_) if allow_missing => Ok(Config::default()),
        Some(path) => anyhow::bail!(
            "Config file not found: {} (create it with: playparty init --config {})",
            path.display(),
            path.display()
        ),
        None => Config::load(),
    }
}

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if matches!(cli.command, Some(Commands::Init)) {
        let path = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from("config.toml"));
        return cli::cmd_init(&path);
    }

    config.validate()?;
    debug!(
        "API: {}, credential backend: {:?}",
        config.api.base_url, config.storage.backend
    );

    let mut app = App::from_config(&config)?;
    let phase = app.start().await;
    info!("Startup complete: {}", phase);

    cli::dispatch(&mut app, cli.command).await
}
