use clap::Parser;
use playparty::cli::Commands;
use playparty::{Cli, load_config, run};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let allow_missing = matches!(cli.command, Some(Commands::Init));
    let config = load_config(cli.config.as_deref(), allow_missing)?;
    let worker_threads = config.general.worker_threads;

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();

    if worker_threads > 0 {
        builder.worker_threads(worker_threads);
    }

    let runtime = builder.build()?;
    runtime.block_on(run(cli, config))
}
