use std::io;

use clap::Parser;
use scripts::{
    artifacts::HardhatArtifacts,
    cli::Cli,
    constants::DEFAULT_LOG_FILTER,
    errors::ScriptError,
    orchestrator::deploy_marketplace,
    upgrades::Upgrades,
    utils::setup_client,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let Cli { config, command } = Cli::parse();

    // Logs go to stderr, stdout only carries the scripts' results
    tracing_subscriber::fmt()
        .pretty()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let artifacts = HardhatArtifacts::new(&config.artifacts);
    let client = setup_client(&config).await?;
    let upgrades = Upgrades::from_artifacts(client, &artifacts, &config.deployments_path)?;

    match command {
        None => deploy_marketplace(&artifacts, &upgrades, &mut io::stdout().lock()).await,
        Some(command) => command.run(&artifacts, &upgrades).await,
    }
}
