use application::resources::Resources;
use clap::Parser;
use infrastructure::config::Config;
use presentation::cli::{Cli, CliApp};
use shared::telemetry::init_tracing;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    init_tracing(&config.log_filter);
    tracing::debug!(?config, "configuration loaded");

    let resources = Arc::new(Resources::init(&config).await?);
    let app = CliApp::new(resources.clone());
    let result = app.run(cli.command).await;
    drop(app);

    match Arc::try_unwrap(resources) {
        Ok(resources) => resources.teardown(),
        Err(_) => tracing::warn!("lookup resources still shared at shutdown"),
    }
    result
}
