use tracing_subscriber::EnvFilter;

use agent_orchestrator::{api, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting agent orchestrator on {}", config.bind_addr());

    api::serve(config).await
}
