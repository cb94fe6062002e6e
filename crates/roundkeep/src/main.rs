use roundkeep::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    // RUST_LOG wins; otherwise DEBUG=1 picks the default level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(
        addr = %config.bind_addr(),
        id_length = config.id_length,
        debug = config.debug,
        "starting roundkeep"
    );

    let server = RoundkeepServerBuilder::from_config(&config).build().await?;
    server.run().await?;
    Ok(())
}
