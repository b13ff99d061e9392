use clap::Parser;
use eyre::Result;
use relay::{config::RelayConfig, webhook::start_webhook_server};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // .env is optional
    let _ = dotenv::dotenv();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let config = RelayConfig::parse();

    // Validate configuration
    config.validate()?;

    info!(
        listen_addr = %config.listen_addr,
        latitude_key = %config.payload_keys.latitude,
        longitude_key = %config.payload_keys.longitude,
        battery_key = %config.payload_keys.battery,
        "Loaded and validated relay configuration"
    );

    start_webhook_server(config).await?;

    info!("Relay shutdown complete");
    Ok(())
}
