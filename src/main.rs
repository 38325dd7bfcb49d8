use paragliding_api::config;
use paragliding_api::lifecycle::{startup, Shutdown};
use paragliding_api::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::from_env()?;
    logging::init(&config.observability)?;

    tracing::info!("paragliding-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        root_path = %config.api.root_path,
        ticker_limit = config.api.ticker_limit,
        request_timeout_secs = config.timeouts.request_secs,
        webhooks_enabled = config.webhooks.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    startup::run(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
