//! Entry point for the page-change monitor.

use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use vigil::config::MonitorConfig;
use vigil::monitor::Monitor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("vigil=info".parse()?))
        .init();

    let Some(config) = MonitorConfig::from_env() else {
        anyhow::bail!("MONITOR_URL is required");
    };

    info!(url = %config.url, "Starting page monitor");

    let monitor = Monitor::new(config)?;
    monitor.run().await;

    Ok(())
}
