use anyhow::Context;
use livedash::config::AppConfig;
use livedash::observability::{metrics, tracing::init_tracing};
use livedash::stream::CoinCapFeed;
use livedash::Dashboard;
use std::time::Duration;

const STATUS_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("LIVEDASH_ENV").unwrap_or_else(|_| livedash::DEFAULT_ENV.to_string());
    let config = AppConfig::load(&env).context("loading configuration")?;

    init_tracing(&config.logging)?;
    metrics::register_metrics()?;
    tracing::info!("Starting livedash ({})", env);
    tracing::debug!("Effective configuration:\n{}", config.to_toml()?);

    let feed = CoinCapFeed::new(&config.stream.url, &config.watch_list.assets);
    let mut dashboard = Dashboard::from_config(config).context("building dashboard")?;
    dashboard.start(feed);

    let mut status = tokio::time::interval(STATUS_INTERVAL);
    status.tick().await;

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("waiting for ctrl-c")?;
                tracing::info!("Shutdown requested");
                break;
            }
            _ = status.tick() => {
                if let Err(e) = dashboard.check_health() {
                    tracing::warn!("{}", e);
                }
                tracing::info!(
                    unread = dashboard.notifications().unread_count(),
                    live_prices = dashboard.store().live_prices().len(),
                    "Dashboard status"
                );
                tracing::debug!("{}", metrics::render()?);
            }
        }
    }

    dashboard.teardown().await;
    Ok(())
}
