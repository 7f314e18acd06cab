use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use api::AppState;
use common::Config;
use market_data::YahooClient;
use strategy::ScanFileConfig;

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    let scan_config = ScanFileConfig::load_or_default(&cfg.scan_config_path);
    info!(
        port = cfg.dashboard_port,
        volume_ratio = scan_config.defaults.volume_ratio_threshold,
        price_change_pct = scan_config.defaults.price_change_threshold_pct,
        holding_days = scan_config.defaults.holding_period_days,
        "Breakout scanner starting"
    );

    // ── Market data ───────────────────────────────────────────────────────────
    let client = YahooClient::new(
        &cfg.yahoo_base_url,
        Duration::from_secs(cfg.http_timeout_secs),
    )
    .unwrap_or_else(|e| panic!("Failed to build market data client: {e}"));
    info!(base_url = %cfg.yahoo_base_url, cache_ttl_secs = cfg.bar_cache_ttl_secs, "Market data client ready");

    // ── Dashboard API ─────────────────────────────────────────────────────────
    let state = AppState::new(
        Arc::new(client),
        scan_config,
        Duration::from_secs(cfg.bar_cache_ttl_secs),
    );

    if let Err(e) = api::serve(state, cfg.dashboard_port).await {
        error!(error = %e, "Dashboard API stopped");
        std::process::exit(1);
    }
    info!("Shutdown complete");
}
