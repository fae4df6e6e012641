use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::store::{load_portfolios, load_prices};
use cryptofolio_core::{
    cache::{CacheStore, MemoryCacheStore},
    market_data::PriceIndex,
    portfolio::analytics::{PortfolioAnalyticsService, PortfolioAnalyticsServiceTrait},
    simulation::DcaSimulator,
    trades::TradeRepositoryTrait,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub analytics_service: Arc<dyn PortfolioAnalyticsServiceTrait>,
    pub dca_simulator: Arc<DcaSimulator>,
    pub cache: Arc<dyn CacheStore>,
    pub summary_cache_ttl: Duration,
    pub snapshot_cache_ttl: Duration,
}

pub fn init_tracing() {
    let fmt_layer = fmt::layer().json().with_current_span(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    tracing::info!("Data directory in use: {}", config.data_dir.display());
    let data_dir = config.data_dir.clone();
    let (trade_repository, price_index) = tokio::task::spawn_blocking(move || {
        anyhow::Ok((load_portfolios(&data_dir)?, load_prices(&data_dir)?))
    })
    .await??;
    tracing::info!(
        "Seeded {} portfolios and {} price rows",
        trade_repository.len(),
        price_index.len()
    );

    let trade_repository: Arc<dyn TradeRepositoryTrait> = Arc::new(trade_repository);
    let price_index: Arc<dyn PriceIndex> = Arc::new(price_index);
    let analytics_config = config.analytics_config();

    let analytics_service: Arc<dyn PortfolioAnalyticsServiceTrait> =
        Arc::new(PortfolioAnalyticsService::new(
            trade_repository,
            price_index.clone(),
            analytics_config.clone(),
        ));
    let dca_simulator = Arc::new(DcaSimulator::new(price_index, analytics_config));

    Ok(Arc::new(AppState {
        analytics_service,
        dca_simulator,
        cache: Arc::new(MemoryCacheStore::new()),
        summary_cache_ttl: config.summary_cache_ttl,
        snapshot_cache_ttl: config.snapshot_cache_ttl,
    }))
}
