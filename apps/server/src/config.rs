use anyhow::Context;
use std::{net::SocketAddr, path::PathBuf, time::Duration};

use cryptofolio_core::constants::{SNAPSHOT_CACHE_TTL_SECS, SUMMARY_CACHE_TTL_SECS};
use cryptofolio_core::AnalyticsConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    /// Holds `portfolios.json` and `prices.csv`.
    pub data_dir: PathBuf,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub summary_cache_ttl: Duration,
    pub snapshot_cache_ttl: Duration,
    pub price_staleness_days: Option<i64>,
    pub annualize_volatility: bool,
    /// Lifts the date-range bound on curves and simulations.
    pub allow_long_ranges: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            data_dir: PathBuf::from("./data"),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(30000),
            summary_cache_ttl: Duration::from_secs(SUMMARY_CACHE_TTL_SECS),
            snapshot_cache_ttl: Duration::from_secs(SNAPSHOT_CACHE_TTL_SECS),
            price_staleness_days: None,
            annualize_volatility: false,
            allow_long_ranges: false,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr: SocketAddr = std::env::var("CF_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid CF_LISTEN_ADDR")?;
        let data_dir = std::env::var("CF_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let cors_allow = std::env::var("CF_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("CF_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .unwrap_or(30000);
        let summary_ttl = env_u64("CF_SUMMARY_CACHE_TTL_SECS", SUMMARY_CACHE_TTL_SECS);
        let snapshot_ttl = env_u64("CF_SNAPSHOT_CACHE_TTL_SECS", SNAPSHOT_CACHE_TTL_SECS);
        let price_staleness_days = std::env::var("CF_PRICE_STALENESS_DAYS")
            .ok()
            .and_then(|v| v.trim().parse::<i64>().ok());

        Ok(Self {
            listen_addr,
            data_dir,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            summary_cache_ttl: Duration::from_secs(summary_ttl),
            snapshot_cache_ttl: Duration::from_secs(snapshot_ttl),
            price_staleness_days,
            annualize_volatility: env_flag("CF_ANNUALIZE_VOLATILITY"),
            allow_long_ranges: env_flag("CF_ALLOW_LONG_RANGES"),
        })
    }

    pub fn analytics_config(&self) -> AnalyticsConfig {
        let defaults = AnalyticsConfig::default();
        AnalyticsConfig {
            max_range_days: if self.allow_long_ranges {
                None
            } else {
                defaults.max_range_days
            },
            price_staleness_days: self.price_staleness_days,
            annualize_volatility: self.annualize_volatility,
            ..defaults
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
