//! Engine configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BENCHMARKS, DEFAULT_SUPPORTED_ASSETS, MAX_RANGE_DAYS};
use crate::market_data::PricePolicy;

/// Tunables shared by every analytics operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsConfig {
    /// Largest request range in days. `None` disables the bound.
    pub max_range_days: Option<i64>,
    /// How many days old a "last known price" may be before it counts as missing.
    /// `None` accepts any prior price.
    pub price_staleness_days: Option<i64>,
    /// Risk-free rate per period (per day), subtracted from mean return in Sharpe.
    pub risk_free_rate: Decimal,
    /// Scale volatility and Sharpe by sqrt(365).
    pub annualize_volatility: bool,
    /// Assets accepted by the DCA simulator (uppercase codes).
    pub supported_assets: Vec<String>,
    /// Assets whose price curves are reported next to portfolio metrics.
    pub benchmarks: Vec<String>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            max_range_days: Some(MAX_RANGE_DAYS),
            price_staleness_days: None,
            risk_free_rate: Decimal::ZERO,
            annualize_volatility: false,
            supported_assets: DEFAULT_SUPPORTED_ASSETS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            benchmarks: DEFAULT_BENCHMARKS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AnalyticsConfig {
    pub fn price_policy(&self) -> PricePolicy {
        PricePolicy {
            max_staleness_days: self.price_staleness_days,
        }
    }

    pub fn is_supported_asset(&self, symbol: &str) -> bool {
        self.supported_assets
            .iter()
            .any(|s| s.eq_ignore_ascii_case(symbol))
    }
}
