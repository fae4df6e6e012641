use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;

/// Risk and return statistics derived from an equity curve.
///
/// Every field is a pure function of the curve it was computed from; percent
/// fields are in percent units (`-25` means a 25% decline).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetrics {
    /// Sample standard deviation of daily returns, in percent.
    pub volatility_percent: Decimal,
    /// Most negative peak-to-trough decline, in percent. Zero or negative.
    pub max_drawdown_percent: Decimal,
    pub max_drawdown_from_date: Option<NaiveDate>,
    pub max_drawdown_to_date: Option<NaiveDate>,
    pub cagr_percent: Decimal,
    pub sharpe_ratio: Decimal,
    pub ytd_return_percent: Decimal,
    pub total_return_percent: Decimal,
    #[serde(default)]
    pub benchmarks: Vec<BenchmarkComparison>,
}

/// Portfolio returns set against one benchmark asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkComparison {
    pub name: String,
    pub ytd_return_percent: Decimal,
    pub total_return_percent: Decimal,
    /// Portfolio YTD return minus the benchmark's.
    pub excess_ytd_percent: Decimal,
}

/// Peak-to-trough decline of a curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Drawdown {
    pub percent: Decimal,
    pub peak_date: Option<NaiveDate>,
    pub trough_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsOptions {
    /// Scale volatility and Sharpe by sqrt(365).
    pub annualize: bool,
    /// Per-period rate subtracted from the mean return in Sharpe.
    pub risk_free_rate: Decimal,
    /// Calendar year for YTD. Defaults to the year of the curve's last point.
    pub ytd_year: Option<i32>,
}

impl MetricsOptions {
    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self {
            annualize: config.annualize_volatility,
            risk_free_rate: config.risk_free_rate,
            ytd_year: None,
        }
    }
}
