use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::CalculationWarning;
use crate::portfolio::allocation::{Allocation, Pnl, PositionRow};
use crate::portfolio::equity_curve::EquityCurve;
use crate::portfolio::performance::RiskMetrics;

/// Sorted positions view of a portfolio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionsView {
    pub as_of: NaiveDate,
    pub rows: Vec<PositionRow>,
    pub total_value: Decimal,
    #[serde(default)]
    pub warnings: Vec<CalculationWarning>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityCurveRequest {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub include_stats: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EquityCurveReport {
    pub curve: EquityCurve,
    /// Present only when stats were requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<RiskMetrics>,
}

/// Headline numbers of the current portfolio.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentState {
    pub total_value: Decimal,
    pub cost_basis: Decimal,
    pub pnl: Pnl,
}

/// Everything the dashboard needs in one payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub portfolio_id: String,
    pub current_state: CurrentState,
    pub key_metrics: RiskMetrics,
    pub allocation: Allocation,
    pub last_updated: NaiveDate,
    #[serde(default)]
    pub warnings: Vec<CalculationWarning>,
}
