use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::{EquityCurveRequest, EquityCurveReport, PortfolioSummary, PositionsView};
use crate::errors::Result;
use crate::portfolio::allocation::{Allocation, PositionSort};
use crate::portfolio::equity_curve::EquityCurve;
use crate::portfolio::performance::RiskMetrics;
use crate::trades::Portfolio;

/// Read-only analytics over one portfolio.
///
/// Every method is a pure function of the ledger, the price history and the
/// dates passed in. `today` is always explicit.
pub trait PortfolioAnalyticsServiceTrait: Send + Sync {
    fn list_portfolios(&self) -> Result<Vec<Portfolio>>;

    fn get_allocation(&self, portfolio_id: &str, as_of: NaiveDate) -> Result<Allocation>;

    fn get_positions(
        &self,
        portfolio_id: &str,
        as_of: NaiveDate,
        sort: PositionSort,
    ) -> Result<PositionsView>;

    /// Resolves optional curve bounds against the portfolio's first trade.
    fn resolve_range(
        &self,
        portfolio_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<(NaiveDate, NaiveDate)>;

    /// Portfolio value curve only. Range defaults follow `build_curve`.
    fn get_portfolio_curve(
        &self,
        portfolio_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<EquityCurve>;

    /// Price curve of a configured benchmark asset.
    fn get_benchmark_curve(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<EquityCurve>;

    fn benchmark_symbols(&self) -> Vec<String>;

    /// Metrics for an already-built curve against already-built benchmarks.
    fn metrics_for(
        &self,
        curve: &EquityCurve,
        benchmarks: &BTreeMap<String, EquityCurve>,
    ) -> RiskMetrics;

    fn get_equity_curve(
        &self,
        portfolio_id: &str,
        request: EquityCurveRequest,
        today: NaiveDate,
    ) -> Result<EquityCurveReport>;

    fn get_summary(&self, portfolio_id: &str, today: NaiveDate) -> Result<PortfolioSummary>;
}
