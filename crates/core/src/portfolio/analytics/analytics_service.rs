use chrono::{Duration, NaiveDate};
use log::debug;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{
    CurrentState, EquityCurveReport, EquityCurveRequest, PortfolioAnalyticsServiceTrait,
    PortfolioSummary, PositionsView,
};
use crate::config::AnalyticsConfig;
use crate::errors::Result;
use crate::market_data::PriceIndex;
use crate::portfolio::allocation::{allocate, position_rows, Allocation, PositionSort};
use crate::portfolio::equity_curve::{
    build_benchmark_curve, build_curve, resolve_curve_range, EquityCurve,
};
use crate::portfolio::performance::{compute_metrics, MetricsOptions, RiskMetrics};
use crate::portfolio::positions::build_positions;
use crate::trades::{Portfolio, TradeRepositoryTrait};
use crate::utils::time_utils::validate_date_range;

pub struct PortfolioAnalyticsService {
    trade_repository: Arc<dyn TradeRepositoryTrait>,
    price_index: Arc<dyn PriceIndex>,
    config: AnalyticsConfig,
}

impl PortfolioAnalyticsService {
    pub fn new(
        trade_repository: Arc<dyn TradeRepositoryTrait>,
        price_index: Arc<dyn PriceIndex>,
        config: AnalyticsConfig,
    ) -> Self {
        Self {
            trade_repository,
            price_index,
            config,
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    fn benchmark_curves(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<String, EquityCurve>> {
        self.config
            .benchmarks
            .iter()
            .map(|symbol| {
                self.get_benchmark_curve(symbol, start, end)
                    .map(|curve| (symbol.clone(), curve))
            })
            .collect()
    }
}

impl PortfolioAnalyticsServiceTrait for PortfolioAnalyticsService {
    fn list_portfolios(&self) -> Result<Vec<Portfolio>> {
        self.trade_repository.list_portfolios()
    }

    fn get_allocation(&self, portfolio_id: &str, as_of: NaiveDate) -> Result<Allocation> {
        self.trade_repository.get_portfolio(portfolio_id)?;
        let trades = self.trade_repository.get_trades(portfolio_id)?;
        let positions = build_positions(&trades, as_of);
        let mut allocation = allocate(
            &positions.positions,
            self.price_index.as_ref(),
            as_of,
            &self.config.price_policy(),
        );
        let mut warnings = positions.warnings;
        warnings.append(&mut allocation.warnings);
        allocation.warnings = warnings;
        Ok(allocation)
    }

    fn get_positions(
        &self,
        portfolio_id: &str,
        as_of: NaiveDate,
        sort: PositionSort,
    ) -> Result<PositionsView> {
        self.trade_repository.get_portfolio(portfolio_id)?;
        let trades = self.trade_repository.get_trades(portfolio_id)?;
        let positions = build_positions(&trades, as_of);
        let allocation = allocate(
            &positions.positions,
            self.price_index.as_ref(),
            as_of,
            &self.config.price_policy(),
        );
        let rows = position_rows(&positions.positions, &allocation, sort);

        let mut warnings = positions.warnings;
        warnings.extend(allocation.warnings);
        Ok(PositionsView {
            as_of,
            rows,
            total_value: allocation.total_value,
            warnings,
        })
    }

    fn resolve_range(
        &self,
        portfolio_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<(NaiveDate, NaiveDate)> {
        self.trade_repository.get_portfolio(portfolio_id)?;
        let trades = self.trade_repository.get_trades(portfolio_id)?;
        let (start, end) = resolve_curve_range(&trades, start_date, end_date, today);
        validate_date_range(start, end, self.config.max_range_days)?;
        Ok((start, end))
    }

    fn get_portfolio_curve(
        &self,
        portfolio_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<EquityCurve> {
        self.trade_repository.get_portfolio(portfolio_id)?;
        let trades = self.trade_repository.get_trades(portfolio_id)?;
        build_curve(
            &trades,
            self.price_index.as_ref(),
            start_date,
            end_date,
            today,
            &self.config,
        )
    }

    fn get_benchmark_curve(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<EquityCurve> {
        build_benchmark_curve(
            self.price_index.as_ref(),
            symbol,
            start_date,
            end_date,
            &self.config,
        )
    }

    fn benchmark_symbols(&self) -> Vec<String> {
        self.config.benchmarks.clone()
    }

    fn metrics_for(
        &self,
        curve: &EquityCurve,
        benchmarks: &BTreeMap<String, EquityCurve>,
    ) -> RiskMetrics {
        let benchmark_points: BTreeMap<String, Vec<_>> = benchmarks
            .iter()
            .map(|(name, c)| (name.clone(), c.points.clone()))
            .collect();
        compute_metrics(
            &curve.points,
            &benchmark_points,
            &MetricsOptions::from_config(&self.config),
        )
    }

    fn get_equity_curve(
        &self,
        portfolio_id: &str,
        request: EquityCurveRequest,
        today: NaiveDate,
    ) -> Result<EquityCurveReport> {
        let curve =
            self.get_portfolio_curve(portfolio_id, request.start_date, request.end_date, today)?;
        let metrics = if request.include_stats {
            let benchmarks = self.benchmark_curves(curve.start_date, curve.end_date)?;
            Some(self.metrics_for(&curve, &benchmarks))
        } else {
            None
        };
        Ok(EquityCurveReport { curve, metrics })
    }

    fn get_summary(&self, portfolio_id: &str, today: NaiveDate) -> Result<PortfolioSummary> {
        self.trade_repository.get_portfolio(portfolio_id)?;
        let trades = self.trade_repository.get_trades(portfolio_id)?;

        let positions = build_positions(&trades, today);
        let allocation = allocate(
            &positions.positions,
            self.price_index.as_ref(),
            today,
            &self.config.price_policy(),
        );

        // Full history, clipped to the longest range the config allows.
        let (mut start, end) = resolve_curve_range(&trades, None, Some(today), today);
        if let Some(max) = self.config.max_range_days {
            start = start.max(end - Duration::days(max));
        }
        let curve = build_curve(
            &trades,
            self.price_index.as_ref(),
            Some(start),
            Some(end),
            today,
            &self.config,
        )?;
        let benchmarks = self.benchmark_curves(start, end)?;
        let key_metrics = self.metrics_for(&curve, &benchmarks);

        debug!(
            "Summary for portfolio {}: {} holdings, value {}",
            portfolio_id,
            allocation.entries.len(),
            allocation.total_value
        );

        let mut warnings = positions.warnings;
        warnings.extend(allocation.warnings.iter().cloned());

        Ok(PortfolioSummary {
            portfolio_id: portfolio_id.to_string(),
            current_state: CurrentState {
                total_value: allocation.total_value,
                cost_basis: allocation.total_cost_basis,
                pnl: allocation.pnl(),
            },
            key_metrics,
            allocation,
            last_updated: today,
            warnings,
        })
    }
}
