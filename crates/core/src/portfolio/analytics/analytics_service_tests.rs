use crate::config::AnalyticsConfig;
use crate::errors::{CalculationWarning, Error, Result};
use crate::market_data::{InMemoryPriceIndex, PricePoint};
use crate::portfolio::allocation::{PositionSort, PositionSortField, SortDirection};
use crate::portfolio::analytics::{
    EquityCurveRequest, PortfolioAnalyticsService, PortfolioAnalyticsServiceTrait,
};
use crate::trades::{Portfolio, Trade, TradeRepositoryTrait, TradeSide};
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;

struct FixedTradeRepository {
    trades: HashMap<String, Vec<Trade>>,
}

impl TradeRepositoryTrait for FixedTradeRepository {
    fn list_portfolios(&self) -> Result<Vec<Portfolio>> {
        Ok(self
            .trades
            .keys()
            .map(|id| Portfolio {
                id: id.clone(),
                name: id.clone(),
            })
            .collect())
    }

    fn get_portfolio(&self, portfolio_id: &str) -> Result<Portfolio> {
        if self.trades.contains_key(portfolio_id) {
            Ok(Portfolio {
                id: portfolio_id.to_string(),
                name: portfolio_id.to_string(),
            })
        } else {
            Err(Error::NotFound(format!("Portfolio {}", portfolio_id)))
        }
    }

    fn get_trades(&self, portfolio_id: &str) -> Result<Vec<Trade>> {
        Ok(self.trades.get(portfolio_id).cloned().unwrap_or_default())
    }
}

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

fn trade(day: u32, side: TradeSide, symbol: &str, quantity: Decimal, price: Decimal) -> Trade {
    Trade {
        id: format!("{}-{}-{}", symbol, day, side),
        timestamp: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(),
        symbol: symbol.to_string(),
        side,
        quantity,
        price,
        fee: Decimal::ZERO,
        exchange: "Coinbase".to_string(),
    }
}

fn service() -> PortfolioAnalyticsService {
    let mut trades = HashMap::new();
    trades.insert(
        "main".to_string(),
        vec![
            trade(1, TradeSide::Buy, "BTC", dec!(1), dec!(40000)),
            trade(2, TradeSide::Buy, "ETH", dec!(10), dec!(2000)),
            trade(3, TradeSide::Sell, "SOL", dec!(1), dec!(100)),
        ],
    );
    trades.insert("empty".to_string(), Vec::new());

    let mut points = Vec::new();
    for (day, btc, eth) in [
        (1, dec!(40000), dec!(2000)),
        (2, dec!(42000), dec!(2100)),
        (3, dec!(38000), dec!(1900)),
        (4, dec!(44000), dec!(2200)),
    ] {
        points.push(PricePoint::new("BTC", d(day), btc));
        points.push(PricePoint::new("ETH", d(day), eth));
    }

    PortfolioAnalyticsService::new(
        Arc::new(FixedTradeRepository { trades }),
        Arc::new(InMemoryPriceIndex::from_points(points)),
        AnalyticsConfig::default(),
    )
}

#[test]
fn test_allocation_carries_ledger_warnings() {
    let allocation = service().get_allocation("main", d(4)).unwrap();
    assert_eq!(allocation.total_value, dec!(66000));
    assert_eq!(allocation.entries[0].symbol, "BTC");
    assert!(allocation
        .warnings
        .iter()
        .any(|w| matches!(w, CalculationWarning::DataIntegrity { .. })));
}

#[test]
fn test_unknown_portfolio_is_not_found() {
    let err = service().get_allocation("nope", d(4)).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_positions_sorted_by_symbol() {
    let view = service()
        .get_positions(
            "main",
            d(4),
            PositionSort {
                field: PositionSortField::Symbol,
                direction: SortDirection::Asc,
            },
        )
        .unwrap();
    let symbols: Vec<&str> = view.rows.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["BTC", "ETH"]);
    assert_eq!(view.total_value, dec!(66000));
}

#[test]
fn test_equity_curve_with_and_without_stats() {
    let svc = service();
    let plain = svc
        .get_equity_curve(
            "main",
            EquityCurveRequest {
                start_date: Some(d(1)),
                end_date: Some(d(4)),
                include_stats: false,
            },
            d(4),
        )
        .unwrap();
    assert!(plain.metrics.is_none());
    assert_eq!(
        plain.curve.values(),
        vec![dec!(40000), dec!(63000), dec!(57000), dec!(66000)]
    );

    let with_stats = svc
        .get_equity_curve(
            "main",
            EquityCurveRequest {
                start_date: Some(d(1)),
                end_date: Some(d(4)),
                include_stats: true,
            },
            d(4),
        )
        .unwrap();
    let metrics = with_stats.metrics.unwrap();
    assert_eq!(with_stats.curve, plain.curve);
    assert_eq!(metrics.benchmarks.len(), 2);
    assert!(metrics.max_drawdown_percent < Decimal::ZERO);
    assert_eq!(metrics.max_drawdown_from_date, Some(d(2)));
    assert_eq!(metrics.max_drawdown_to_date, Some(d(3)));
}

#[test]
fn test_summary_combines_state_metrics_and_allocation() {
    let summary = service().get_summary("main", d(4)).unwrap();
    assert_eq!(summary.current_state.total_value, dec!(66000));
    assert_eq!(summary.current_state.cost_basis, dec!(60000));
    assert_eq!(summary.current_state.pnl.value, dec!(6000));
    assert_eq!(summary.current_state.pnl.percent, dec!(10));
    assert_eq!(summary.allocation.entries.len(), 2);
    assert_eq!(summary.last_updated, d(4));
    assert_eq!(summary.key_metrics.total_return_percent, dec!(65));
}

#[test]
fn test_summary_of_empty_portfolio() {
    let summary = service().get_summary("empty", d(4)).unwrap();
    assert_eq!(summary.current_state.total_value, Decimal::ZERO);
    assert_eq!(summary.key_metrics.cagr_percent, Decimal::ZERO);
    assert!(summary.allocation.entries.is_empty());
}
