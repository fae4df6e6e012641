//! Property-based integration tests for the analytics engine.
//!
//! These tests check invariants that must hold for every well-formed ledger,
//! price history and series, using `proptest` to generate inputs.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use cryptofolio_core::charts::downsample;
use cryptofolio_core::market_data::{InMemoryPriceIndex, PricePoint, PricePolicy};
use cryptofolio_core::portfolio::allocation::allocate;
use cryptofolio_core::portfolio::equity_curve::{build_curve, EquityCurvePoint};
use cryptofolio_core::portfolio::performance::{compute_metrics, MetricsOptions};
use cryptofolio_core::portfolio::positions::build_positions;
use cryptofolio_core::simulation::{simulate_dca, DcaRequest};
use cryptofolio_core::trades::{Trade, TradeSide};
use cryptofolio_core::AnalyticsConfig;

// =============================================================================
// Generators
// =============================================================================

const SYMBOLS: &[&str] = &["BTC", "ETH", "SOL", "ADA"];

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
}

/// Positive decimal with four fractional digits.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000).prop_map(|n| Decimal::new(n, 4))
}

fn arb_side() -> impl Strategy<Value = TradeSide> {
    prop_oneof![3 => Just(TradeSide::Buy), 1 => Just(TradeSide::Sell)]
}

fn arb_trade() -> impl Strategy<Value = Trade> {
    (
        0usize..SYMBOLS.len(),
        0i64..60,   // day offset
        arb_side(),
        arb_amount(), // quantity
        arb_amount(), // price
    )
        .prop_map(|(symbol, day, side, quantity, price)| Trade {
            id: format!("{}-{}-{}", SYMBOLS[symbol], day, quantity),
            timestamp: Utc.from_utc_datetime(
                &(base_date() + Duration::days(day))
                    .and_hms_opt(12, 0, 0)
                    .unwrap(),
            ),
            symbol: SYMBOLS[symbol].to_string(),
            side,
            quantity,
            price,
            fee: Decimal::ZERO,
            exchange: "test".to_string(),
        })
}

/// A price for every symbol on every one of the first 60 days.
fn arb_prices() -> impl Strategy<Value = InMemoryPriceIndex> {
    prop::collection::vec(arb_amount(), 60 * SYMBOLS.len()).prop_map(|closes| {
        let points = closes.into_iter().enumerate().map(|(i, close)| {
            PricePoint::new(
                SYMBOLS[i % SYMBOLS.len()],
                base_date() + Duration::days((i / SYMBOLS.len()) as i64),
                close,
            )
        });
        InMemoryPriceIndex::from_points(points)
    })
}

fn arb_curve(max_len: usize) -> impl Strategy<Value = Vec<EquityCurvePoint>> {
    prop::collection::vec(0i64..5_000_000, 0..max_len).prop_map(|values| {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                EquityCurvePoint::new(base_date() + Duration::days(i as i64), Decimal::new(v, 2))
            })
            .collect()
    })
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Holdings never go negative whatever order buys and sells arrive in.
    #[test]
    fn prop_positions_never_negative(
        trades in prop::collection::vec(arb_trade(), 0..40)
    ) {
        let result = build_positions(&trades, base_date() + Duration::days(60));
        for position in result.positions.values() {
            prop_assert!(position.quantity > Decimal::ZERO);
            prop_assert!(position.average_cost >= Decimal::ZERO);
        }
    }

    /// Allocation percentages add up to 100 whenever anything is valued.
    #[test]
    fn prop_allocation_percentages_sum_to_hundred(
        trades in prop::collection::vec(arb_trade(), 1..30),
        prices in arb_prices(),
    ) {
        let as_of = base_date() + Duration::days(59);
        let positions = build_positions(&trades, as_of);
        let allocation = allocate(&positions.positions, &prices, as_of, &PricePolicy::default());

        if allocation.total_value > Decimal::ZERO {
            let sum: Decimal = allocation.entries.iter().map(|e| e.percent_of_portfolio).sum();
            prop_assert!((sum - Decimal::ONE_HUNDRED).abs() <= Decimal::new(1, 2), "sum was {}", sum);
        }
        prop_assert!(allocation
            .entries
            .windows(2)
            .all(|w| w[0].position_value >= w[1].position_value));
    }

    /// One point per calendar day, no gaps.
    #[test]
    fn prop_curve_has_one_point_per_day(
        trades in prop::collection::vec(arb_trade(), 0..20),
        prices in arb_prices(),
        start_offset in 0i64..30,
        span in 0i64..90,
    ) {
        let start = base_date() + Duration::days(start_offset);
        let end = start + Duration::days(span);
        let curve = build_curve(&trades, &prices, Some(start), Some(end), end, &AnalyticsConfig::default())
            .unwrap();

        prop_assert_eq!(curve.len() as i64, span + 1);
        prop_assert!(curve.points.windows(2).all(|w| w[1].date - w[0].date == Duration::days(1)));
    }

    /// Same curve in, same metrics out.
    #[test]
    fn prop_metrics_are_idempotent(curve in arb_curve(120)) {
        let options = MetricsOptions::default();
        let first = compute_metrics(&curve, &BTreeMap::new(), &options);
        let second = compute_metrics(&curve, &BTreeMap::new(), &options);
        prop_assert_eq!(&first, &second);
        prop_assert!(first.max_drawdown_percent <= Decimal::ZERO);
        prop_assert!(first.volatility_percent >= Decimal::ZERO);
    }

    /// Endpoints survive and the bound holds.
    #[test]
    fn prop_downsample_keeps_endpoints(curve in arb_curve(300), target in 2usize..80) {
        let sampled = downsample(&curve, target);
        prop_assert!(sampled.len() <= target);
        prop_assert_eq!(sampled.first(), curve.first());
        prop_assert_eq!(sampled.last(), curve.last());
    }

    /// Invested total is amount times the number of purchase dates.
    #[test]
    fn prop_dca_invested_matches_schedule(
        amount in arb_amount(),
        interval in 1i64..45,
        start_offset in 0i64..30,
        span in 0i64..29,
        prices in arb_prices(),
    ) {
        let start = base_date() + Duration::days(start_offset);
        let end = start + Duration::days(span);
        let request = DcaRequest {
            start_date: start,
            end_date: end,
            amount,
            interval,
            asset: "ETH".to_string(),
            pair: None,
        };
        let result = simulate_dca(&request, &prices, end, &AnalyticsConfig::default()).unwrap();

        let expected_count = (span / interval + 1) as usize;
        prop_assert_eq!(result.purchase_count, expected_count);
        prop_assert_eq!(result.total_invested, amount * Decimal::from(expected_count));
        prop_assert_eq!(result.daily_data.len() as i64, span + 1);
    }
}
