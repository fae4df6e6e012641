use crate::errors::CalculationWarning;
use crate::market_data::{InMemoryPriceIndex, PricePoint, PricePolicy};
use crate::portfolio::allocation::{
    allocate, percent_of, position_rows, Pnl, PositionSort, PositionSortField,
    SortDirection,
};
use crate::portfolio::positions::build_positions;
use crate::trades::{Trade, TradeSide};
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

fn buy(id: &str, day: u32, symbol: &str, quantity: Decimal, price: Decimal) -> Trade {
    Trade {
        id: id.to_string(),
        timestamp: Utc.with_ymd_and_hms(2024, 1, day, 8, 0, 0).unwrap(),
        symbol: symbol.to_string(),
        side: TradeSide::Buy,
        quantity,
        price,
        fee: Decimal::ZERO,
        exchange: "Binance".to_string(),
    }
}

fn prices() -> InMemoryPriceIndex {
    InMemoryPriceIndex::from_points(vec![
        PricePoint::new("BTC", d(1), dec!(40000)),
        PricePoint::new("BTC", d(2), dec!(44000)),
        PricePoint::new("ETH", d(1), dec!(2000)),
        PricePoint::new("SOL", d(1), dec!(100)),
    ])
}

#[test]
fn test_single_btc_position_gains_ten_percent() {
    let trades = vec![buy("1", 1, "BTC", dec!(1), dec!(40000))];
    let positions = build_positions(&trades, d(2));
    let allocation = allocate(&positions.positions, &prices(), d(2), &PricePolicy::default());

    assert_eq!(allocation.entries.len(), 1);
    let btc = &allocation.entries[0];
    assert_eq!(btc.percent_of_portfolio, dec!(100));
    assert_eq!(btc.position_value, dec!(44000));
    assert_eq!(btc.pnl.value, dec!(4000));
    assert_eq!(btc.pnl.percent, dec!(10.0));
    assert_eq!(allocation.total_value, dec!(44000));
}

#[test]
fn test_entries_sorted_largest_first_and_sum_to_hundred() {
    let trades = vec![
        buy("1", 1, "SOL", dec!(10), dec!(90)),
        buy("2", 1, "BTC", dec!(0.1), dec!(39000)),
        buy("3", 1, "ETH", dec!(1), dec!(1900)),
    ];
    let positions = build_positions(&trades, d(3));
    let allocation = allocate(&positions.positions, &prices(), d(3), &PricePolicy::default());

    let symbols: Vec<&str> = allocation.entries.iter().map(|e| e.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["BTC", "ETH", "SOL"]);
    let sum: Decimal = allocation
        .entries
        .iter()
        .map(|e| e.percent_of_portfolio)
        .sum();
    assert!((sum - dec!(100)).abs() <= dec!(0.01));
    // BTC priced from the 2nd (last known), SOL/ETH from the 1st.
    assert_eq!(allocation.entries[0].price_date, d(2));
    assert_eq!(allocation.entries[2].price_date, d(1));
}

#[test]
fn test_missing_price_is_excluded_and_flagged() {
    let trades = vec![
        buy("1", 1, "BTC", dec!(1), dec!(40000)),
        buy("2", 1, "PEPE", dec!(1000000), dec!(0.000001)),
    ];
    let positions = build_positions(&trades, d(2));
    let allocation = allocate(&positions.positions, &prices(), d(2), &PricePolicy::default());

    assert_eq!(allocation.entries.len(), 1);
    assert_eq!(allocation.total_value, dec!(44000));
    assert_eq!(allocation.missing_price_symbols(), vec!["PEPE"]);
    assert!(matches!(
        allocation.warnings[0],
        CalculationWarning::MissingPrice { .. }
    ));
    assert_eq!(allocation.entries[0].percent_of_portfolio, dec!(100));
}

#[test]
fn test_stale_price_beyond_policy_counts_as_missing() {
    let trades = vec![buy("1", 1, "SOL", dec!(1), dec!(100))];
    let positions = build_positions(&trades, d(20));
    let policy = PricePolicy {
        max_staleness_days: Some(7),
    };
    let allocation = allocate(&positions.positions, &prices(), d(20), &policy);
    assert!(allocation.entries.is_empty());
    assert_eq!(allocation.total_value, Decimal::ZERO);
    assert_eq!(allocation.missing_price_symbols(), vec!["SOL"]);
}

#[test]
fn test_empty_portfolio_has_zero_totals() {
    let positions = build_positions(&[], d(2));
    let allocation = allocate(&positions.positions, &prices(), d(2), &PricePolicy::default());
    assert!(allocation.entries.is_empty());
    assert_eq!(allocation.total_value, Decimal::ZERO);
    assert_eq!(allocation.pnl().percent, Decimal::ZERO);
    assert_eq!(percent_of(dec!(5), Decimal::ZERO), Decimal::ZERO);
}

#[test]
fn test_position_rows_sorting() {
    let trades = vec![
        buy("1", 1, "SOL", dec!(10), dec!(50)),
        buy("2", 1, "BTC", dec!(0.1), dec!(41000)),
        buy("3", 1, "PEPE", dec!(5), dec!(1)),
    ];
    let positions = build_positions(&trades, d(2));
    let allocation = allocate(&positions.positions, &prices(), d(2), &PricePolicy::default());

    let by_value = position_rows(&positions.positions, &allocation, PositionSort::default());
    let symbols: Vec<&str> = by_value.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["BTC", "SOL", "PEPE"]);
    assert!(by_value[2].current_price.is_none());

    let by_pnl_asc = position_rows(
        &positions.positions,
        &allocation,
        PositionSort {
            field: PositionSortField::Pnl,
            direction: SortDirection::Asc,
        },
    );
    // PEPE has no price, BTC gained 300, SOL gained 500.
    let symbols: Vec<&str> = by_pnl_asc.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["PEPE", "BTC", "SOL"]);

    let by_symbol = position_rows(
        &positions.positions,
        &allocation,
        PositionSort {
            field: PositionSortField::Symbol,
            direction: SortDirection::Asc,
        },
    );
    let symbols: Vec<&str> = by_symbol.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["BTC", "PEPE", "SOL"]);
}

#[test]
fn test_pnl_percent_falls_back_to_zero_on_overflow() {
    let pnl = Pnl::from_values(Decimal::MAX, dec!(0.5));
    assert!(pnl.value > Decimal::ZERO);
    assert_eq!(pnl.percent, Decimal::ZERO);

    let pnl = Pnl::from_values(dec!(150), dec!(100));
    assert_eq!(pnl.value, dec!(50));
    assert_eq!(pnl.percent, dec!(50));
}
