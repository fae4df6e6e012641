use crate::errors::CalculationWarning;
use crate::portfolio::positions::{apply_trade, build_positions, PositionLedger};
use crate::trades::{Trade, TradeSide};
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn trade(
    id: &str,
    day: u32,
    symbol: &str,
    side: TradeSide,
    quantity: Decimal,
    price: Decimal,
) -> Trade {
    Trade {
        id: id.to_string(),
        timestamp: Utc.with_ymd_and_hms(2024, 1, day, 10, 0, 0).unwrap(),
        symbol: symbol.to_string(),
        side,
        quantity,
        price,
        fee: dec!(1),
        exchange: "Coinbase".to_string(),
    }
}

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

#[test]
fn test_buy_updates_weighted_average() {
    let trades = vec![
        trade("1", 1, "BTC", TradeSide::Buy, dec!(1), dec!(40000)),
        trade("2", 2, "BTC", TradeSide::Buy, dec!(1), dec!(50000)),
    ];
    let result = build_positions(&trades, d(2));
    let btc = &result.positions["BTC"];
    assert_eq!(btc.quantity, dec!(2));
    assert_eq!(btc.average_cost, dec!(45000));
    assert_eq!(btc.total_cost_basis, dec!(90000));
    assert_eq!(btc.total_fees, dec!(2));
    assert!(result.warnings.is_empty());
}

#[test]
fn test_sell_keeps_average_and_realizes_pnl() {
    let trades = vec![
        trade("1", 1, "ETH", TradeSide::Buy, dec!(4), dec!(2000)),
        trade("2", 3, "ETH", TradeSide::Sell, dec!(1), dec!(2500)),
    ];
    let result = build_positions(&trades, d(5));
    let eth = &result.positions["ETH"];
    assert_eq!(eth.quantity, dec!(3));
    assert_eq!(eth.average_cost, dec!(2000));
    assert_eq!(eth.total_cost_basis, dec!(6000));
    assert_eq!(eth.realized_pnl, dec!(500));
}

#[test]
fn test_as_of_excludes_later_trades() {
    let trades = vec![
        trade("1", 1, "BTC", TradeSide::Buy, dec!(1), dec!(40000)),
        trade("2", 4, "BTC", TradeSide::Buy, dec!(3), dec!(30000)),
    ];
    let result = build_positions(&trades, d(3));
    assert_eq!(result.positions["BTC"].quantity, dec!(1));
    assert_eq!(result.as_of, Some(d(3)));
}

#[test]
fn test_oversold_sell_clamps_to_zero_with_warning() {
    let trades = vec![
        trade("1", 1, "BTC", TradeSide::Buy, dec!(1), dec!(40000)),
        trade("2", 2, "BTC", TradeSide::Sell, dec!(2), dec!(41000)),
    ];
    let result = build_positions(&trades, d(2));
    assert!(result.positions.get("BTC").is_none());
    assert_eq!(result.warnings.len(), 1);
    match &result.warnings[0] {
        CalculationWarning::DataIntegrity {
            trade_id, symbol, ..
        } => {
            assert_eq!(trade_id, "2");
            assert_eq!(symbol, "BTC");
        }
        other => panic!("unexpected warning {:?}", other),
    }
}

#[test]
fn test_processing_continues_after_oversold_sell() {
    let trades = vec![
        trade("1", 1, "BTC", TradeSide::Buy, dec!(1), dec!(40000)),
        trade("2", 2, "BTC", TradeSide::Sell, dec!(2), dec!(41000)),
        trade("3", 3, "BTC", TradeSide::Buy, dec!(0.5), dec!(42000)),
    ];
    let result = build_positions(&trades, d(3));
    let btc = &result.positions["BTC"];
    assert_eq!(btc.quantity, dec!(0.5));
    assert_eq!(btc.average_cost, dec!(42000));
    assert_eq!(btc.realized_pnl, dec!(1000));
}

#[test]
fn test_dust_positions_are_excluded() {
    let trades = vec![
        trade("1", 1, "SOL", TradeSide::Buy, dec!(10), dec!(100)),
        trade("2", 2, "SOL", TradeSide::Sell, dec!(9.999999999), dec!(110)),
    ];
    let result = build_positions(&trades, d(2));
    assert!(result.is_empty());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_negative_quantity_row_is_skipped() {
    let trades = vec![
        trade("1", 1, "ADA", TradeSide::Buy, dec!(100), dec!(0.5)),
        trade("2", 2, "ADA", TradeSide::Buy, dec!(-50), dec!(0.6)),
    ];
    let result = build_positions(&trades, d(2));
    assert_eq!(result.positions["ADA"].quantity, dec!(100));
    assert_eq!(result.positions["ADA"].total_fees, dec!(1));
    assert_eq!(result.warnings.len(), 1);
}

#[test]
fn test_unordered_input_is_replayed_chronologically() {
    let trades = vec![
        trade("2", 2, "BTC", TradeSide::Sell, dec!(1), dec!(45000)),
        trade("1", 1, "BTC", TradeSide::Buy, dec!(2), dec!(40000)),
    ];
    let result = build_positions(&trades, d(2));
    assert_eq!(result.positions["BTC"].quantity, dec!(1));
    assert!(result.warnings.is_empty());
}

#[test]
fn test_apply_trade_is_pure() {
    let buy = trade("1", 1, "BTC", TradeSide::Buy, dec!(2), dec!(100));
    let (state, effect) = apply_trade((dec!(2), dec!(50)), &buy);
    assert_eq!(state, (dec!(4), dec!(75)));
    assert_eq!(effect.realized_pnl, Decimal::ZERO);
    assert!(effect.issue.is_none());

    let (again, _) = apply_trade((dec!(2), dec!(50)), &buy);
    assert_eq!(again, state);
}

#[test]
fn test_ledger_tracks_closed_positions_realized_pnl() {
    let mut ledger = PositionLedger::default();
    ledger.apply(&trade("1", 1, "DOGE", TradeSide::Buy, dec!(1000), dec!(0.1)));
    ledger.apply(&trade("2", 2, "DOGE", TradeSide::Sell, dec!(1000), dec!(0.15)));
    assert_eq!(ledger.quantity("DOGE"), Decimal::ZERO);
    assert_eq!(ledger.holdings().count(), 0);
    assert_eq!(ledger.realized_pnl()["DOGE"], dec!(50));
}
