use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::HashSet;

use super::{EquityCurve, EquityCurvePoint};
use crate::config::AnalyticsConfig;
use crate::errors::{CalculationWarning, Result};
use crate::market_data::{PriceIndex, PricePolicy};
use crate::portfolio::positions::PositionLedger;
use crate::trades::{sort_trades, Trade};
use crate::utils::time_utils::{get_days_between, validate_date_range};

/// Resolves optional range bounds.
///
/// A missing start defaults to the first trade's date (or the end date for an
/// empty ledger); a missing end defaults to `today`.
pub fn resolve_curve_range(
    trades: &[Trade],
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let end = end_date.unwrap_or(today);
    let start = start_date
        .or_else(|| trades.iter().map(Trade::trade_date).min())
        .unwrap_or(end);
    (start, end)
}

/// Replays the ledger one calendar day at a time and values the holdings at
/// each day's last known prices.
///
/// Positions are advanced through the same fold `build_positions` uses, so the
/// value on day `d` always equals valuing `build_positions(trades, d)`.
/// Symbols without a usable price are left out of that day's total and
/// reported once.
pub fn build_curve(
    trades: &[Trade],
    price_index: &dyn PriceIndex,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    today: NaiveDate,
    config: &AnalyticsConfig,
) -> Result<EquityCurve> {
    let (start, end) = resolve_curve_range(trades, start_date, end_date, today);
    validate_date_range(start, end, config.max_range_days)?;

    let mut ordered: Vec<Trade> = trades.to_vec();
    sort_trades(&mut ordered);

    let policy = config.price_policy();
    let mut ledger = PositionLedger::default();
    let mut cursor = 0usize;
    let mut missing_reported: HashSet<String> = HashSet::new();
    let mut price_warnings: Vec<CalculationWarning> = Vec::new();

    let days = get_days_between(start, end);
    let mut points: Vec<EquityCurvePoint> = Vec::with_capacity(days.len());

    for day in days {
        while cursor < ordered.len() && ordered[cursor].trade_date() <= day {
            ledger.apply(&ordered[cursor]);
            cursor += 1;
        }

        let total_value = value_holdings(
            &ledger,
            price_index,
            day,
            &policy,
            &mut missing_reported,
            &mut price_warnings,
        );
        points.push(EquityCurvePoint::new(day, total_value));
    }

    debug!(
        "Built equity curve {}..{} with {} points from {} trades",
        start,
        end,
        points.len(),
        trades.len()
    );

    let mut warnings = ledger.into_warnings();
    warnings.extend(price_warnings);

    Ok(EquityCurve {
        start_date: start,
        end_date: end,
        points,
        warnings,
    })
}

fn value_holdings(
    ledger: &PositionLedger,
    price_index: &dyn PriceIndex,
    day: NaiveDate,
    policy: &PricePolicy,
    missing_reported: &mut HashSet<String>,
    warnings: &mut Vec<CalculationWarning>,
) -> Decimal {
    let mut total = Decimal::ZERO;
    for (symbol, quantity) in ledger.holdings() {
        match price_index.price_as_of(symbol, day, policy) {
            Some(lookup) => total += quantity * lookup.price,
            None => {
                if missing_reported.insert(symbol.to_string()) {
                    let warning = CalculationWarning::MissingPrice {
                        symbol: symbol.to_string(),
                        date: day,
                    };
                    warn!("Equity curve: {}. Excluded from daily totals.", warning);
                    warnings.push(warning);
                }
            }
        }
    }
    total
}

/// Forward-filled closing-price curve of a single asset, used as a benchmark.
///
/// Days before the asset's first usable price are zero and reported once.
pub fn build_benchmark_curve(
    price_index: &dyn PriceIndex,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    config: &AnalyticsConfig,
) -> Result<EquityCurve> {
    validate_date_range(start, end, config.max_range_days)?;
    let policy = config.price_policy();
    let mut warnings = Vec::new();

    let points: Vec<EquityCurvePoint> = get_days_between(start, end)
        .into_iter()
        .map(|day| {
            let value = match price_index.price_as_of(symbol, day, &policy) {
                Some(lookup) => lookup.price,
                None => {
                    if warnings.is_empty() {
                        warnings.push(CalculationWarning::MissingPrice {
                            symbol: symbol.to_string(),
                            date: day,
                        });
                    }
                    Decimal::ZERO
                }
            };
            EquityCurvePoint::new(day, value)
        })
        .collect();

    Ok(EquityCurve {
        start_date: start,
        end_date: end,
        points,
        warnings,
    })
}
