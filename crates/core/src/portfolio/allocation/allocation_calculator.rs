//! Values positions against the price index.

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::{Allocation, AllocationEntry, Pnl, PositionRow, PositionSort, PositionSortField, SortDirection};
use crate::errors::CalculationWarning;
use crate::market_data::{PriceIndex, PricePolicy};
use crate::portfolio::positions::Position;

/// Values every position at `as_of` using the "last known price" policy.
///
/// Positions without a usable price are excluded from the totals and reported
/// as `MissingPrice` warnings rather than valued at zero.
pub fn allocate(
    positions: &BTreeMap<String, Position>,
    price_index: &dyn PriceIndex,
    as_of: NaiveDate,
    policy: &PricePolicy,
) -> Allocation {
    let mut entries: Vec<AllocationEntry> = Vec::with_capacity(positions.len());
    let mut warnings: Vec<CalculationWarning> = Vec::new();

    for (symbol, position) in positions {
        let Some(lookup) = price_index.price_as_of(symbol, as_of, policy) else {
            let warning = CalculationWarning::MissingPrice {
                symbol: symbol.clone(),
                date: as_of,
            };
            warn!("Allocation: {}. Excluded from totals.", warning);
            warnings.push(warning);
            continue;
        };

        let position_value = position.quantity * lookup.price;
        entries.push(AllocationEntry {
            symbol: symbol.clone(),
            holdings: position.quantity,
            current_price: lookup.price,
            price_date: lookup.price_date,
            position_value,
            percent_of_portfolio: Decimal::ZERO,
            cost_basis: position.total_cost_basis,
            pnl: Pnl::from_values(position_value, position.total_cost_basis),
        });
    }

    let total_value: Decimal = entries.iter().map(|e| e.position_value).sum();
    let total_cost_basis: Decimal = entries.iter().map(|e| e.cost_basis).sum();
    for entry in &mut entries {
        entry.percent_of_portfolio = percent_of(entry.position_value, total_value);
    }

    entries.sort_by(|a, b| {
        b.position_value
            .cmp(&a.position_value)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });

    debug!(
        "Allocated {} entries as of {}: total value {}",
        entries.len(),
        as_of,
        total_value
    );

    Allocation {
        as_of: Some(as_of),
        entries,
        total_value,
        total_cost_basis,
        warnings,
    }
}

/// Builds the detailed positions view: every position, priced where possible,
/// sorted as requested. Positions without a price sort as the smallest values.
pub fn position_rows(
    positions: &BTreeMap<String, Position>,
    allocation: &Allocation,
    sort: PositionSort,
) -> Vec<PositionRow> {
    let priced: BTreeMap<&str, &AllocationEntry> = allocation
        .entries
        .iter()
        .map(|e| (e.symbol.as_str(), e))
        .collect();

    let mut rows: Vec<PositionRow> = positions
        .values()
        .map(|position| {
            let entry = priced.get(position.symbol.as_str());
            PositionRow {
                symbol: position.symbol.clone(),
                quantity: position.quantity,
                average_cost: position.average_cost,
                total_cost_basis: position.total_cost_basis,
                current_price: entry.map(|e| e.current_price),
                market_value: entry.map(|e| e.position_value),
                percent_of_portfolio: entry
                    .map(|e| e.percent_of_portfolio)
                    .unwrap_or(Decimal::ZERO),
                unrealized_pnl: entry.map(|e| e.pnl),
                realized_pnl: position.realized_pnl,
                total_fees: position.total_fees,
            }
        })
        .collect();

    sort_position_rows(&mut rows, sort);
    rows
}

pub fn sort_position_rows(rows: &mut [PositionRow], sort: PositionSort) {
    rows.sort_by(|a, b| {
        let ordering = match sort.field {
            PositionSortField::Symbol => a.symbol.cmp(&b.symbol),
            PositionSortField::Value => cmp_optional(a.market_value, b.market_value),
            PositionSortField::Percent => a.percent_of_portfolio.cmp(&b.percent_of_portfolio),
            PositionSortField::Pnl => cmp_optional(
                a.unrealized_pnl.map(|p| p.value),
                b.unrealized_pnl.map(|p| p.value),
            ),
        };
        let ordering = match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        ordering.then_with(|| a.symbol.cmp(&b.symbol))
    });
}

fn cmp_optional(a: Option<Decimal>, b: Option<Decimal>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// `part / total * 100`, zero when the total is not positive.
pub fn percent_of(part: Decimal, total: Decimal) -> Decimal {
    if total > Decimal::ZERO {
        part / total * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}
