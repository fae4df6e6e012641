use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::QUANTITY_THRESHOLD;
use crate::errors::CalculationWarning;

/// Returns true when a quantity is above the dust threshold.
pub fn is_quantity_significant(quantity: &Decimal) -> bool {
    let threshold =
        Decimal::from_str_radix(QUANTITY_THRESHOLD, 10).unwrap_or_else(|_| Decimal::new(1, 8));
    quantity.abs() >= threshold
}

/// Running cost-basis accumulator for one symbol: `(quantity, average_cost)`.
pub type CostBasisState = (Decimal, Decimal);

/// Holding of a single symbol derived from the ledger. Never persisted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: String,
    pub quantity: Decimal,
    /// Weighted-average cost per unit. Only BUY trades move it.
    pub average_cost: Decimal,
    /// `quantity * average_cost`.
    pub total_cost_basis: Decimal,
    /// Sum of `qty_sold * (sell_price - avg_cost_at_sale)`.
    pub realized_pnl: Decimal,
    pub total_fees: Decimal,
    pub first_trade_at: DateTime<Utc>,
    pub last_trade_at: DateTime<Utc>,
}

/// Output of `build_positions`: holdings above the dust threshold plus any
/// non-fatal ledger problems met along the way.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionsResult {
    pub as_of: Option<NaiveDate>,
    pub positions: BTreeMap<String, Position>,
    pub warnings: Vec<CalculationWarning>,
}

impl PositionsResult {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn total_cost_basis(&self) -> Decimal {
        self.positions.values().map(|p| p.total_cost_basis).sum()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
