//! Allocation models for the current portfolio breakdown.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CalculationWarning;

/// Unrealized profit/loss of a holding.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pnl {
    /// Market value minus cost basis.
    pub value: Decimal,
    /// `value / cost_basis * 100`, zero when there is no cost basis.
    pub percent: Decimal,
}

/// One holding valued at the as-of date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllocationEntry {
    pub symbol: String,
    pub holdings: Decimal,
    pub current_price: Decimal,
    /// Day the price was observed; earlier than the as-of date when a stale price was carried.
    pub price_date: NaiveDate,
    pub position_value: Decimal,
    /// Percentage of total portfolio value (0-100)
    pub percent_of_portfolio: Decimal,
    pub cost_basis: Decimal,
    pub pnl: Pnl,
}

/// Valued holdings, largest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub as_of: Option<NaiveDate>,
    /// Sorted by `position_value` descending. The UI relies on this order.
    pub entries: Vec<AllocationEntry>,
    pub total_value: Decimal,
    /// Cost basis of the valued entries only.
    pub total_cost_basis: Decimal,
    #[serde(default)]
    pub warnings: Vec<CalculationWarning>,
}

impl Allocation {
    /// Symbols left out of the totals for lack of a price.
    pub fn missing_price_symbols(&self) -> Vec<&str> {
        self.warnings
            .iter()
            .filter_map(|w| match w {
                CalculationWarning::MissingPrice { symbol, .. } => Some(symbol.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn pnl(&self) -> Pnl {
        Pnl::from_values(self.total_value, self.total_cost_basis)
    }
}

impl Pnl {
    pub fn from_values(market_value: Decimal, cost_basis: Decimal) -> Self {
        let value = market_value.checked_sub(cost_basis).unwrap_or(Decimal::ZERO);
        let percent = if cost_basis > Decimal::ZERO {
            value
                .checked_div(cost_basis)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };
        Self { value, percent }
    }
}

/// Detailed per-position row for the positions view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionRow {
    pub symbol: String,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub total_cost_basis: Decimal,
    /// `None` when no usable price exists.
    pub current_price: Option<Decimal>,
    pub market_value: Option<Decimal>,
    pub percent_of_portfolio: Decimal,
    pub unrealized_pnl: Option<Pnl>,
    pub realized_pnl: Decimal,
    pub total_fees: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSortField {
    Symbol,
    #[default]
    Value,
    Percent,
    Pnl,
}

impl FromStr for PositionSortField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "symbol" => Ok(PositionSortField::Symbol),
            "value" => Ok(PositionSortField::Value),
            "percent" => Ok(PositionSortField::Percent),
            "pnl" => Ok(PositionSortField::Pnl),
            other => Err(format!("Unknown sort field: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(format!("Unknown sort direction: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSort {
    pub field: PositionSortField,
    pub direction: SortDirection,
}
