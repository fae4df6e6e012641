use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::CalculationWarning;
use crate::portfolio::allocation::Pnl;

/// Second leg of a two-asset plan. `weight` is its share of each purchase in
/// percent; the primary asset receives the rest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PairLeg {
    pub asset: String,
    pub weight: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DcaRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Invested on every purchase date.
    pub amount: Decimal,
    /// Days between purchases.
    pub interval: i64,
    pub asset: String,
    #[serde(default)]
    pub pair: Option<PairLeg>,
}

/// An asset and its fraction (0..=1) of every purchase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetWeight {
    pub symbol: String,
    pub fraction: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLeg {
    pub symbol: String,
    pub amount: Decimal,
    pub price: Decimal,
    pub units: Decimal,
}

/// One scheduled DCA buy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DcaPurchase {
    pub date: NaiveDate,
    pub legs: Vec<PurchaseLeg>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StrategyStats {
    pub total_value: Decimal,
    /// Final value against the amount invested.
    pub pnl: Pnl,
    pub cagr: Decimal,
    pub max_drawdown: Decimal,
    pub volatility: Decimal,
    /// Units held at the end of the range.
    pub holdings: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DcaDailyPoint {
    pub date: NaiveDate,
    pub dca_value: Decimal,
    pub hodl_value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DcaResult {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub assets: Vec<AssetWeight>,
    /// `amount * purchase_count`. The lump sum invests the same total.
    pub total_invested: Decimal,
    pub purchase_count: usize,
    pub dca: StrategyStats,
    pub hodl: StrategyStats,
    pub daily_data: Vec<DcaDailyPoint>,
    pub purchases: Vec<DcaPurchase>,
    #[serde(default)]
    pub warnings: Vec<CalculationWarning>,
}
