//! Market data domain models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Daily closing price for a symbol. One row per symbol per day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,
}

impl PricePoint {
    pub fn new(symbol: &str, date: NaiveDate, close: Decimal) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            date,
            close,
            open: None,
            high: None,
            low: None,
            volume: None,
        }
    }
}

/// Intraday observation, reduced to a daily close before the engine sees it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntradayQuote {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
}

/// Result of a "last known price" lookup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceLookup {
    pub price: Decimal,
    /// Day the price was actually observed (on or before the requested day).
    pub price_date: NaiveDate,
}

impl PriceLookup {
    /// Days between the requested day and the observation.
    pub fn age_days(&self, requested: NaiveDate) -> i64 {
        (requested - self.price_date).num_days()
    }
}

/// Staleness policy for the "last known price" fallback.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PricePolicy {
    /// `None` accepts any prior price; `Some(n)` rejects prices older than `n` days.
    pub max_staleness_days: Option<i64>,
}

impl PricePolicy {
    pub fn accepts(&self, lookup: &PriceLookup, requested: NaiveDate) -> bool {
        match self.max_staleness_days {
            Some(max) => lookup.age_days(requested) <= max,
            None => true,
        }
    }
}
