use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::trades_constants::{TRADE_SIDE_BUY, TRADE_SIDE_SELL};
use crate::errors::{Result, ValidationError};
use crate::utils::time_utils::date_from_utc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => TRADE_SIDE_BUY,
            TradeSide::Sell => TRADE_SIDE_SELL,
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeSide {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            TRADE_SIDE_BUY => Ok(TradeSide::Buy),
            TRADE_SIDE_SELL => Ok(TradeSide::Sell),
            other => Err(format!("Unknown trade side: {}", other)),
        }
    }
}

/// An executed trade. Immutable once ingested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Normalized uppercase asset code.
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: Decimal,
    /// Quote currency (USD) per unit.
    pub price: Decimal,
    pub fee: Decimal,
    pub exchange: String,
}

impl Trade {
    pub fn trade_date(&self) -> chrono::NaiveDate {
        date_from_utc(self.timestamp)
    }

    /// Gross notional of the trade, excluding fees.
    pub fn notional(&self) -> Decimal {
        self.quantity * self.price
    }
}

/// Input model for recording a trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrade {
    pub id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: Decimal,
    pub price: Decimal,
    #[serde(default)]
    pub fee: Decimal,
    #[serde(default)]
    pub exchange: String,
}

impl NewTrade {
    /// Validates the new trade data.
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(ValidationError::MissingField("symbol".to_string()).into());
        }
        if self.quantity.is_sign_negative() {
            return Err(ValidationError::InvalidInput(format!(
                "Trade quantity must not be negative, got {}",
                self.quantity
            ))
            .into());
        }
        if self.price.is_sign_negative() {
            return Err(ValidationError::InvalidInput(format!(
                "Trade price must not be negative, got {}",
                self.price
            ))
            .into());
        }
        if self.fee.is_sign_negative() {
            return Err(ValidationError::InvalidInput(format!(
                "Trade fee must not be negative, got {}",
                self.fee
            ))
            .into());
        }
        Ok(())
    }

    /// Validates and normalizes into an immutable `Trade`.
    pub fn into_trade(self) -> Result<Trade> {
        self.validate()?;
        Ok(Trade {
            id: self
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            timestamp: self.timestamp,
            symbol: normalize_symbol(&self.symbol),
            side: self.side,
            quantity: self.quantity,
            price: self.price,
            fee: self.fee,
            exchange: self.exchange.trim().to_string(),
        })
    }
}

/// A named trade ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub name: String,
}

pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Orders trades chronologically. The sort is stable, so trades sharing a
/// timestamp keep their ingestion order.
pub fn sort_trades(trades: &mut [Trade]) {
    trades.sort_by_key(|t| t.timestamp);
}
