//! Core error types for the portfolio analytics engine.
//!
//! Fatal conditions are `Error` values. Recoverable data problems (an oversold
//! SELL, a symbol with no usable price) are `CalculationWarning`s attached to the
//! result so callers can render partial data instead of failing the request.

use chrono::{DateTime, NaiveDate, ParseError as ChronoParseError, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the analytics engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Calculation failed: {0}")]
    Calculation(#[from] CalculatorError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Errors that abort a calculation because no meaningful result exists.
#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("No price data for {symbol} on or before {date}")]
    MissingPriceData { symbol: String, date: NaiveDate },

    #[error("Calculation failed: {0}")]
    Calculation(String),
}

/// Validation errors for caller input. Never retried.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),

    #[error("Amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("Interval must be at least 1 day, got {0}")]
    InvalidInterval(i64),

    #[error("Start date {start} is after end date {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },

    #[error("End date {end} is in the future (today is {today})")]
    FutureEndDate { end: NaiveDate, today: NaiveDate },

    #[error("Asset '{0}' is not supported")]
    UnsupportedAsset(String),

    #[error("Date range of {days} days exceeds the maximum of {max} days")]
    RangeTooLong { days: i64, max: i64 },

    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),
}

/// Non-fatal problems found while computing a result.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CalculationWarning {
    /// A trade row could not be applied as recorded. For an oversold SELL the
    /// holding is clamped to zero; malformed rows are skipped.
    #[serde(rename_all = "camelCase")]
    DataIntegrity {
        trade_id: String,
        symbol: String,
        timestamp: DateTime<Utc>,
        message: String,
    },
    /// No usable price for a held symbol, so it was left out of valued totals.
    #[serde(rename_all = "camelCase")]
    MissingPrice { symbol: String, date: NaiveDate },
}

impl std::fmt::Display for CalculationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalculationWarning::DataIntegrity {
                trade_id,
                symbol,
                timestamp,
                message,
            } => write!(
                f,
                "Trade {} ({}) at {}: {}",
                trade_id, symbol, timestamp, message
            ),
            CalculationWarning::MissingPrice { symbol, date } => {
                write!(f, "No price for {} as of {}", symbol, date)
            }
        }
    }
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Unexpected(err.to_string())
    }
}
