//! Cryptofolio Core - the portfolio analytics engine.
//!
//! Turns a trade ledger and a daily price history into positions, allocation,
//! equity curves, risk metrics and DCA simulations. The crate is pure and
//! storage-agnostic: trades, prices and caching come in through the traits in
//! `trades`, `market_data` and `cache`.

pub mod cache;
pub mod charts;
pub mod config;
pub mod constants;
pub mod errors;
pub mod market_data;
pub mod portfolio;
pub mod simulation;
pub mod trades;
pub mod utils;

pub use config::AnalyticsConfig;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
