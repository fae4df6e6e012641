//! Equity curve module - daily replay of the trade ledger into portfolio value.

pub mod equity_curve_builder;
mod equity_curve_model;

pub use equity_curve_builder::*;
pub use equity_curve_model::*;
