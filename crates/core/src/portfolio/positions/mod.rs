//! Positions module - folds the trade ledger into per-symbol holdings.

pub mod position_builder;
mod positions_model;

pub use position_builder::*;
pub use positions_model::*;

#[cfg(test)]
mod position_builder_tests;
