//! Hypothetical dollar-cost-averaging versus lump-sum comparisons.
//!
//! Simulations never touch a trade ledger; they only read prices.

mod dca_model;
mod dca_presets;
pub mod dca_simulator;

pub use dca_model::*;
pub use dca_presets::*;
pub use dca_simulator::*;
