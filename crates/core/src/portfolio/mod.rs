//! Ledger-driven portfolio analytics.

pub mod allocation;
pub mod analytics;
pub mod equity_curve;
pub mod performance;
pub mod positions;
