mod performance_model;
pub mod risk_metrics;

pub use performance_model::*;
pub use risk_metrics::*;

#[cfg(test)]
mod risk_metrics_tests;
