//! Portfolio-level analytics composed from the engine building blocks.

mod analytics_model;
mod analytics_service;
mod analytics_traits;

pub use analytics_model::*;
pub use analytics_service::*;
pub use analytics_traits::*;

#[cfg(test)]
mod analytics_service_tests;
