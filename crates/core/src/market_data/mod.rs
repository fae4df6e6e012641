//! Historical price access for the analytics engine.

mod market_data_model;
mod market_data_traits;
mod price_index;

pub use market_data_model::*;
pub use market_data_traits::*;
pub use price_index::*;
