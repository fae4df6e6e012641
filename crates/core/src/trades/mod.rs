//! Trade ledger entities and the repository contract that supplies them.

mod trades_constants;
mod trades_model;
mod trades_traits;

pub use trades_constants::*;
pub use trades_model::*;
pub use trades_traits::*;
