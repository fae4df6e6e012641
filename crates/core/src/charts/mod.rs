//! Presentation-time transforms for chart series.
//!
//! Nothing here may feed back into metric calculations.

pub mod lttb;

pub use lttb::*;
