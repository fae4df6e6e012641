//! Cache port for callers that memoize analytics results.
//!
//! The engine never reads or writes a cache. Callers wrap engine calls and
//! must get the same payload with or without one.

mod cache_traits;
mod memory_cache;

pub use cache_traits::*;
pub use memory_cache::*;
