/// Decimal precision for valuation calculations
pub const DECIMAL_PRECISION: u32 = 8;

/// Quantity threshold for significant positions. Anything below is treated as dust.
pub const QUANTITY_THRESHOLD: &str = "0.00000001";

/// Calendar days per year used for CAGR and volatility annualization.
/// Crypto markets trade every day, so there is no trading-day calendar.
pub const DAYS_PER_YEAR: i64 = 365;

/// Largest date range (in days) a single request may span unless the caller opts out.
pub const MAX_RANGE_DAYS: i64 = 3660;

/// Assets the DCA simulator accepts by default.
pub const DEFAULT_SUPPORTED_ASSETS: &[&str] = &[
    "BTC", "ETH", "SOL", "ADA", "XRP", "DOT", "DOGE", "AVAX", "LINK", "MATIC",
];

/// Benchmarks reported alongside portfolio risk metrics.
pub const DEFAULT_BENCHMARKS: &[&str] = &["BTC", "ETH"];

/// Cache TTL for summary-style payloads (allocation, summary).
pub const SUMMARY_CACHE_TTL_SECS: u64 = 5 * 60;

/// Cache TTL for full-history snapshots (equity curves).
pub const SNAPSHOT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;
