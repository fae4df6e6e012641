use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::market_data_model::{PriceLookup, PricePolicy};

/// Read-only access to daily closing prices.
///
/// The engine only consumes this interface; the price store behind it is owned
/// by the caller. Symbols are uppercase asset codes.
pub trait PriceIndex: Send + Sync {
    /// Closing price recorded for exactly `date`.
    fn price_on(&self, symbol: &str, date: NaiveDate) -> Option<Decimal>;

    /// Most recent closing price on or before `date`, if one exists.
    fn latest_on_or_before(&self, symbol: &str, date: NaiveDate) -> Option<PriceLookup>;

    /// Earliest day with a price for `symbol`.
    fn first_date(&self, symbol: &str) -> Option<NaiveDate>;

    fn has_symbol(&self, symbol: &str) -> bool {
        self.first_date(symbol).is_some()
    }

    /// "Last known price" lookup honouring the staleness policy.
    fn price_as_of(
        &self,
        symbol: &str,
        date: NaiveDate,
        policy: &PricePolicy,
    ) -> Option<PriceLookup> {
        self.latest_on_or_before(symbol, date)
            .filter(|lookup| policy.accepts(lookup, date))
    }
}
