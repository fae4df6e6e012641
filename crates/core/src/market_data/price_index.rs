use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use super::market_data_model::{IntradayQuote, PriceLookup, PricePoint};
use super::market_data_traits::PriceIndex;
use crate::utils::time_utils::date_from_utc;

/// Price index held entirely in memory, keyed by symbol then day.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceIndex {
    closes: HashMap<String, BTreeMap<NaiveDate, Decimal>>,
}

impl InMemoryPriceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = PricePoint>,
    {
        let mut index = Self::new();
        index.extend(points);
        index
    }

    /// Inserts a daily close, replacing any existing close for that day.
    pub fn insert(&mut self, symbol: &str, date: NaiveDate, close: Decimal) {
        self.closes
            .entry(symbol.trim().to_uppercase())
            .or_default()
            .insert(date, close);
    }

    pub fn extend<I>(&mut self, points: I)
    where
        I: IntoIterator<Item = PricePoint>,
    {
        for point in points {
            self.insert(&point.symbol, point.date, point.close);
        }
    }

    /// Reduces intraday quotes to daily closes and inserts them.
    pub fn extend_intraday(&mut self, quotes: &[IntradayQuote]) {
        self.extend(reduce_to_daily_closes(quotes));
    }

    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.closes.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    pub fn len(&self) -> usize {
        self.closes.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PriceIndex for InMemoryPriceIndex {
    fn price_on(&self, symbol: &str, date: NaiveDate) -> Option<Decimal> {
        self.closes.get(symbol)?.get(&date).copied()
    }

    fn latest_on_or_before(&self, symbol: &str, date: NaiveDate) -> Option<PriceLookup> {
        self.closes
            .get(symbol)?
            .range(..=date)
            .next_back()
            .map(|(price_date, price)| PriceLookup {
                price: *price,
                price_date: *price_date,
            })
    }

    fn first_date(&self, symbol: &str) -> Option<NaiveDate> {
        self.closes
            .get(symbol)?
            .keys()
            .next()
            .copied()
    }
}

/// Keeps the last quote of each UTC day per symbol as that day's close.
/// When two quotes share a timestamp the one appearing later in the input wins.
pub fn reduce_to_daily_closes(quotes: &[IntradayQuote]) -> Vec<PricePoint> {
    let mut latest: BTreeMap<(String, NaiveDate), (DateTime<Utc>, Decimal)> = BTreeMap::new();
    for quote in quotes {
        let key = (quote.symbol.trim().to_uppercase(), date_from_utc(quote.timestamp));
        match latest.get(&key) {
            Some((seen, _)) if *seen > quote.timestamp => {}
            _ => {
                latest.insert(key, (quote.timestamp, quote.price));
            }
        }
    }
    debug!(
        "Reduced {} intraday quotes to {} daily closes",
        quotes.len(),
        latest.len()
    );
    latest
        .into_iter()
        .map(|((symbol, date), (_, close))| PricePoint::new(&symbol, date, close))
        .collect()
}
