//! In-memory collaborators seeded from the data directory.
//!
//! `portfolios.json` holds the trade ledgers and `prices.csv` the daily closes
//! (`symbol,date,close` plus optional `open,high,low,volume`).

use anyhow::Context;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use cryptofolio_core::errors::{Error as CoreError, Result as CoreResult};
use cryptofolio_core::market_data::{InMemoryPriceIndex, PricePoint};
use cryptofolio_core::trades::{sort_trades, NewTrade, Portfolio, Trade, TradeRepositoryTrait};

pub const PORTFOLIOS_FILE: &str = "portfolios.json";
pub const PRICES_FILE: &str = "prices.csv";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PortfolioRecord {
    id: String,
    name: String,
    #[serde(default)]
    trades: Vec<NewTrade>,
}

/// Trade ledgers held in memory, one per portfolio.
#[derive(Debug, Default)]
pub struct InMemoryTradeRepository {
    portfolios: BTreeMap<String, (Portfolio, Vec<Trade>)>,
}

impl InMemoryTradeRepository {
    pub fn insert(&mut self, portfolio: Portfolio, mut trades: Vec<Trade>) {
        sort_trades(&mut trades);
        self.portfolios
            .insert(portfolio.id.clone(), (portfolio, trades));
    }

    pub fn len(&self) -> usize {
        self.portfolios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portfolios.is_empty()
    }
}

impl TradeRepositoryTrait for InMemoryTradeRepository {
    fn list_portfolios(&self) -> CoreResult<Vec<Portfolio>> {
        Ok(self.portfolios.values().map(|(p, _)| p.clone()).collect())
    }

    fn get_portfolio(&self, portfolio_id: &str) -> CoreResult<Portfolio> {
        self.portfolios
            .get(portfolio_id)
            .map(|(p, _)| p.clone())
            .ok_or_else(|| CoreError::NotFound(format!("Portfolio '{}'", portfolio_id)))
    }

    fn get_trades(&self, portfolio_id: &str) -> CoreResult<Vec<Trade>> {
        self.portfolios
            .get(portfolio_id)
            .map(|(_, trades)| trades.clone())
            .ok_or_else(|| CoreError::NotFound(format!("Portfolio '{}'", portfolio_id)))
    }
}

/// Loads every portfolio in `portfolios.json`. A missing file yields an empty
/// repository; a malformed trade fails the load.
pub fn load_portfolios(data_dir: &Path) -> anyhow::Result<InMemoryTradeRepository> {
    let path = data_dir.join(PORTFOLIOS_FILE);
    let mut repository = InMemoryTradeRepository::default();
    if !path.exists() {
        tracing::warn!("No {} in {}; starting empty", PORTFOLIOS_FILE, data_dir.display());
        return Ok(repository);
    }

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let records: Vec<PortfolioRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    for record in records {
        let trades = record
            .trades
            .into_iter()
            .map(NewTrade::into_trade)
            .collect::<CoreResult<Vec<_>>>()
            .with_context(|| format!("Invalid trade in portfolio '{}'", record.id))?;
        tracing::info!("Loaded portfolio '{}' with {} trades", record.id, trades.len());
        repository.insert(
            Portfolio {
                id: record.id,
                name: record.name,
            },
            trades,
        );
    }
    Ok(repository)
}

/// Loads `prices.csv` into a price index. A missing file yields an empty index.
pub fn load_prices(data_dir: &Path) -> anyhow::Result<InMemoryPriceIndex> {
    let path = data_dir.join(PRICES_FILE);
    let mut index = InMemoryPriceIndex::new();
    if !path.exists() {
        tracing::warn!("No {} in {}; prices unavailable", PRICES_FILE, data_dir.display());
        return Ok(index);
    }

    let mut rdr = ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut points = Vec::new();
    for (line_number, result) in rdr.deserialize().enumerate() {
        let point: PricePoint = result
            .with_context(|| format!("{} line {}", PRICES_FILE, line_number + 2))?;
        points.push(point);
    }
    tracing::info!("Loaded {} price rows", points.len());
    index.extend(points);
    Ok(index)
}
