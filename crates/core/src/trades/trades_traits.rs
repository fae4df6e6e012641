use super::trades_model::{Portfolio, Trade};
use crate::Result;

/// Read access to the trade ledger. Implemented by the storage layer.
pub trait TradeRepositoryTrait: Send + Sync {
    fn list_portfolios(&self) -> Result<Vec<Portfolio>>;
    fn get_portfolio(&self, portfolio_id: &str) -> Result<Portfolio>;
    /// Trades of a portfolio in ingestion order.
    fn get_trades(&self, portfolio_id: &str) -> Result<Vec<Trade>>;
}
