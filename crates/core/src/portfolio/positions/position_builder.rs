use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::positions_model::{is_quantity_significant, CostBasisState, Position, PositionsResult};
use crate::errors::CalculationWarning;
use crate::trades::{sort_trades, Trade, TradeSide};

/// What a single trade did to a symbol's cost-basis state.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeEffect {
    pub realized_pnl: Decimal,
    /// The trade left the state untouched.
    pub skipped: bool,
    /// Set when the trade could not be applied exactly as recorded.
    pub issue: Option<String>,
}

impl TradeEffect {
    fn clean(realized_pnl: Decimal) -> Self {
        Self {
            realized_pnl,
            skipped: false,
            issue: None,
        }
    }
}

/// Applies one trade to a `(quantity, average_cost)` accumulator.
///
/// BUY: `new_avg = (qty * avg + buy_qty * price) / (qty + buy_qty)`.
/// SELL: quantity drops, average cost is unchanged. A SELL larger than the
/// holding clamps the quantity to zero and reports an issue. Rows with negative
/// quantity or price are skipped and reported.
pub fn apply_trade(state: CostBasisState, trade: &Trade) -> (CostBasisState, TradeEffect) {
    let (quantity, average_cost) = state;

    if trade.quantity.is_sign_negative() || trade.price.is_sign_negative() {
        return (
            state,
            TradeEffect {
                realized_pnl: Decimal::ZERO,
                skipped: true,
                issue: Some(format!(
                    "Skipped {} with negative quantity or price ({} @ {})",
                    trade.side, trade.quantity, trade.price
                )),
            },
        );
    }

    match trade.side {
        TradeSide::Buy => {
            let new_quantity = quantity + trade.quantity;
            if new_quantity.is_zero() {
                return (state, TradeEffect::clean(Decimal::ZERO));
            }
            let new_average =
                (quantity * average_cost + trade.quantity * trade.price) / new_quantity;
            (
                (new_quantity, new_average),
                TradeEffect::clean(Decimal::ZERO),
            )
        }
        TradeSide::Sell => {
            let (sold, issue) = if trade.quantity > quantity {
                (
                    quantity,
                    Some(format!(
                        "SELL of {} exceeds held quantity {}; holding clamped to zero",
                        trade.quantity, quantity
                    )),
                )
            } else {
                (trade.quantity, None)
            };
            let mut remaining = quantity - sold;
            if !is_quantity_significant(&remaining) {
                remaining = Decimal::ZERO;
            }
            let realized_pnl = sold * (trade.price - average_cost);
            (
                (remaining, average_cost),
                TradeEffect {
                    realized_pnl,
                    skipped: false,
                    issue,
                },
            )
        }
    }
}

#[derive(Debug, Clone)]
struct SymbolLedger {
    basis: CostBasisState,
    realized_pnl: Decimal,
    total_fees: Decimal,
    first_trade_at: DateTime<Utc>,
    last_trade_at: DateTime<Utc>,
}

impl SymbolLedger {
    fn opened_at(timestamp: DateTime<Utc>) -> Self {
        Self {
            basis: (Decimal::ZERO, Decimal::ZERO),
            realized_pnl: Decimal::ZERO,
            total_fees: Decimal::ZERO,
            first_trade_at: timestamp,
            last_trade_at: timestamp,
        }
    }
}

/// Accumulated per-symbol state after applying trades in order.
///
/// Build one with `Default`, feed it trades in chronological order and read
/// positions at any point. The equity curve replays the ledger through the same
/// fold one day at a time.
#[derive(Debug, Clone, Default)]
pub struct PositionLedger {
    symbols: BTreeMap<String, SymbolLedger>,
    warnings: Vec<CalculationWarning>,
}

impl PositionLedger {
    pub fn apply(&mut self, trade: &Trade) {
        let entry = self
            .symbols
            .entry(trade.symbol.clone())
            .or_insert_with(|| SymbolLedger::opened_at(trade.timestamp));

        let (next, effect) = apply_trade(entry.basis, trade);
        entry.basis = next;
        entry.realized_pnl += effect.realized_pnl;
        entry.last_trade_at = trade.timestamp;
        if !effect.skipped {
            entry.total_fees += trade.fee;
        }

        if let Some(message) = effect.issue {
            let warning = CalculationWarning::DataIntegrity {
                trade_id: trade.id.clone(),
                symbol: trade.symbol.clone(),
                timestamp: trade.timestamp,
                message,
            };
            warn!("{}", warning);
            self.warnings.push(warning);
        }
    }

    /// Quantity currently held for a symbol (zero if unknown).
    pub fn quantity(&self, symbol: &str) -> Decimal {
        self.symbols
            .get(symbol)
            .map(|s| s.basis.0)
            .unwrap_or(Decimal::ZERO)
    }

    /// Symbols with a significant holding and their quantities.
    pub fn holdings(&self) -> impl Iterator<Item = (&str, Decimal)> + '_ {
        self.symbols
            .iter()
            .filter(|(_, s)| s.basis.0 > Decimal::ZERO && is_quantity_significant(&s.basis.0))
            .map(|(symbol, s)| (symbol.as_str(), s.basis.0))
    }

    pub fn positions(&self) -> BTreeMap<String, Position> {
        self.symbols
            .iter()
            .filter(|(_, s)| s.basis.0 > Decimal::ZERO && is_quantity_significant(&s.basis.0))
            .map(|(symbol, s)| {
                let (quantity, average_cost) = s.basis;
                (
                    symbol.clone(),
                    Position {
                        symbol: symbol.clone(),
                        quantity,
                        average_cost,
                        total_cost_basis: quantity * average_cost,
                        realized_pnl: s.realized_pnl,
                        total_fees: s.total_fees,
                        first_trade_at: s.first_trade_at,
                        last_trade_at: s.last_trade_at,
                    },
                )
            })
            .collect()
    }

    /// Realized PnL per symbol, including fully closed positions.
    pub fn realized_pnl(&self) -> BTreeMap<String, Decimal> {
        self.symbols
            .iter()
            .map(|(symbol, s)| (symbol.clone(), s.realized_pnl))
            .collect()
    }

    pub fn warnings(&self) -> &[CalculationWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<CalculationWarning> {
        self.warnings
    }
}

/// Folds trades dated on or before `as_of` into positions.
///
/// Input order does not matter; trades are replayed chronologically with
/// same-timestamp trades kept in ingestion order.
pub fn build_positions(trades: &[Trade], as_of: NaiveDate) -> PositionsResult {
    let mut ordered: Vec<Trade> = trades.to_vec();
    sort_trades(&mut ordered);

    let ledger = ordered
        .iter()
        .filter(|t| t.trade_date() <= as_of)
        .fold(PositionLedger::default(), |mut ledger, trade| {
            ledger.apply(trade);
            ledger
        });

    let positions = ledger.positions();
    debug!(
        "Built {} positions from {} trades as of {}",
        positions.len(),
        trades.len(),
        as_of
    );

    PositionsResult {
        as_of: Some(as_of),
        positions,
        warnings: ledger.into_warnings(),
    }
}
