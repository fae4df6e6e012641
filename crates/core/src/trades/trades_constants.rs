/// Trade side wire values
pub const TRADE_SIDE_BUY: &str = "BUY";
pub const TRADE_SIDE_SELL: &str = "SELL";
