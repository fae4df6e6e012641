use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::{DcaRequest, PairLeg};
use crate::errors::{Result, ValidationError};

/// Weekly amount used by every canned plan.
pub const PRESET_AMOUNT: Decimal = dec!(100);
pub const PRESET_INTERVAL_DAYS: i64 = 7;
/// Range used when a preset is run without explicit dates.
pub const PRESET_DEFAULT_LOOKBACK_DAYS: i64 = 365;

/// A canned DCA plan.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DcaPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub asset: &'static str,
    /// `(asset, weight percent)` of the second leg.
    pub pair: Option<(&'static str, Decimal)>,
    pub amount: Decimal,
    pub interval: i64,
}

pub const DCA_PRESETS: &[DcaPreset] = &[
    DcaPreset {
        id: "btc-100",
        name: "100% BTC",
        asset: "BTC",
        pair: None,
        amount: PRESET_AMOUNT,
        interval: PRESET_INTERVAL_DAYS,
    },
    DcaPreset {
        id: "eth-100",
        name: "100% ETH",
        asset: "ETH",
        pair: None,
        amount: PRESET_AMOUNT,
        interval: PRESET_INTERVAL_DAYS,
    },
    DcaPreset {
        id: "btc-eth-70-30",
        name: "70% BTC / 30% ETH",
        asset: "BTC",
        pair: Some(("ETH", dec!(30))),
        amount: PRESET_AMOUNT,
        interval: PRESET_INTERVAL_DAYS,
    },
    DcaPreset {
        id: "btc-eth-50-50",
        name: "50% BTC / 50% ETH",
        asset: "BTC",
        pair: Some(("ETH", dec!(50))),
        amount: PRESET_AMOUNT,
        interval: PRESET_INTERVAL_DAYS,
    },
];

pub fn find_preset(id: &str) -> Result<&'static DcaPreset> {
    DCA_PRESETS
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(id.trim()))
        .ok_or_else(|| ValidationError::UnknownPreset(id.to_string()).into())
}

impl DcaPreset {
    /// Turns the preset into a request. Missing bounds default to the year
    /// ending `today`.
    pub fn to_request(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> DcaRequest {
        let end_date = end_date.unwrap_or(today);
        let start_date =
            start_date.unwrap_or(end_date - Duration::days(PRESET_DEFAULT_LOOKBACK_DAYS));
        DcaRequest {
            start_date,
            end_date,
            amount: self.amount,
            interval: self.interval,
            asset: self.asset.to_string(),
            pair: self.pair.map(|(asset, weight)| PairLeg {
                asset: asset.to_string(),
                weight,
            }),
        }
    }
}
