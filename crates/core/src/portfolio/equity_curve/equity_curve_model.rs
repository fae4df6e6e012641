use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::CalculationWarning;

/// Total portfolio value at the end of a calendar day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EquityCurvePoint {
    pub date: NaiveDate,
    pub total_value: Decimal,
}

impl EquityCurvePoint {
    pub fn new(date: NaiveDate, total_value: Decimal) -> Self {
        Self { date, total_value }
    }
}

/// One point per calendar day in `[start_date, end_date]`, ascending, no gaps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EquityCurve {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub points: Vec<EquityCurvePoint>,
    #[serde(default)]
    pub warnings: Vec<CalculationWarning>,
}

impl EquityCurve {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&EquityCurvePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&EquityCurvePoint> {
        self.points.last()
    }

    pub fn values(&self) -> Vec<Decimal> {
        self.points.iter().map(|p| p.total_value).collect()
    }
}
