//! Risk statistics over an equity curve.
//!
//! All arithmetic stays in `Decimal`. Every division, square root and power is
//! guarded and falls back to zero, so degenerate curves (empty, flat, starting
//! at zero) yield defined values instead of errors.

use chrono::{Datelike, NaiveDate};
use log::debug;
use rust_decimal::prelude::*;
use std::collections::BTreeMap;

use super::{BenchmarkComparison, Drawdown, MetricsOptions, RiskMetrics};
use crate::constants::{DAYS_PER_YEAR, DECIMAL_PRECISION};
use crate::portfolio::equity_curve::EquityCurvePoint;

/// Derives the full metric set for `curve`, plus a comparison against each
/// benchmark curve keyed by name.
pub fn compute_metrics(
    curve: &[EquityCurvePoint],
    benchmark_curves: &BTreeMap<String, Vec<EquityCurvePoint>>,
    options: &MetricsOptions,
) -> RiskMetrics {
    let returns = daily_returns(curve);
    let drawdown = max_drawdown(curve);
    let ytd_year = options
        .ytd_year
        .or_else(|| curve.last().map(|p| p.date.year()));
    let ytd_return_percent = ytd_year
        .map(|year| ytd_return(curve, year))
        .unwrap_or(Decimal::ZERO);

    let benchmarks = benchmark_curves
        .iter()
        .map(|(name, bench)| {
            let bench_ytd = ytd_year
                .map(|year| ytd_return(bench, year))
                .unwrap_or(Decimal::ZERO);
            BenchmarkComparison {
                name: name.clone(),
                ytd_return_percent: bench_ytd,
                total_return_percent: total_return(bench),
                excess_ytd_percent: ytd_return_percent - bench_ytd,
            }
        })
        .collect();

    debug!(
        "Computed metrics over {} points ({} usable returns)",
        curve.len(),
        returns.len()
    );

    RiskMetrics {
        volatility_percent: volatility(&returns, options.annualize),
        max_drawdown_percent: drawdown.percent,
        max_drawdown_from_date: drawdown.peak_date,
        max_drawdown_to_date: drawdown.trough_date,
        cagr_percent: cagr(curve),
        sharpe_ratio: sharpe_ratio(&returns, options.risk_free_rate, options.annualize),
        ytd_return_percent,
        total_return_percent: total_return(curve),
        benchmarks,
    }
}

/// Simple day-over-day returns as fractions.
///
/// Days whose previous value is zero (or negative) are skipped, not zero-filled.
pub fn daily_returns(curve: &[EquityCurvePoint]) -> Vec<Decimal> {
    curve
        .windows(2)
        .filter_map(|pair| {
            let prev = pair[0].total_value;
            if prev <= Decimal::ZERO {
                return None;
            }
            (pair[1].total_value - prev).checked_div(prev)
        })
        .collect()
}

/// Standard deviation of `returns` in percent. Zero with fewer than two returns.
pub fn volatility(returns: &[Decimal], annualize: bool) -> Decimal {
    let Some(stdev) = sample_stdev(returns) else {
        return Decimal::ZERO;
    };
    let scaled = if annualize {
        stdev.checked_mul(annualization_factor())
    } else {
        Some(stdev)
    };
    scaled
        .and_then(|v| v.checked_mul(Decimal::ONE_HUNDRED))
        .map(round)
        .unwrap_or(Decimal::ZERO)
}

/// `(mean - risk_free) / stdev`, zero when the deviation is zero or undefined.
pub fn sharpe_ratio(returns: &[Decimal], risk_free_rate: Decimal, annualize: bool) -> Decimal {
    let (Some(mean), Some(stdev)) = (mean(returns), sample_stdev(returns)) else {
        return Decimal::ZERO;
    };
    if stdev.is_zero() {
        return Decimal::ZERO;
    }
    let ratio = (mean - risk_free_rate).checked_div(stdev);
    let ratio = if annualize {
        ratio.and_then(|r| r.checked_mul(annualization_factor()))
    } else {
        ratio
    };
    ratio.map(round).unwrap_or(Decimal::ZERO)
}

/// Largest decline from a running peak.
///
/// The peak date is the date of the peak preceding the deepest trough, and the
/// trough date is the point realizing the minimum.
pub fn max_drawdown(curve: &[EquityCurvePoint]) -> Drawdown {
    let Some(first) = curve.first() else {
        return Drawdown::default();
    };

    let mut peak = first.total_value;
    let mut peak_date = first.date;
    let mut worst = Drawdown::default();

    for point in curve {
        if point.total_value > peak {
            peak = point.total_value;
            peak_date = point.date;
        }
        if peak <= Decimal::ZERO {
            continue;
        }
        let Some(dd) = (point.total_value - peak).checked_div(peak) else {
            continue;
        };
        if dd < worst.percent {
            worst = Drawdown {
                percent: dd,
                peak_date: Some(peak_date),
                trough_date: Some(point.date),
            };
        }
    }

    worst.percent = round(worst.percent * Decimal::ONE_HUNDRED);
    worst
}

/// Compound annual growth rate in percent.
///
/// Zero when the starting value is not positive or no time has elapsed. A
/// curve ending at or below zero reports -100. A rate too steep to annualize
/// in `Decimal` saturates: `Decimal::MAX` for growth (doubling in a day, say)
/// and -100 for decline.
pub fn cagr(curve: &[EquityCurvePoint]) -> Decimal {
    let (Some(first), Some(last)) = (curve.first(), curve.last()) else {
        return Decimal::ZERO;
    };
    let days = (last.date - first.date).num_days();
    if first.total_value <= Decimal::ZERO || days <= 0 {
        return Decimal::ZERO;
    }
    if last.total_value <= Decimal::ZERO {
        return -Decimal::ONE_HUNDRED;
    }

    let Some(ratio) = last.total_value.checked_div(first.total_value) else {
        return Decimal::MAX;
    };
    let exponent = Decimal::from(DAYS_PER_YEAR) / Decimal::from(days);
    let annualized = ratio
        .checked_powd(exponent)
        .and_then(|growth| (growth - Decimal::ONE).checked_mul(Decimal::ONE_HUNDRED));
    match annualized {
        Some(percent) => round(percent),
        None if ratio > Decimal::ONE => Decimal::MAX,
        None if ratio < Decimal::ONE => -Decimal::ONE_HUNDRED,
        None => Decimal::ZERO,
    }
}

/// Change from the first point on or after January 1 of `year` to the last point.
pub fn ytd_return(curve: &[EquityCurvePoint], year: i32) -> Decimal {
    let Some(jan_first) = NaiveDate::from_ymd_opt(year, 1, 1) else {
        return Decimal::ZERO;
    };
    let (Some(base), Some(last)) = (
        curve.iter().find(|p| p.date >= jan_first),
        curve.last(),
    ) else {
        return Decimal::ZERO;
    };
    percent_change(base.total_value, last.total_value)
}

/// Change from the first to the last point.
pub fn total_return(curve: &[EquityCurvePoint]) -> Decimal {
    match (curve.first(), curve.last()) {
        (Some(first), Some(last)) => percent_change(first.total_value, last.total_value),
        _ => Decimal::ZERO,
    }
}

fn percent_change(from: Decimal, to: Decimal) -> Decimal {
    if from <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (to - from)
        .checked_div(from)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .map(round)
        .unwrap_or(Decimal::ZERO)
}

fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let sum = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))?;
    sum.checked_div(Decimal::from(values.len()))
}

/// Sample standard deviation (n - 1 denominator). `None` below two values.
fn sample_stdev(values: &[Decimal]) -> Option<Decimal> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let sum_sq = values.iter().try_fold(Decimal::ZERO, |acc, v| {
        let diff = *v - mean;
        acc.checked_add(diff.checked_mul(diff)?)
    })?;
    sum_sq
        .checked_div(Decimal::from(values.len() - 1))?
        .sqrt()
}

fn annualization_factor() -> Decimal {
    Decimal::from(DAYS_PER_YEAR).sqrt().unwrap_or(Decimal::ONE)
}

fn round(value: Decimal) -> Decimal {
    value.round_dp(DECIMAL_PRECISION)
}
