use crate::portfolio::equity_curve::EquityCurvePoint;
use crate::portfolio::performance::{
    cagr, compute_metrics, daily_returns, max_drawdown, sharpe_ratio, total_return,
    volatility, ytd_return, MetricsOptions,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

fn curve_from(start: NaiveDate, values: &[Decimal]) -> Vec<EquityCurvePoint> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| EquityCurvePoint::new(start + chrono::Duration::days(i as i64), *v))
        .collect()
}

fn jan(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

#[test]
fn test_max_drawdown_tracks_peak_and_trough() {
    let curve = curve_from(jan(1), &[dec!(100), dec!(120), dec!(90), dec!(150)]);
    let dd = max_drawdown(&curve);
    assert_eq!(dd.percent, dec!(-25));
    assert_eq!(dd.peak_date, Some(jan(2)));
    assert_eq!(dd.trough_date, Some(jan(3)));
}

#[test]
fn test_max_drawdown_uses_deepest_trough_not_first_dip() {
    let curve = curve_from(
        jan(1),
        &[dec!(100), dec!(95), dec!(80), dec!(90), dec!(70), dec!(110)],
    );
    let dd = max_drawdown(&curve);
    assert_eq!(dd.percent, dec!(-30));
    assert_eq!(dd.peak_date, Some(jan(1)));
    assert_eq!(dd.trough_date, Some(jan(5)));
}

#[test]
fn test_rising_curve_has_no_drawdown() {
    let curve = curve_from(jan(1), &[dec!(1), dec!(2), dec!(3)]);
    let dd = max_drawdown(&curve);
    assert_eq!(dd.percent, Decimal::ZERO);
    assert_eq!(dd.peak_date, None);
    assert_eq!(dd.trough_date, None);
}

#[test]
fn test_daily_returns_skip_zero_base() {
    let curve = curve_from(jan(1), &[dec!(0), dec!(100), dec!(110), dec!(0), dec!(50)]);
    let returns = daily_returns(&curve);
    assert_eq!(returns, vec![dec!(0.1), dec!(-1)]);
}

#[test]
fn test_volatility_and_sharpe_need_two_returns() {
    assert_eq!(volatility(&[], false), Decimal::ZERO);
    assert_eq!(volatility(&[dec!(0.1)], false), Decimal::ZERO);
    assert_eq!(sharpe_ratio(&[dec!(0.1)], Decimal::ZERO, false), Decimal::ZERO);
}

#[test]
fn test_flat_returns_have_zero_sharpe() {
    let returns = vec![dec!(0.01), dec!(0.01), dec!(0.01)];
    assert_eq!(volatility(&returns, false), Decimal::ZERO);
    assert_eq!(sharpe_ratio(&returns, Decimal::ZERO, false), Decimal::ZERO);
}

#[test]
fn test_volatility_is_sample_stdev_in_percent() {
    // mean 0.02, deviations +-0.01, sample variance 0.0002, stdev ~0.014142
    let returns = vec![dec!(0.01), dec!(0.03)];
    let vol = volatility(&returns, false);
    assert!((vol - dec!(1.41421356)).abs() < dec!(0.0001), "{}", vol);

    let sharpe = sharpe_ratio(&returns, Decimal::ZERO, false);
    assert!((sharpe - dec!(1.41421356)).abs() < dec!(0.0001), "{}", sharpe);

    let annual = volatility(&returns, true);
    // sqrt(365) ~ 19.1049
    assert!((annual - dec!(27.0185)).abs() < dec!(0.01), "{}", annual);
}

#[test]
fn test_cagr_over_one_year() {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let curve = vec![
        EquityCurvePoint::new(start, dec!(100)),
        EquityCurvePoint::new(end, dec!(121)),
    ];
    assert!((cagr(&curve) - dec!(21)).abs() < dec!(0.01));
}

#[test]
fn test_cagr_degenerate_cases() {
    assert_eq!(cagr(&[]), Decimal::ZERO);
    let single = curve_from(jan(1), &[dec!(100)]);
    assert_eq!(cagr(&single), Decimal::ZERO);
    let zero_start = curve_from(jan(1), &[dec!(0), dec!(100)]);
    assert_eq!(cagr(&zero_start), Decimal::ZERO);
    let wiped = curve_from(jan(1), &[dec!(100), dec!(0)]);
    assert_eq!(cagr(&wiped), dec!(-100));
}

#[test]
fn test_cagr_saturates_instead_of_reading_flat() {
    let doubled_overnight = curve_from(jan(1), &[dec!(100), dec!(200)]);
    assert_eq!(cagr(&doubled_overnight), Decimal::MAX);

    let halved_overnight = curve_from(jan(1), &[dec!(100), dec!(50)]);
    let shrink = cagr(&halved_overnight);
    assert!(shrink < Decimal::ZERO && shrink >= dec!(-100));
}

#[test]
fn test_ytd_uses_first_point_of_year() {
    let curve = curve_from(
        NaiveDate::from_ymd_opt(2023, 12, 30).unwrap(),
        &[dec!(50), dec!(80), dec!(100), dec!(110), dec!(125)],
    );
    assert_eq!(ytd_return(&curve, 2024), dec!(25));
    assert_eq!(total_return(&curve), dec!(150));
    // no point inside the year
    assert_eq!(ytd_return(&curve, 2025), Decimal::ZERO);
}

#[test]
fn test_compute_metrics_on_empty_curve() {
    let metrics = compute_metrics(&[], &BTreeMap::new(), &MetricsOptions::default());
    assert_eq!(metrics.volatility_percent, Decimal::ZERO);
    assert_eq!(metrics.max_drawdown_percent, Decimal::ZERO);
    assert_eq!(metrics.cagr_percent, Decimal::ZERO);
    assert_eq!(metrics.sharpe_ratio, Decimal::ZERO);
    assert_eq!(metrics.ytd_return_percent, Decimal::ZERO);
}

#[test]
fn test_compute_metrics_is_deterministic() {
    let curve = curve_from(
        jan(1),
        &[dec!(100), dec!(104.5), dec!(99.1), dec!(130), dec!(128.7), dec!(140)],
    );
    let options = MetricsOptions::default();
    let first = compute_metrics(&curve, &BTreeMap::new(), &options);
    let second = compute_metrics(&curve, &BTreeMap::new(), &options);
    assert_eq!(first, second);
}

#[test]
fn test_benchmark_comparison() {
    let portfolio = curve_from(jan(1), &[dec!(100), dec!(110), dec!(130)]);
    let mut benchmarks = BTreeMap::new();
    benchmarks.insert(
        "BTC".to_string(),
        curve_from(jan(1), &[dec!(40000), dec!(42000), dec!(44000)]),
    );
    let metrics = compute_metrics(&portfolio, &benchmarks, &MetricsOptions::default());

    assert_eq!(metrics.ytd_return_percent, dec!(30));
    assert_eq!(metrics.benchmarks.len(), 1);
    let btc = &metrics.benchmarks[0];
    assert_eq!(btc.name, "BTC");
    assert_eq!(btc.ytd_return_percent, dec!(10));
    assert_eq!(btc.total_return_percent, dec!(10));
    assert_eq!(btc.excess_ytd_percent, dec!(20));
}
