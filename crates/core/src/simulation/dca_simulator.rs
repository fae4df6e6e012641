//! DCA versus lump-sum simulation.

use chrono::{Duration, NaiveDate};
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use super::{
    find_preset, AssetWeight, DcaDailyPoint, DcaPurchase, DcaRequest, DcaResult, PurchaseLeg,
    StrategyStats,
};
use crate::config::AnalyticsConfig;
use crate::constants::DECIMAL_PRECISION;
use crate::errors::{CalculationWarning, CalculatorError, Result, ValidationError};
use crate::market_data::{PriceIndex, PricePolicy};
use crate::portfolio::allocation::Pnl;
use crate::portfolio::equity_curve::EquityCurvePoint;
use crate::portfolio::performance::{cagr, daily_returns, max_drawdown, volatility};
use crate::trades::normalize_symbol;
use crate::utils::time_utils::{get_days_between, validate_date_range};

/// Runs DCA simulations against an injected price index.
pub struct DcaSimulator {
    price_index: Arc<dyn PriceIndex>,
    config: AnalyticsConfig,
}

impl DcaSimulator {
    pub fn new(price_index: Arc<dyn PriceIndex>, config: AnalyticsConfig) -> Self {
        Self {
            price_index,
            config,
        }
    }

    pub fn simulate(&self, request: &DcaRequest, today: NaiveDate) -> Result<DcaResult> {
        simulate_dca(request, self.price_index.as_ref(), today, &self.config)
    }

    pub fn run_preset(
        &self,
        preset_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<DcaResult> {
        let preset = find_preset(preset_id)?;
        let request = preset.to_request(start_date, end_date, today);
        self.simulate(&request, today)
    }
}

/// Checks a request and resolves its asset weights.
///
/// Runs before any price lookup so bad input never reaches the price index.
pub fn validate_request(
    request: &DcaRequest,
    today: NaiveDate,
    config: &AnalyticsConfig,
) -> Result<Vec<AssetWeight>> {
    if request.amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount(request.amount).into());
    }
    if request.interval < 1 || Duration::try_days(request.interval).is_none() {
        return Err(ValidationError::InvalidInterval(request.interval).into());
    }
    if matches!(config.max_range_days, Some(max) if request.interval > max) {
        return Err(ValidationError::InvalidInterval(request.interval).into());
    }
    validate_date_range(request.start_date, request.end_date, config.max_range_days)?;
    if request.end_date > today {
        return Err(ValidationError::FutureEndDate {
            end: request.end_date,
            today,
        }
        .into());
    }

    let primary = normalize_symbol(&request.asset);
    if !config.is_supported_asset(&primary) {
        return Err(ValidationError::UnsupportedAsset(request.asset.clone()).into());
    }

    let Some(pair) = &request.pair else {
        return Ok(vec![AssetWeight {
            symbol: primary,
            fraction: Decimal::ONE,
        }]);
    };

    let secondary = normalize_symbol(&pair.asset);
    if !config.is_supported_asset(&secondary) {
        return Err(ValidationError::UnsupportedAsset(pair.asset.clone()).into());
    }
    if secondary == primary {
        return Err(ValidationError::InvalidWeights(format!(
            "Pair asset must differ from {}",
            primary
        ))
        .into());
    }
    if pair.weight <= Decimal::ZERO || pair.weight >= Decimal::ONE_HUNDRED {
        return Err(ValidationError::InvalidWeights(format!(
            "Pair weight must be between 0 and 100 exclusive, got {}",
            pair.weight
        ))
        .into());
    }

    let secondary_fraction = pair.weight / Decimal::ONE_HUNDRED;
    Ok(vec![
        AssetWeight {
            symbol: primary,
            fraction: Decimal::ONE - secondary_fraction,
        },
        AssetWeight {
            symbol: secondary,
            fraction: secondary_fraction,
        },
    ])
}

/// `start + k * interval` for every k that stays within `end`.
pub fn purchase_dates(start: NaiveDate, end: NaiveDate, interval_days: i64) -> Vec<NaiveDate> {
    if interval_days < 1 || start > end {
        return Vec::new();
    }
    // A step too large for chrono still yields the first purchase.
    let step = Duration::try_days(interval_days);
    let mut dates = Vec::new();
    let mut current = start;
    while current <= end {
        dates.push(current);
        match step.and_then(|step| current.checked_add_signed(step)) {
            Some(next) => current = next,
            None => break,
        }
    }
    dates
}

/// Simulates buying `amount` every `interval` days against buying
/// `amount * purchase_count` once on the start date, revaluing both daily.
///
/// A purchase date with no usable price for one of its assets fails the whole
/// simulation with `MissingPriceData`.
pub fn simulate_dca(
    request: &DcaRequest,
    price_index: &dyn PriceIndex,
    today: NaiveDate,
    config: &AnalyticsConfig,
) -> Result<DcaResult> {
    let weights = validate_request(request, today, config)?;
    let policy = config.price_policy();
    let dates = purchase_dates(request.start_date, request.end_date, request.interval);

    let mut purchases: Vec<DcaPurchase> = Vec::with_capacity(dates.len());
    for date in &dates {
        let legs = weights
            .iter()
            .map(|w| -> Result<PurchaseLeg> {
                let price = purchase_price(price_index, &w.symbol, *date, &policy)?;
                let amount = checked(request.amount.checked_mul(w.fraction), "purchase amount")?;
                let units = checked(amount.checked_div(price), "units bought")?;
                Ok(PurchaseLeg {
                    symbol: w.symbol.clone(),
                    amount,
                    price,
                    units,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        purchases.push(DcaPurchase { date: *date, legs });
    }

    let purchase_count = purchases.len();
    let total_invested = checked(
        request.amount.checked_mul(Decimal::from(purchase_count)),
        "total invested",
    )?;

    // Lump sum at the first purchase's prices.
    let hodl_units: BTreeMap<String, Decimal> = match purchases.first() {
        Some(first) => first
            .legs
            .iter()
            .map(|leg| -> Result<(String, Decimal)> {
                let lump = checked(
                    total_invested.checked_mul(weight_of(&weights, &leg.symbol)),
                    "lump sum",
                )?;
                let units = checked(lump.checked_div(leg.price), "lump sum units")?;
                Ok((leg.symbol.clone(), units))
            })
            .collect::<Result<_>>()?,
        None => BTreeMap::new(),
    };

    let mut last_price: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut dca_units: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut missing_reported: HashSet<String> = HashSet::new();
    let mut warnings: Vec<CalculationWarning> = Vec::new();
    let mut next_purchase = 0usize;
    let mut daily_data: Vec<DcaDailyPoint> = Vec::new();

    for day in get_days_between(request.start_date, request.end_date) {
        while next_purchase < purchases.len() && purchases[next_purchase].date <= day {
            for leg in &purchases[next_purchase].legs {
                let held = dca_units.entry(leg.symbol.clone()).or_insert(Decimal::ZERO);
                *held = checked(held.checked_add(leg.units), "accumulated units")?;
                last_price.insert(leg.symbol.clone(), leg.price);
            }
            next_purchase += 1;
        }

        for w in &weights {
            match price_index.price_as_of(&w.symbol, day, &policy) {
                Some(lookup) => {
                    last_price.insert(w.symbol.clone(), lookup.price);
                }
                None => {
                    if last_price.contains_key(&w.symbol)
                        && missing_reported.insert(w.symbol.clone())
                    {
                        let warning = CalculationWarning::MissingPrice {
                            symbol: w.symbol.clone(),
                            date: day,
                        };
                        warn!("DCA simulation: {}. Carrying last price forward.", warning);
                        warnings.push(warning);
                    }
                }
            }
        }

        daily_data.push(DcaDailyPoint {
            date: day,
            dca_value: value_units(&dca_units, &last_price)?,
            hodl_value: value_units(&hodl_units, &last_price)?,
        });
    }

    let dca_curve: Vec<EquityCurvePoint> = daily_data
        .iter()
        .map(|p| EquityCurvePoint::new(p.date, p.dca_value))
        .collect();
    let hodl_curve: Vec<EquityCurvePoint> = daily_data
        .iter()
        .map(|p| EquityCurvePoint::new(p.date, p.hodl_value))
        .collect();

    debug!(
        "DCA {:?} {}..{}: {} purchases, {} invested",
        weights.iter().map(|w| w.symbol.as_str()).collect::<Vec<_>>(),
        request.start_date,
        request.end_date,
        purchase_count,
        total_invested
    );

    Ok(DcaResult {
        start_date: request.start_date,
        end_date: request.end_date,
        assets: weights,
        total_invested,
        purchase_count,
        dca: strategy_stats(&dca_curve, total_invested, dca_units, config.annualize_volatility),
        hodl: strategy_stats(
            &hodl_curve,
            total_invested,
            hodl_units,
            config.annualize_volatility,
        ),
        daily_data,
        purchases,
        warnings,
    })
}

fn purchase_price(
    price_index: &dyn PriceIndex,
    symbol: &str,
    date: NaiveDate,
    policy: &PricePolicy,
) -> Result<Decimal> {
    match price_index.price_as_of(symbol, date, policy) {
        Some(lookup) if lookup.price > Decimal::ZERO => Ok(lookup.price),
        _ => Err(CalculatorError::MissingPriceData {
            symbol: symbol.to_string(),
            date,
        }
        .into()),
    }
}

fn weight_of(weights: &[AssetWeight], symbol: &str) -> Decimal {
    weights
        .iter()
        .find(|w| w.symbol == symbol)
        .map(|w| w.fraction)
        .unwrap_or(Decimal::ZERO)
}

fn value_units(
    units: &BTreeMap<String, Decimal>,
    prices: &BTreeMap<String, Decimal>,
) -> Result<Decimal> {
    let total = units
        .iter()
        .filter_map(|(symbol, qty)| prices.get(symbol).map(|price| qty.checked_mul(*price)))
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value?));
    Ok(checked(total, "holding value")?.round_dp(DECIMAL_PRECISION))
}

/// Maps an overflowed Decimal step to a validation error on the request.
fn checked(value: Option<Decimal>, what: &str) -> Result<Decimal> {
    value.ok_or_else(|| {
        ValidationError::InvalidInput(format!("{} overflows for this amount", what)).into()
    })
}

fn strategy_stats(
    curve: &[EquityCurvePoint],
    invested: Decimal,
    holdings: BTreeMap<String, Decimal>,
    annualize: bool,
) -> StrategyStats {
    let total_value = curve.last().map(|p| p.total_value).unwrap_or(Decimal::ZERO);
    StrategyStats {
        total_value,
        pnl: Pnl::from_values(total_value, invested),
        cagr: cagr(curve),
        max_drawdown: max_drawdown(curve).percent,
        volatility: volatility(&daily_returns(curve), annualize),
        holdings,
    }
}
