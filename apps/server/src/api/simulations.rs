use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use cryptofolio_core::{
    cache::get_or_compute,
    charts::downsample,
    simulation::{DcaPreset, DcaRequest, DcaResult, PairLeg, DCA_PRESETS},
    utils::time_utils::parse_date,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    api::{query_date, run_blocking, today},
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

/// Dates arrive as strings so a malformed one is reported by name.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcaSimulationBody {
    pub start_date: String,
    pub end_date: String,
    pub amount: Decimal,
    pub interval: i64,
    pub asset: String,
    #[serde(default)]
    pub pair: Option<PairLeg>,
    pub max_points: Option<usize>,
}

#[derive(Deserialize)]
pub struct PresetQuery {
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    #[serde(rename = "maxPoints")]
    pub max_points: Option<usize>,
}

fn body_date(name: &str, value: &str) -> ApiResult<chrono::NaiveDate> {
    parse_date(value).map_err(|e| ApiError::BadRequest(format!("Invalid {}: {}", name, e)))
}

fn check_max_points(max_points: Option<usize>) -> ApiResult<()> {
    // Downsampling keeps both endpoints.
    if matches!(max_points, Some(target) if target < 2) {
        return Err(ApiError::BadRequest("maxPoints must be at least 2".to_string()));
    }
    Ok(())
}

fn apply_max_points(mut result: DcaResult, max_points: Option<usize>) -> DcaResult {
    if let Some(target) = max_points {
        result.daily_data = downsample(&result.daily_data, target);
    }
    result
}

async fn simulate_dca(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DcaSimulationBody>, JsonRejection>,
) -> ApiResult<Json<DcaResult>> {
    let Json(body) = body?;
    check_max_points(body.max_points)?;
    let request = DcaRequest {
        start_date: body_date("startDate", &body.start_date)?,
        end_date: body_date("endDate", &body.end_date)?,
        amount: body.amount,
        interval: body.interval,
        asset: body.asset,
        pair: body.pair,
    };

    let today = today();
    let simulator = state.dca_simulator.clone();
    let result = run_blocking(move || simulator.simulate(&request, today)).await?;
    tracing::debug!(
        "DCA simulation finished: {} purchases, {} invested",
        result.purchase_count,
        result.total_invested
    );
    Ok(Json(apply_max_points(result, body.max_points)))
}

async fn list_presets() -> Json<&'static [DcaPreset]> {
    Json(DCA_PRESETS)
}

async fn run_preset(
    Path(preset_id): Path<String>,
    Query(query): Query<PresetQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DcaResult>> {
    let start_date = query_date("startDate", query.start_date.as_deref())?;
    let end_date = query_date("endDate", query.end_date.as_deref())?;
    check_max_points(query.max_points)?;

    let today = today();
    let key = format!(
        "simulation:preset:{}:{}:{}:{}",
        preset_id.to_lowercase(),
        start_date.map(|d| d.to_string()).unwrap_or_default(),
        end_date.unwrap_or(today),
        today
    );
    let simulator = state.dca_simulator.clone();

    let result = get_or_compute(
        state.cache.as_ref(),
        &key,
        state.summary_cache_ttl,
        || async move {
            run_blocking(move || simulator.run_preset(&preset_id, start_date, end_date, today))
                .await
        },
    )
    .await?;
    Ok(Json(apply_max_points(result, query.max_points)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/simulations/dca", post(simulate_dca))
        .route("/simulations/presets", get(list_presets))
        .route("/simulations/presets/{preset_id}", get(run_preset))
}
