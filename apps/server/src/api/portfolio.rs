use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use cryptofolio_core::{
    cache::get_or_compute,
    charts::downsample,
    errors::CalculationWarning,
    portfolio::allocation::{AllocationEntry, Pnl, PositionSort, PositionSortField, SortDirection},
    portfolio::analytics::{EquityCurveReport, PortfolioSummary, PositionsView},
    trades::Portfolio,
};
use futures::future::{try_join, try_join_all};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    api::{query_date, run_blocking, today},
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

#[derive(Deserialize)]
pub struct AllocationQuery {
    pub as_of: Option<String>,
}

#[derive(Deserialize)]
pub struct PositionsQuery {
    pub as_of: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

#[derive(Deserialize)]
pub struct EquityCurveQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub include_stats: bool,
    pub max_points: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResponse {
    pub portfolio_id: String,
    pub as_of: NaiveDate,
    pub entries: Vec<AllocationEntry>,
    pub total_value: Decimal,
    pub total_cost_basis: Decimal,
    pub pnl: Pnl,
    pub warnings: Vec<CalculationWarning>,
    pub last_updated: NaiveDate,
}

async fn list_portfolios(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Portfolio>>> {
    let service = state.analytics_service.clone();
    let portfolios = run_blocking(move || service.list_portfolios()).await?;
    Ok(Json(portfolios))
}

async fn get_allocation(
    Path(id): Path<String>,
    Query(query): Query<AllocationQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<AllocationResponse>> {
    let as_of = query_date("as_of", query.as_of.as_deref())?.unwrap_or_else(today);
    let key = format!("portfolio:{}:allocation:{}", id, as_of);
    let service = state.analytics_service.clone();

    let response = get_or_compute(
        state.cache.as_ref(),
        &key,
        state.summary_cache_ttl,
        || async move {
            let portfolio_id = id.clone();
            let allocation =
                run_blocking(move || service.get_allocation(&portfolio_id, as_of)).await?;
            let pnl = allocation.pnl();
            Ok::<_, ApiError>(AllocationResponse {
                portfolio_id: id,
                as_of,
                entries: allocation.entries,
                total_value: allocation.total_value,
                total_cost_basis: allocation.total_cost_basis,
                pnl,
                warnings: allocation.warnings,
                last_updated: as_of,
            })
        },
    )
    .await?;
    Ok(Json(response))
}

fn parse_sort(query: &PositionsQuery) -> ApiResult<PositionSort> {
    let field = match query.sort_by.as_deref() {
        Some(raw) => raw.parse::<PositionSortField>().map_err(ApiError::BadRequest)?,
        None => PositionSortField::default(),
    };
    let direction = match query.order.as_deref() {
        Some(raw) => raw.parse::<SortDirection>().map_err(ApiError::BadRequest)?,
        None => SortDirection::default(),
    };
    Ok(PositionSort { field, direction })
}

async fn get_positions(
    Path(id): Path<String>,
    Query(query): Query<PositionsQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PositionsView>> {
    let as_of = query_date("as_of", query.as_of.as_deref())?.unwrap_or_else(today);
    let sort = parse_sort(&query)?;
    let service = state.analytics_service.clone();
    let view = run_blocking(move || service.get_positions(&id, as_of, sort)).await?;
    Ok(Json(view))
}

async fn get_equity_curve(
    Path(id): Path<String>,
    Query(query): Query<EquityCurveQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<EquityCurveReport>> {
    let today = today();
    let start_date = query_date("start_date", query.start_date.as_deref())?;
    let end_date = query_date("end_date", query.end_date.as_deref())?;
    let include_stats = query.include_stats;
    let max_points = query.max_points;
    if matches!(max_points, Some(target) if target < 2) {
        return Err(ApiError::BadRequest(
            "max_points must be at least 2".to_string(),
        ));
    }

    let key = format!(
        "portfolio:{}:equity-curve:{}:{}:{}:{}",
        id,
        start_date.map(|d| d.to_string()).unwrap_or_default(),
        end_date.unwrap_or(today),
        include_stats,
        max_points.unwrap_or_default()
    );
    let service = state.analytics_service.clone();

    let report = get_or_compute(
        state.cache.as_ref(),
        &key,
        state.snapshot_cache_ttl,
        || async move {
            let (start, end) = {
                let service = service.clone();
                let id = id.clone();
                run_blocking(move || service.resolve_range(&id, start_date, end_date, today))
                    .await?
            };

            let curve_task = {
                let service = service.clone();
                run_blocking(move || {
                    service.get_portfolio_curve(&id, Some(start), Some(end), today)
                })
            };

            let (mut curve, metrics) = if include_stats {
                let benchmark_tasks = service.benchmark_symbols().into_iter().map(|symbol| {
                    let service = service.clone();
                    run_blocking(move || {
                        service
                            .get_benchmark_curve(&symbol, start, end)
                            .map(|curve| (symbol, curve))
                    })
                });
                let (curve, benchmarks) =
                    try_join(curve_task, try_join_all(benchmark_tasks)).await?;
                let benchmarks: BTreeMap<_, _> = benchmarks.into_iter().collect();
                let metrics = service.metrics_for(&curve, &benchmarks);
                (curve, Some(metrics))
            } else {
                (curve_task.await?, None)
            };

            if let Some(target) = max_points {
                curve.points = downsample(&curve.points, target);
            }
            Ok::<_, ApiError>(EquityCurveReport { curve, metrics })
        },
    )
    .await?;
    Ok(Json(report))
}

async fn get_summary(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PortfolioSummary>> {
    let today = today();
    let key = format!("portfolio:{}:summary:{}", id, today);
    let service = state.analytics_service.clone();

    let summary = get_or_compute(
        state.cache.as_ref(),
        &key,
        state.summary_cache_ttl,
        || async move { run_blocking(move || service.get_summary(&id, today)).await },
    )
    .await?;
    Ok(Json(summary))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/portfolios", get(list_portfolios))
        .route("/portfolios/{id}/allocation", get(get_allocation))
        .route("/portfolios/{id}/positions", get(get_positions))
        .route("/portfolios/{id}/equity-curve", get(get_equity_curve))
        .route("/portfolios/{id}/summary", get(get_summary))
}
