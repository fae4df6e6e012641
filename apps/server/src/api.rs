use std::sync::Arc;

use axum::{routing::get, Json, Router};
use chrono::{NaiveDate, Utc};
use cryptofolio_core::utils::time_utils::parse_optional_date;
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

pub mod portfolio;
pub mod simulations;

pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// The calendar day requests are evaluated against.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parses an optional `YYYY-MM-DD` query value into a 400 on failure.
pub(crate) fn query_date(name: &str, value: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    parse_optional_date(value)
        .map_err(|e| ApiError::BadRequest(format!("Invalid {}: {}", name, e)))
}

/// Runs a synchronous engine call off the async workers.
pub(crate) async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> cryptofolio_core::Result<T> + Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    let api = Router::new()
        .route("/healthz", get(healthz))
        .merge(portfolio::router())
        .merge(simulations::router());

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .layer(cors)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
