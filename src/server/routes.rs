//! API route handlers

use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::AppState;
use crate::levels::{self, SeverityLevel};
use crate::lookup;
use crate::model::{AqiError, AqiReport, HistoryReport};

// Parameters arrive as raw strings so validation errors come back as our own
// InvalidInput bodies instead of axum's query rejection.

#[derive(Debug, Deserialize)]
pub struct CoordinateParams {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub days: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClassifyParams {
    pub aqi: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub level: &'static SeverityLevel,
    pub levels: &'static [SeverityLevel],
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "observations": state.store.len(),
        "capacity": state.store.capacity(),
    }))
}

pub async fn aqi(
    State(state): State<AppState>,
    Query(params): Query<CoordinateParams>,
) -> Result<Json<AqiReport>, AqiError> {
    let latitude = lookup::parse_latitude(params.lat.as_deref())?;
    let longitude = lookup::parse_longitude(params.lon.as_deref())?;
    let report = lookup::lookup(state.provider.as_ref(), &state.store, latitude, longitude).await?;
    Ok(Json(report))
}

pub async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryReport>, AqiError> {
    let days = lookup::parse_days(
        params.days.as_deref(),
        state.history.default_days,
        state.history.max_days,
    )?;
    Ok(Json(lookup::history(&state.store, days)))
}

pub async fn levels() -> Json<&'static [SeverityLevel]> {
    Json(levels::all_levels())
}

pub async fn classify(Query(params): Query<ClassifyParams>) -> Result<Json<ClassifyResponse>, AqiError> {
    let aqi = lookup::parse_aqi(params.aqi.as_deref())?;
    Ok(Json(ClassifyResponse {
        level: levels::classify(aqi),
        levels: levels::all_levels(),
    }))
}
