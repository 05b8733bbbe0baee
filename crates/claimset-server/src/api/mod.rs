//! Read-only claims API consumed by the front-end.
//!
//! - `GET  /v1/metrics/:id?format=&location=`
//! - `GET  /v1/content/:id?variant=&location=`
//! - `POST /v1/render`
//!
//! Unknown ids are not errors: they render as `"N/A"` or `""`.

mod error;

pub use error::ApiError;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use claimset_core::error::ClaimsError;
use claimset_core::DisplayFormat;

use crate::app_state::AppState;

const DEFAULT_LOCATION: &str = "api";

#[derive(Debug, Deserialize)]
pub struct MetricQuery {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MetricResponse {
    pub id: String,
    pub value: String,
    pub fresh: bool,
}

pub async fn get_metric(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<MetricQuery>,
) -> Json<MetricResponse> {
    let claims = state.claims();
    let location = q.location.as_deref().unwrap_or(DEFAULT_LOCATION);
    let fmt = q.format.as_deref().map(DisplayFormat::parse).unwrap_or_default();

    let value = claims.formatted_value(&id, fmt, location);
    let fresh = claims.is_fresh(&id);
    Json(MetricResponse { id, value, fresh })
}

#[derive(Debug, Deserialize)]
pub struct ContentQuery {
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub id: String,
    pub text: String,
}

pub async fn get_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<ContentQuery>,
) -> Json<ContentResponse> {
    let location = q.location.as_deref().unwrap_or(DEFAULT_LOCATION);
    let text = state.claims().content(&id, q.variant.as_deref(), location);
    Json(ContentResponse { id, text })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderReq {
    pub template: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub text: String,
}

pub async fn render(
    State(state): State<AppState>,
    Json(req): Json<RenderReq>,
) -> Result<Json<RenderResponse>, ApiError> {
    let max = state.cfg().server.max_template_bytes;
    if req.template.len() > max {
        return Err(ClaimsError::BadRequest(format!("template exceeds {max} bytes")).into());
    }
    let location = req.location.as_deref().unwrap_or(DEFAULT_LOCATION);
    let text = state.claims().interpolate(&req.template, location);
    Ok(Json(RenderResponse { text }))
}
