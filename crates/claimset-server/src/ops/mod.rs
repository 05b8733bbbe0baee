//! Operational HTTP endpoints.
//!
//! - `/healthz`      : liveness
//! - `/debug/audit`  : integration report (404 unless the auditor is enabled)

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use claimset_core::error::ClaimsError;

use crate::api::ApiError;
use crate::app_state::AppState;
use crate::audit::IntegrationReport;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn audit(State(state): State<AppState>) -> Result<Json<IntegrationReport>, ApiError> {
    let tracker = state.claims().tracker();
    if !tracker.is_enabled() {
        return Err(ClaimsError::NotFound("usage auditor disabled".into()).into());
    }
    Ok(Json(tracker.generate_integration_report()))
}
