use axum::{
    routing::{get, post},
    Router,
};

use crate::{api, app_state::AppState, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(ops::healthz))
        .route("/debug/audit", get(ops::audit))
        .route("/v1/metrics/:id", get(api::get_metric))
        .route("/v1/content/:id", get(api::get_content))
        .route("/v1/render", post(api::render))
        .with_state(state)
}
