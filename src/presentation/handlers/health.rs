use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: String,
    pub engine_loaded: bool,
    pub fast_lane_busy: bool,
}

pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let engine_loaded = state.dispatcher.engine_loaded();
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: if engine_loaded { "healthy" } else { "degraded" },
            model: state.settings.engine.model.clone(),
            engine_loaded,
            fast_lane_busy: state.dispatcher.permit().is_held(),
        }),
    )
}
