use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::openai_types::ModelsResponse;
use crate::presentation::state::AppState;

pub async fn models_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ModelsResponse::single(&state.settings.engine.model)),
    )
}
