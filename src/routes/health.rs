use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::{
    AppState,
    utils::{error_codes, error_to_api_response, success_to_api_response},
};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub providers: Vec<String>,
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    success_to_api_response(HealthStatus {
        status: "ok",
        providers: state.models.provider_names(),
    })
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        error_to_api_response::<()>(error_codes::NOT_FOUND, "route not found".to_string()),
    )
}
