use axum::{Extension, Json};
use serde::Serialize;

use crate::SharedState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: String,
}

// GET /health
pub async fn health(Extension(state): Extension<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: state.config.service_name.clone(),
    })
}
