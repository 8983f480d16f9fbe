use axum::Json;

use hirelink_shared::types::HealthResponse;

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy("hirelink-api", env!("CARGO_PKG_VERSION")))
}
