use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use utoipa::ToSchema;

use crate::extractor::AppJson;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "connected")]
    pub database: String,
}

pub fn create_route() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database are up", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse),
    ),
    tag = "Health"
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, AppJson<HealthResponse>) {
    match state.db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            AppJson(HealthResponse {
                status: "ok".into(),
                database: "connected".into(),
            }),
        ),
        Err(e) => {
            tracing::error!("Health check failed to reach the database: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                AppJson(HealthResponse {
                    status: "degraded".into(),
                    database: "disconnected".into(),
                }),
            )
        }
    }
}
