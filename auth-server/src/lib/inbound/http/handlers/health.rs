use axum::extract::State;
use axum::http::StatusCode;
use models::HealthResponse;

use super::ApiSuccess;
use crate::inbound::http::router::AppState;

/// Always 200; a database outage shows up as `degraded` in the body.
pub async fn health_check(State(state): State<AppState>) -> ApiSuccess<HealthResponse> {
    let timestamp = state.clock.now();

    let response = match state.database.ping().await {
        Ok(()) => HealthResponse::healthy(timestamp),
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            HealthResponse::database_down(timestamp, e)
        }
    };

    ApiSuccess::new(StatusCode::OK, response)
}
