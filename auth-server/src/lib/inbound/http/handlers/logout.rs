use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use models::LogoutRequest;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;

pub async fn logout(
    State(state): State<AppState>,
    body: Result<Json<LogoutRequest>, JsonRejection>,
) -> Result<ApiSuccess<LogoutResponseData>, ApiError> {
    let Json(body) = body?;
    body.validate()?;

    state
        .auth_service
        .logout(&body.refresh_token)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::OK, LogoutResponseData {}))
}

/// Serializes as `{}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogoutResponseData {}
