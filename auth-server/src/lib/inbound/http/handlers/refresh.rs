use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use models::RefreshRequest;
use models::TokenPair;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;

pub async fn refresh(
    State(state): State<AppState>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<ApiSuccess<TokenPair>, ApiError> {
    let Json(body) = body?;
    body.validate()?;

    state
        .auth_service
        .refresh(&body.refresh_token)
        .await
        .map_err(ApiError::from)
        .map(|tokens| {
            ApiSuccess::new(
                StatusCode::OK,
                TokenPair {
                    access_token: tokens.access_token,
                    refresh_token: tokens.refresh_token,
                },
            )
        })
}
