use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use models::AuthResponse;
use models::LoginRequest;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::LoginCommand;
use crate::domain::user::models::EmailAddress;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiSuccess<AuthResponse>, ApiError> {
    let Json(body) = body?;
    body.validate()?;

    let email =
        EmailAddress::new(body.email).map_err(|e| AuthError::validation("email", e.to_string()))?;

    let session = state
        .auth_service
        .login(LoginCommand::new(email, body.password))
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        AuthResponse {
            access_token: session.tokens.access_token,
            refresh_token: session.tokens.refresh_token,
            user: (&session.user).into(),
        },
    ))
}
