use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use models::AuthResponse;
use models::RegisterRequest;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UserName;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<ApiSuccess<AuthResponse>, ApiError> {
    let Json(body) = body?;
    body.validate()?;

    let session = state
        .auth_service
        .register(try_into_command(body)?)
        .await
        .map_err(ApiError::from)?;

    Ok(ApiSuccess::new(
        StatusCode::CREATED,
        AuthResponse {
            access_token: session.tokens.access_token,
            refresh_token: session.tokens.refresh_token,
            user: (&session.user).into(),
        },
    ))
}

fn try_into_command(body: RegisterRequest) -> Result<RegisterCommand, AuthError> {
    let name =
        UserName::new(body.name).map_err(|e| AuthError::validation("name", e.to_string()))?;
    let email =
        EmailAddress::new(body.email).map_err(|e| AuthError::validation("email", e.to_string()))?;
    Ok(RegisterCommand::new(name, email, body.password))
}
