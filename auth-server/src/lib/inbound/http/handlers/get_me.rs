use axum::http::StatusCode;
use axum::Extension;
use models::UserResponse;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::middleware::CurrentUser;

pub async fn get_me(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<ApiSuccess<UserResponse>, ApiError> {
    let user = user.ok_or_else(ApiError::unauthorized)?;
    Ok(ApiSuccess::new(StatusCode::OK, (&user).into()))
}
