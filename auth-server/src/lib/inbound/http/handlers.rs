use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use models::ApiErrorData;
use models::ApiResponseBody;
use models::ErrorCode;
use models::UserResponse;
use serde::Serialize;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::ErrorKind;
use crate::domain::user::models::User;

pub mod get_me;
pub mod health;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status.as_u16(), data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity {
        message: String,
        field: Option<String>,
    },
    NotFound(String),
    Conflict {
        message: String,
        field: Option<String>,
    },
    Unauthorized(String),
}

impl ApiError {
    pub fn unauthorized() -> Self {
        ApiError::Unauthorized("Authentication required".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, field) = match self {
            ApiError::InternalServerError(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalServerError,
                    "Internal server error".to_string(),
                    None,
                )
            }
            ApiError::UnprocessableEntity { message, field } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::BadRequest,
                message,
                field,
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg, None),
            ApiError::Conflict { message, field } => {
                (StatusCode::CONFLICT, ErrorCode::Conflict, message, field)
            }
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, msg, None)
            }
        };

        let body = ApiResponseBody::new_error(
            status.as_u16(),
            ApiErrorData {
                code,
                message,
                field,
            },
        );
        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let field = err.field().map(str::to_string);
        let message = err.to_string();

        match err.kind() {
            ErrorKind::Conflict => ApiError::Conflict { message, field },
            ErrorKind::NotFound => ApiError::NotFound(message),
            ErrorKind::Unauthorized => ApiError::Unauthorized(message),
            ErrorKind::Validation => ApiError::UnprocessableEntity { message, field },
            ErrorKind::Internal => ApiError::InternalServerError(message),
        }
    }
}

impl From<models::ValidationError> for ApiError {
    fn from(err: models::ValidationError) -> Self {
        ApiError::UnprocessableEntity {
            message: err.message,
            field: Some(err.field),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::UnprocessableEntity {
            message: rejection.body_text(),
            field: None,
        }
    }
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.0,
            name: user.name.as_str().to_string(),
            email: user.email.as_str().to_string(),
            created_at: user.created_at,
            updated_at: user.updated_at,
            deleted_at: user.deleted_at,
        }
    }
}
