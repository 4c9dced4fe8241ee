use serde::Deserialize;
use serde::Serialize;

/// Response envelope: every body is `{ "status_code": u16, "data": T }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponseBody<T> {
    pub status_code: u16,
    pub data: T,
}

impl<T> ApiResponseBody<T> {
    pub fn new(status_code: u16, data: T) -> Self {
        Self { status_code, data }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: u16, data: ApiErrorData) -> Self {
        Self { status_code, data }
    }
}

/// Protocol-level error classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Conflict,
    NotFound,
    Unauthorized,
    BadRequest,
    InternalServerError,
}

/// Payload of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorData {
    pub code: ErrorCode,
    pub message: String,
    /// Offending input field, for conflicts and validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}
