use axum::extract::Request;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use super::handlers::ApiError;
use crate::domain::user::models::User;
use crate::inbound::http::router::AppState;

/// Identity attached to every request by [`resolve_identity`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

/// Resolves the bearer token, if any, into a user and stores it in the
/// request extensions. Never rejects: a missing, malformed or expired token
/// just means an anonymous request.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let user = match bearer_token(req.headers()) {
        Some(token) => match state.auth_service.resolve_user(&token).await {
            Ok(user) => user,
            Err(e) => {
                tracing::error!(error = %e, "Failed to resolve request identity");
                None
            }
        },
        None => None,
    };

    req.extensions_mut().insert(CurrentUser(user));
    next.run(req).await
}

/// Protected gate: 401 unless [`resolve_identity`] found a user.
pub async fn require_user(req: Request, next: Next) -> Result<Response, ApiError> {
    let authenticated = req
        .extensions()
        .get::<CurrentUser>()
        .is_some_and(|current| current.user().is_some());

    if !authenticated {
        return Err(ApiError::unauthorized());
    }

    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers("Bearer abc.def")), Some("abc.def".to_string()));
        assert_eq!(bearer_token(&headers("Basic abc")), None);
        assert_eq!(bearer_token(&headers("Bearer   ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
