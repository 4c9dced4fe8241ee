use std::sync::Arc;
use std::time::Duration;

use auth::Clock;
use axum::body::Body;
use axum::http::header::AUTHORIZATION;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::get_me::get_me;
use super::handlers::health::health_check;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::middleware::require_user;
use super::middleware::resolve_identity;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::health::DatabaseHealth;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
    pub database: Arc<dyn DatabaseHealth>,
    pub clock: Arc<dyn Clock>,
}

/// CORS policy for a single configured origin, or any origin for `*`.
///
/// # Errors
/// The origin is not a valid header value
pub fn cors_layer(origin: &str) -> Result<CorsLayer, axum::http::header::InvalidHeaderValue> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    if origin == "*" {
        Ok(layer.allow_origin(Any))
    } else {
        Ok(layer
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_credentials(true))
    }
}

pub fn create_router(state: AppState, cors: CorsLayer) -> Router {
    let public_routes = Router::new()
        .route("/trpc/auth.register", post(register))
        .route("/trpc/auth.login", post(login))
        .route("/trpc/auth.refresh", post(refresh))
        .route("/trpc/auth.logout", post(logout))
        .route("/trpc/health.check", get(health_check));

    let protected_routes = Router::new()
        .route("/trpc/auth.getMe", get(get_me))
        .route_layer(middleware::from_fn(require_user));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            // Headers are left out: they carry bearer tokens
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_identity,
        ))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
