pub mod db;

use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use auth::HashCost;
use auth::ManualClock;
use auth::PasswordHasher;
use auth::TokenCodecConfig;
use auth_server::domain::auth::purger::RefreshTokenPurger;
use auth_server::domain::auth::service::AuthService;
use auth_server::domain::user::cache::UserCache;
use auth_server::inbound::http::router::create_router;
use auth_server::inbound::http::router::AppState;
use auth_server::outbound::repositories::InMemoryRefreshTokenRepository;
use auth_server::outbound::repositories::InMemoryUserRepository;
use axum::body::Body;
use axum::http::header::AUTHORIZATION;
use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

pub const ACCESS_TOKEN_SECONDS: i64 = 15 * 60;

/// Router wired to in-memory adapters and a clock the test controls.
pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualClock>,
    pub users: Arc<InMemoryUserRepository>,
    pub refresh_tokens: Arc<InMemoryRefreshTokenRepository>,
    pub cache: Arc<UserCache>,
    pub purger: RefreshTokenPurger<InMemoryRefreshTokenRepository>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::starting_now());
        let authenticator = Arc::new(
            Authenticator::new(
                PasswordHasher::with_cost(HashCost::MINIMAL).expect("Invalid hash cost"),
                &TokenCodecConfig {
                    access_secret: "test-access-secret-for-jwt-signing-32b".to_string(),
                    access_lifetime: chrono::Duration::seconds(ACCESS_TOKEN_SECONDS),
                    refresh_secret: "test-refresh-secret-for-jwt-signing-32".to_string(),
                    refresh_lifetime: chrono::Duration::days(7),
                },
                clock.clone(),
            )
            .expect("Failed to create authenticator"),
        );
        let cache = Arc::new(UserCache::new(
            Duration::from_secs(60),
            Duration::from_secs(300),
        ));
        let users = Arc::new(InMemoryUserRepository::new());
        let refresh_tokens = Arc::new(InMemoryRefreshTokenRepository::new());

        let purger = RefreshTokenPurger::new(
            Arc::clone(&refresh_tokens),
            clock.clone(),
            Duration::from_secs(3600),
        );

        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&users),
            Arc::clone(&refresh_tokens),
            authenticator,
            Arc::clone(&cache),
            clock.clone(),
        ));

        let state = AppState {
            auth_service,
            database: users.clone(),
            clock: clock.clone(),
        };

        Self {
            router: create_router(state, CorsLayer::permissive()),
            clock,
            users,
            refresh_tokens,
            cache,
            purger,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.send(Method::POST, path, Some(body), None).await
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None, None).await
    }

    pub async fn get_authenticated(&self, path: &str, token: &str) -> TestResponse {
        self.send(Method::GET, path, None, Some(token)).await
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> TestResponse {
        self.post(
            "/trpc/auth.register",
            serde_json::json!({ "name": name, "email": email, "password": password }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post(
            "/trpc/auth.login",
            serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> TestResponse {
        self.post(
            "/trpc/auth.refresh",
            serde_json::json!({ "refreshToken": refresh_token }),
        )
        .await
    }
}
