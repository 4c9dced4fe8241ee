use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use auth::HashCost;
use auth::ManualClock;
use auth::PasswordHasher;
use auth::TokenCodecConfig;
use auth_server::domain::auth::service::AuthService;
use auth_server::domain::user::cache::UserCache;
use auth_server::inbound::http::router::create_router;
use auth_server::inbound::http::router::AppState;
use auth_server::outbound::repositories::InMemoryRefreshTokenRepository;
use auth_server::outbound::repositories::InMemoryUserRepository;
use session_client::ApiClient;
use session_client::MemoryTokenStorage;
use session_client::StorageKeys;
use session_client::TokenStorage;
use tower_http::cors::CorsLayer;

pub const ACCESS_TOKEN_MINUTES: i64 = 15;

/// API server on a random port, backed by in-memory adapters.
pub struct TestServer {
    pub address: String,
    pub clock: Arc<ManualClock>,
    pub users: Arc<InMemoryUserRepository>,
    pub refresh_tokens: Arc<InMemoryRefreshTokenRepository>,
}

impl TestServer {
    /// Spawn the server in a background task
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().expect("No local address").port();
        let address = format!("http://127.0.0.1:{}", port);

        let clock = Arc::new(ManualClock::starting_now());
        let authenticator = Arc::new(
            Authenticator::new(
                PasswordHasher::with_cost(HashCost::MINIMAL).expect("Invalid hash cost"),
                &TokenCodecConfig {
                    access_secret: "client-test-access-secret-32-bytes!!".to_string(),
                    access_lifetime: chrono::Duration::minutes(ACCESS_TOKEN_MINUTES),
                    refresh_secret: "client-test-refresh-secret-32-bytes!".to_string(),
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

        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&users),
            Arc::clone(&refresh_tokens),
            authenticator,
            cache,
            clock.clone(),
        ));
        let state = AppState {
            auth_service,
            database: users.clone(),
            clock: clock.clone(),
        };
        let router = create_router(state, CorsLayer::permissive());

        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Server failed");
        });

        Self {
            address,
            clock,
            users,
            refresh_tokens,
        }
    }

    /// Make every access token issued so far expire.
    pub fn expire_access_tokens(&self) {
        self.clock
            .advance(chrono::Duration::minutes(ACCESS_TOKEN_MINUTES + 1));
    }

    pub async fn client(&self) -> ApiClient {
        self.client_with(Arc::new(MemoryTokenStorage::new())).await
    }

    pub async fn client_with(&self, storage: Arc<dyn TokenStorage>) -> ApiClient {
        ApiClient::with_storage(self.address.clone(), storage, StorageKeys::default())
            .await
            .expect("Failed to create client")
    }
}
