use std::sync::Arc;

use auth::Authenticator;
use auth::Clock;
use auth::PasswordHasher;
use auth::SystemClock;
use auth_server::config::Config;
use auth_server::domain::auth::purger::RefreshTokenPurger;
use auth_server::domain::auth::service::AuthService;
use auth_server::domain::user::cache::UserCache;
use auth_server::inbound::http::router::cors_layer;
use auth_server::inbound::http::router::create_router;
use auth_server::inbound::http::router::AppState;
use auth_server::outbound::repositories::PostgresRefreshTokenRepository;
use auth_server::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_server=debug,auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-server",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        cors_origin = %config.server.cors_origin,
        access_token_seconds = config.jwt.access.expiration_seconds,
        refresh_token_seconds = config.jwt.refresh.expiration_seconds,
        cache_ttl_seconds = config.cache.ttl_seconds,
        purge_interval_seconds = config.refresh_tokens.purge_interval_seconds,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let authenticator = Arc::new(Authenticator::new(
        PasswordHasher::new(),
        &config.jwt.token_codec_config(),
        Arc::clone(&clock),
    )?);

    let cache = Arc::new(UserCache::new(
        config.cache.ttl(),
        config.cache.sweep_interval(),
    ));
    cache.start();

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let refresh_token_repository = Arc::new(PostgresRefreshTokenRepository::new(pg_pool));

    let purger = RefreshTokenPurger::new(
        Arc::clone(&refresh_token_repository),
        Arc::clone(&clock),
        config.refresh_tokens.purge_interval(),
    );
    purger.start();

    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&user_repository),
        refresh_token_repository,
        authenticator,
        Arc::clone(&cache),
        Arc::clone(&clock),
    ));

    let state = AppState {
        auth_service,
        database: user_repository,
        clock,
    };
    let http_application = create_router(state, cors_layer(&config.server.cors_origin)?);

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let result = axum::serve(http_listener, http_application)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    purger.stop().await;
    cache.stop().await;

    match result {
        Ok(()) => tracing::info!("Server exited successfully"),
        Err(ref e) => tracing::error!(error = %e, "Server error"),
    };

    Ok(result?)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
