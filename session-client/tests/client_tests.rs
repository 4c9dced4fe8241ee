mod common;

use std::sync::Arc;

use auth::Clock;
use auth_server::user::models::UserId;
use common::TestServer;
use models::ErrorCode;
use models::HealthStatus;
use models::LoginRequest;
use models::RegisterForm;
use models::RegisterRequest;
use session_client::ClientError;
use session_client::FileTokenStorage;
use session_client::MemoryTokenStorage;
use session_client::RefreshState;
use session_client::TokenStorage;

fn alice() -> RegisterRequest {
    RegisterRequest::new("Alice", "alice@x.com", "Secret123!")
}

#[tokio::test]
async fn test_register_login_get_me_logout() {
    let server = TestServer::spawn().await;
    let client = server.client().await;

    let registered = client.register(&alice()).await.unwrap();
    assert_eq!(registered.email, "alice@x.com");
    assert!(client.session().snapshot().is_authenticated());

    let me = client.get_me().await.unwrap();
    assert_eq!(me.id, registered.id);

    client.logout().await.unwrap();
    assert!(!client.session().snapshot().is_authenticated());
    assert!(server.refresh_tokens.is_empty().await);

    let user = client
        .login(&LoginRequest::new("alice@x.com", "Secret123!"))
        .await
        .unwrap();
    assert_eq!(user.id, registered.id);
    assert_eq!(client.session().snapshot().user, Some(user));
}

#[tokio::test]
async fn test_server_errors_are_typed() {
    let server = TestServer::spawn().await;
    let client = server.client().await;
    client.register(&alice()).await.unwrap();

    let other = server.client().await;
    let err = other.register(&alice()).await.unwrap_err();
    match err {
        ClientError::Api {
            status,
            code,
            field,
            ..
        } => {
            assert_eq!(status, 409);
            assert_eq!(code, ErrorCode::Conflict);
            assert_eq!(field.as_deref(), Some("email"));
        }
        other => panic!("Expected API error, got {:?}", other),
    }

    let err = other
        .login(&LoginRequest::new("alice@x.com", "wrong-password"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::Unauthorized));
    assert!(!other.session().snapshot().is_authenticated());
}

#[tokio::test]
async fn test_invalid_input_is_rejected_before_sending() {
    let server = TestServer::spawn().await;
    let client = server.client().await;

    let form = RegisterForm {
        name: "Alice".to_string(),
        email: "alice@x.com".to_string(),
        password: "Secret123!".to_string(),
        confirm_password: "Different1!".to_string(),
    };
    let err = client.register_form(form).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(ref e) if e.field == "confirmPassword"));

    let err = client
        .register(&RegisterRequest::new("Alice", "not-an-email", "Secret123!"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert!(server.refresh_tokens.is_empty().await);
}

#[tokio::test]
async fn test_expired_access_token_is_refreshed_once() {
    let server = TestServer::spawn().await;
    let client = server.client().await;
    client.register(&alice()).await.unwrap();
    let before = client.session().snapshot();

    server.expire_access_tokens();
    let me = client.get_me().await.unwrap();

    assert_eq!(me.email, "alice@x.com");
    let after = client.session().snapshot();
    assert_ne!(after.access_token, before.access_token);
    assert_ne!(after.refresh_token, before.refresh_token);
    assert_eq!(client.refresh_state(), RefreshState::Idle);
}

#[tokio::test]
async fn test_concurrent_unauthorized_requests_share_one_refresh() {
    let server = TestServer::spawn().await;
    let client = server.client().await;
    client.register(&alice()).await.unwrap();

    server.expire_access_tokens();
    let (first, second, third) = tokio::join!(client.get_me(), client.get_me(), client.get_me());

    // A second refresh would present a spent token and end the session
    assert!(first.is_ok());
    assert!(second.is_ok());
    assert!(third.is_ok());
    assert!(client.session().snapshot().is_authenticated());
    assert_eq!(server.refresh_tokens.len().await, 1);
}

#[tokio::test]
async fn test_failed_refresh_requires_login() {
    let server = TestServer::spawn().await;
    let storage = Arc::new(MemoryTokenStorage::new());
    let client = server.client_with(storage.clone()).await;
    client.register(&alice()).await.unwrap();

    // Past the refresh token lifetime too
    server.clock.advance(chrono::Duration::days(8));
    let err = client.get_me().await.unwrap_err();

    assert!(err.is_login_required());
    assert_eq!(client.refresh_state(), RefreshState::Failed);
    assert_eq!(client.session().snapshot(), Default::default());
    assert_eq!(storage.get("accessToken").await.unwrap(), None);
    assert_eq!(storage.get("refreshToken").await.unwrap(), None);

    // A fresh login recovers
    client
        .login(&LoginRequest::new("alice@x.com", "Secret123!"))
        .await
        .unwrap();
    assert_eq!(client.refresh_state(), RefreshState::Idle);
    assert!(client.get_me().await.is_ok());
}

#[tokio::test]
async fn test_deleted_user_is_logged_out() {
    let server = TestServer::spawn().await;
    let client = server.client().await;
    let user = client.register(&alice()).await.unwrap();

    let id = UserId(user.id);
    assert!(server.users.soft_delete(&id, server.clock.now()).await);

    server.expire_access_tokens();
    let err = client.get_me().await.unwrap_err();

    assert!(err.is_login_required());
    assert!(!client.session().snapshot().is_authenticated());
}

#[tokio::test]
async fn test_explicit_refresh_rotates_pair() {
    let server = TestServer::spawn().await;
    let client = server.client().await;
    client.register(&alice()).await.unwrap();
    let before = client.session().refresh_token();

    client.refresh().await.unwrap();

    assert_ne!(client.session().refresh_token(), before);
    assert_eq!(client.refresh_state(), RefreshState::Idle);
    assert!(client.get_me().await.is_ok());
}

#[tokio::test]
async fn test_initialize_resumes_stored_session() {
    let server = TestServer::spawn().await;
    let storage: Arc<dyn TokenStorage> = Arc::new(MemoryTokenStorage::new());

    let first = server.client_with(Arc::clone(&storage)).await;
    first.register(&alice()).await.unwrap();

    let resumed = server.client_with(Arc::clone(&storage)).await;
    assert!(resumed.session().snapshot().user.is_none());

    let user = resumed.initialize().await.unwrap().unwrap();
    assert_eq!(user.email, "alice@x.com");
    let state = resumed.session().snapshot();
    assert_eq!(state.user, Some(user));
    assert!(!state.loading);
}

#[tokio::test]
async fn test_initialize_without_session() {
    let server = TestServer::spawn().await;
    let client = server.client().await;

    assert_eq!(client.initialize().await.unwrap(), None);
}

#[tokio::test]
async fn test_initialize_with_dead_session_clears_it() {
    let server = TestServer::spawn().await;
    let storage = Arc::new(MemoryTokenStorage::new());
    storage
        .write(&[
            ("accessToken", Some("garbage")),
            ("refreshToken", Some("garbage")),
        ])
        .await
        .unwrap();

    let client = server.client_with(storage.clone()).await;
    assert_eq!(client.initialize().await.unwrap(), None);
    assert_eq!(storage.get("refreshToken").await.unwrap(), None);
}

#[tokio::test]
async fn test_session_survives_restart_with_file_storage() {
    let server = TestServer::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let first = server
        .client_with(Arc::new(FileTokenStorage::new(&path)))
        .await;
    first.register(&alice()).await.unwrap();
    drop(first);

    let second = server
        .client_with(Arc::new(FileTokenStorage::new(&path)))
        .await;
    assert!(second.session().snapshot().is_authenticated());
    assert_eq!(second.get_me().await.unwrap().email, "alice@x.com");

    second.logout().await.unwrap();
    let third = server
        .client_with(Arc::new(FileTokenStorage::new(&path)))
        .await;
    assert!(!third.session().snapshot().is_authenticated());
}

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::spawn().await;
    let client = server.client().await;

    let health = client.health().await.unwrap();
    assert_eq!(health.status, HealthStatus::Ok);

    server.users.set_available(false);
    let health = client.health().await.unwrap();
    assert_eq!(health.status, HealthStatus::Degraded);
}
