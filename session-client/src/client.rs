use std::sync::Arc;

use models::ApiErrorData;
use models::ApiResponseBody;
use models::AuthResponse;
use models::HealthResponse;
use models::LoginRequest;
use models::LogoutRequest;
use models::RefreshRequest;
use models::RegisterForm;
use models::RegisterRequest;
use models::TokenPair;
use models::UserResponse;
use reqwest::RequestBuilder;
use reqwest::Response;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::de::IgnoredAny;

use crate::config::ClientConfig;
use crate::coordinator::RefreshCoordinator;
use crate::coordinator::RefreshState;
use crate::errors::ClientError;
use crate::storage::StorageKeys;
use crate::storage::TokenStorage;
use crate::store::SessionStore;

/// Typed client for the `/trpc` API.
///
/// Protected calls attach the stored access token. A 401 triggers exactly one
/// refresh (shared by every request that hit it at the same time) and one
/// replay; if that fails too the session is cleared and `LoginRequired` is
/// returned.
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
    session: SessionStore,
    refresh: RefreshCoordinator,
}

impl ApiClient {
    pub async fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::with_storage(
            config.api_url.clone(),
            config.storage(),
            config.storage_keys.clone(),
        )
        .await
    }

    pub async fn with_storage(
        api_url: impl Into<String>,
        storage: Arc<dyn TokenStorage>,
        keys: StorageKeys,
    ) -> Result<Self, ClientError> {
        let api_url = api_url.into();
        let base_url = format!("{}/trpc", api_url.trim_end_matches('/'));

        Ok(Self {
            http_client: reqwest::Client::new(),
            base_url,
            session: SessionStore::load(storage, keys).await?,
            refresh: RefreshCoordinator::new(),
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn refresh_state(&self) -> RefreshState {
        self.refresh.state()
    }

    /// Resume a stored session by fetching the current user.
    ///
    /// Returns `None` when there is no session to resume, or when it could
    /// not be renewed.
    pub async fn initialize(&self) -> Result<Option<UserResponse>, ClientError> {
        if self.session.access_token().is_none() && self.session.refresh_token().is_none() {
            return Ok(None);
        }

        self.session.set_loading(true);
        let result = self.get_me().await;
        self.session.set_loading(false);

        match result {
            Ok(user) => Ok(Some(user)),
            Err(ClientError::LoginRequired) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<UserResponse, ClientError> {
        request.validate()?;

        let response = self
            .http_client
            .post(self.url("auth.register"))
            .json(request)
            .send()
            .await?;
        let auth: AuthResponse = parse(response).await?;

        self.start_session(auth).await
    }

    /// Register from a form with a password confirmation.
    pub async fn register_form(&self, form: RegisterForm) -> Result<UserResponse, ClientError> {
        let request = form.into_request()?;
        self.register(&request).await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<UserResponse, ClientError> {
        request.validate()?;

        let response = self
            .http_client
            .post(self.url("auth.login"))
            .json(request)
            .send()
            .await?;
        let auth: AuthResponse = parse(response).await?;

        self.start_session(auth).await
    }

    /// Rotate the token pair now, without waiting for a 401.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let current = self.session.access_token();
        let result = self
            .refresh
            .recover(current.as_deref(), &self.session, move |refresh_token| {
                self.request_refresh(refresh_token)
            })
            .await;
        self.refresh.finish_retry();
        result
    }

    /// End the session locally and revoke its refresh token on the server.
    ///
    /// The local session is cleared even when the server can not be reached.
    pub async fn logout(&self) -> Result<(), ClientError> {
        if let Some(refresh_token) = self.session.refresh_token() {
            let request = LogoutRequest { refresh_token };
            let revoked = match self
                .http_client
                .post(self.url("auth.logout"))
                .json(&request)
                .send()
                .await
            {
                Ok(response) => parse::<IgnoredAny>(response).await.map(|_| ()),
                Err(e) => Err(e.into()),
            };
            if let Err(e) = revoked {
                tracing::warn!(error = %e, "Failed to revoke refresh token");
            }
        }

        self.session.logout().await?;
        Ok(())
    }

    pub async fn get_me(&self) -> Result<UserResponse, ClientError> {
        let url = self.url("auth.getMe");
        let user: UserResponse = self.authorized(|http| http.get(&url)).await?;

        self.session.update_user(user.clone());
        Ok(user)
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self.http_client.get(self.url("health.check")).send().await?;
        parse(response).await
    }

    async fn start_session(&self, auth: AuthResponse) -> Result<UserResponse, ClientError> {
        let user = auth.user.clone();
        self.session.login(auth).await?;
        self.refresh.reset();

        tracing::debug!(user_id = %user.id, "Session started");
        Ok(user)
    }

    async fn request_refresh(&self, refresh_token: String) -> Result<TokenPair, ClientError> {
        let response = self
            .http_client
            .post(self.url("auth.refresh"))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;
        parse(response).await
    }

    /// Send a request with the access token, refreshing once on 401.
    async fn authorized<T, F>(&self, build: F) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        let token = self.session.access_token();
        let response = with_bearer(build(&self.http_client), token.as_deref())
            .send()
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return parse(response).await;
        }

        tracing::debug!("Access token rejected, refreshing");
        self.refresh
            .recover(token.as_deref(), &self.session, move |refresh_token| {
                self.request_refresh(refresh_token)
            })
            .await?;

        let token = self.session.access_token();
        let retried = with_bearer(build(&self.http_client), token.as_deref())
            .send()
            .await;
        self.refresh.finish_retry();

        let response = retried?;
        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!("Request rejected after refresh, clearing session");
            self.refresh.fail();
            self.session.logout().await?;
            return Err(ClientError::LoginRequired);
        }

        parse(response).await
    }

    fn url(&self, procedure: &str) -> String {
        format!("{}/{}", self.base_url, procedure)
    }
}

fn with_bearer(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    }
}

/// Unwrap the response envelope, or turn an error envelope into `ClientError::Api`.
async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return match serde_json::from_str::<ApiResponseBody<T>>(&body) {
            Ok(envelope) => Ok(envelope.data),
            Err(_) => Err(ClientError::UnexpectedResponse {
                status: status.as_u16(),
                body,
            }),
        };
    }

    match serde_json::from_str::<ApiResponseBody<ApiErrorData>>(&body) {
        Ok(envelope) => Err(ClientError::Api {
            status: status.as_u16(),
            code: envelope.data.code,
            message: envelope.data.message,
            field: envelope.data.field,
        }),
        Err(_) => Err(ClientError::UnexpectedResponse {
            status: status.as_u16(),
            body,
        }),
    }
}
