use std::sync::Arc;

use models::AuthResponse;
use models::TokenPair;
use models::UserResponse;
use tokio::sync::watch;

use crate::errors::StorageError;
use crate::storage::StorageKeys;
use crate::storage::TokenStorage;

/// What the UI needs to know about the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserResponse>,
    pub loading: bool,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Holds the session and mirrors both tokens into durable storage on
/// every change.
///
/// New tokens reach storage before they become visible in memory; a failed
/// write leaves the session as it was.
pub struct SessionStore {
    state: watch::Sender<AuthState>,
    storage: Arc<dyn TokenStorage>,
    keys: StorageKeys,
}

impl SessionStore {
    /// Hydrate a store from whatever tokens `storage` already holds.
    ///
    /// The user is not persisted; it is fetched again after start-up.
    pub async fn load(
        storage: Arc<dyn TokenStorage>,
        keys: StorageKeys,
    ) -> Result<Self, StorageError> {
        let access_token = storage.get(&keys.access_token).await?;
        let refresh_token = storage.get(&keys.refresh_token).await?;

        tracing::debug!(
            has_access_token = access_token.is_some(),
            has_refresh_token = refresh_token.is_some(),
            "Session hydrated from storage"
        );

        let (state, _) = watch::channel(AuthState {
            access_token,
            refresh_token,
            user: None,
            loading: false,
        });

        Ok(Self {
            state,
            storage,
            keys,
        })
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Observe every state change.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.borrow().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.state.borrow().refresh_token.clone()
    }

    pub async fn login(&self, response: AuthResponse) -> Result<(), StorageError> {
        self.persist(Some(&response.access_token), Some(&response.refresh_token))
            .await?;

        self.state.send_modify(|state| {
            state.access_token = Some(response.access_token);
            state.refresh_token = Some(response.refresh_token);
            state.user = Some(response.user);
        });
        Ok(())
    }

    /// Forget everything, in memory and in storage.
    ///
    /// Memory is cleared even when storage can not be, so the session ends
    /// either way; the storage error is still returned.
    pub async fn logout(&self) -> Result<(), StorageError> {
        let persisted = self.persist(None, None).await;

        self.state.send_modify(|state| {
            state.access_token = None;
            state.refresh_token = None;
            state.user = None;
        });
        persisted
    }

    pub async fn update_token(&self, tokens: TokenPair) -> Result<(), StorageError> {
        self.persist(Some(&tokens.access_token), Some(&tokens.refresh_token))
            .await?;

        self.state.send_modify(|state| {
            state.access_token = Some(tokens.access_token);
            state.refresh_token = Some(tokens.refresh_token);
        });
        Ok(())
    }

    pub fn update_user(&self, user: UserResponse) {
        self.state.send_modify(|state| state.user = Some(user));
    }

    pub fn set_loading(&self, loading: bool) {
        self.state.send_if_modified(|state| {
            let changed = state.loading != loading;
            state.loading = loading;
            changed
        });
    }

    async fn persist(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Result<(), StorageError> {
        self.storage
            .write(&[
                (self.keys.access_token.as_str(), access_token),
                (self.keys.refresh_token.as_str(), refresh_token),
            ])
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Failed to persist session tokens");
                e
            })
    }
}
