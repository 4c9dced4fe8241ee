use std::future::Future;
use std::sync::Mutex;

use models::TokenPair;

use crate::errors::ClientError;
use crate::store::SessionStore;

/// Where the client is in the refresh-once-then-give-up cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Refreshing,
    /// A fresh pair is stored and the original request is being replayed.
    Retrying,
    /// The last refresh failed and the session was cleared.
    Failed,
}

/// Serialises token refreshes so that any number of requests failing with
/// 401 at the same time trigger a single refresh, and share its result.
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
    in_flight: tokio::sync::Mutex<()>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RefreshState::Idle),
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    pub fn state(&self) -> RefreshState {
        match self.state.lock() {
            Ok(state) => *state,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Recover from a 401 seen while using `stale_access_token`.
    ///
    /// If another caller already replaced that token the call returns at once;
    /// otherwise `refresh` is run with the stored refresh token and the new
    /// pair saved. On any failure the session is cleared.
    ///
    /// # Errors
    /// * `LoginRequired` - No refresh token, or the refresh was rejected
    /// * `Storage` - The new pair could not be persisted
    pub async fn recover<F, Fut>(
        &self,
        stale_access_token: Option<&str>,
        session: &SessionStore,
        refresh: F,
    ) -> Result<(), ClientError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<TokenPair, ClientError>>,
    {
        let _in_flight = self.in_flight.lock().await;

        let current = session.access_token();
        if current.is_some() && current.as_deref() != stale_access_token {
            tracing::debug!("Access token already refreshed by another request");
            return Ok(());
        }

        let Some(refresh_token) = session.refresh_token() else {
            self.transition(RefreshState::Failed);
            session.logout().await?;
            return Err(ClientError::LoginRequired);
        };

        self.transition(RefreshState::Refreshing);
        match refresh(refresh_token).await {
            Ok(tokens) => {
                if let Err(e) = session.update_token(tokens).await {
                    self.transition(RefreshState::Failed);
                    return Err(e.into());
                }
                self.transition(RefreshState::Retrying);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed, clearing session");
                self.transition(RefreshState::Failed);
                session.logout().await?;
                Err(ClientError::LoginRequired)
            }
        }
    }

    /// The replayed request finished, whatever its outcome.
    pub fn finish_retry(&self) {
        self.update(|state| {
            if *state == RefreshState::Retrying {
                *state = RefreshState::Idle;
            }
        });
    }

    /// Mark the session as given up on.
    pub fn fail(&self) {
        self.transition(RefreshState::Failed);
    }

    /// Back to `Idle`, after a fresh login.
    pub fn reset(&self) {
        self.transition(RefreshState::Idle);
    }

    fn transition(&self, to: RefreshState) {
        self.update(|state| {
            if *state != to {
                tracing::debug!(from = ?*state, to = ?to, "Refresh state changed");
            }
            *state = to;
        });
    }

    fn update(&self, apply: impl FnOnce(&mut RefreshState)) {
        match self.state.lock() {
            Ok(mut state) => apply(&mut state),
            Err(poisoned) => apply(&mut poisoned.into_inner()),
        }
    }
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
