//! In-memory adapters, for tests and database-less local runs.
//!
//! Data is lost on process restart.

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::auth::errors::TokenStoreError;
use crate::domain::auth::models::RefreshTokenRecord;
use crate::domain::auth::ports::RefreshTokenRepository;
use crate::domain::health::DatabaseHealth;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
    available: AtomicBool,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Mark an account deleted; it disappears from every lookup.
    pub async fn soft_delete(&self, id: &UserId, at: DateTime<Utc>) -> bool {
        match self.users.write().await.get_mut(id) {
            Some(user) => {
                user.deleted_at = Some(at);
                true
            }
            None => false,
        }
    }

    /// Make `ping` fail, to exercise degraded health reporting.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        let taken = users
            .values()
            .any(|existing| !existing.is_deleted() && existing.email == user.email);
        if taken {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let users = self.users.read().await;
        Ok(users.get(id).filter(|user| !user.is_deleted()).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|user| !user.is_deleted() && user.email.as_str() == email)
            .cloned())
    }
}

#[async_trait]
impl DatabaseHealth for InMemoryUserRepository {
    async fn ping(&self) -> Result<(), String> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err("in-memory store marked unavailable".to_string())
        }
    }
}

pub struct InMemoryRefreshTokenRepository {
    records: RwLock<HashMap<Uuid, RefreshTokenRecord>>,
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for InMemoryRefreshTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn store(&self, record: RefreshTokenRecord) -> Result<(), TokenStoreError> {
        self.records.write().await.insert(record.jti, record);
        Ok(())
    }

    async fn rotate(
        &self,
        jti: &Uuid,
        replacement: RefreshTokenRecord,
        now: DateTime<Utc>,
    ) -> Result<bool, TokenStoreError> {
        let mut records = self.records.write().await;
        match records.remove(jti) {
            Some(record) if record.expires_at > now => {
                records.insert(replacement.jti, replacement);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke(&self, jti: &Uuid) -> Result<(), TokenStoreError> {
        self.records.write().await.remove(jti);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, TokenStoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| record.expires_at > now);
        Ok((before - records.len()) as u64)
    }
}
