use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::Clock;
use auth::IssuedTokens;
use auth::TokenPair;
use auth::TokenSubject;
use uuid::Uuid;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::AuthSession;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::RefreshTokenRecord;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::RefreshTokenRepository;
use crate::domain::user::cache::UserCache;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;

/// Domain service implementation for authentication.
///
/// Password hashing and verification run on the blocking pool; token signing
/// is cheap and runs inline.
pub struct AuthService<UR, RR>
where
    UR: UserRepository,
    RR: RefreshTokenRepository,
{
    users: Arc<UR>,
    refresh_tokens: Arc<RR>,
    authenticator: Arc<Authenticator>,
    cache: Arc<UserCache>,
    clock: Arc<dyn Clock>,
}

impl<UR, RR> AuthService<UR, RR>
where
    UR: UserRepository,
    RR: RefreshTokenRepository,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `users` - User directory
    /// * `refresh_tokens` - Issued refresh token store
    /// * `authenticator` - Password hashing and token codec
    /// * `cache` - Resolved user cache shared with the request authenticator
    /// * `clock` - Time source, the same one the authenticator uses
    pub fn new(
        users: Arc<UR>,
        refresh_tokens: Arc<RR>,
        authenticator: Arc<Authenticator>,
        cache: Arc<UserCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            authenticator,
            cache,
            clock,
        }
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
            .await
            .map_err(|e| AuthError::Unknown(e.to_string()))?
            .map_err(|e| AuthError::PasswordHashing(e.to_string()))
    }

    async fn issue_tokens(&self, user: &User) -> Result<TokenPair, AuthError> {
        let issued = self
            .authenticator
            .issue_tokens(&subject_of(user))
            .map_err(|e| AuthError::TokenSigning(e.to_string()))?;

        self.remember_refresh_token(user, &issued).await?;
        Ok(issued.into_pair())
    }

    async fn remember_refresh_token(
        &self,
        user: &User,
        issued: &IssuedTokens,
    ) -> Result<(), AuthError> {
        let record = self.refresh_record(user, issued)?;
        self.refresh_tokens.store(record).await?;
        Ok(())
    }

    fn refresh_record(
        &self,
        user: &User,
        issued: &IssuedTokens,
    ) -> Result<RefreshTokenRecord, AuthError> {
        let claims = &issued.refresh.claims;
        let jti = Uuid::parse_str(&claims.jti).map_err(|e| AuthError::Unknown(e.to_string()))?;
        let expires_at = claims
            .expires_at()
            .ok_or_else(|| AuthError::Unknown(format!("Unrepresentable expiry {}", claims.exp)))?;

        Ok(RefreshTokenRecord {
            jti,
            user_id: user.id,
            expires_at,
            created_at: self.clock.now(),
        })
    }
}

#[async_trait]
impl<UR, RR> AuthServicePort for AuthService<UR, RR>
where
    UR: UserRepository,
    RR: RefreshTokenRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<AuthSession, AuthError> {
        let password_hash = self.hash_password(command.password).await?;
        let user = User::new(command.name, command.email, password_hash, self.clock.now());

        let created_user = self.users.create(user).await.map_err(|e| {
            tracing::warn!(error = %e, "Registration rejected");
            AuthError::from(e)
        })?;

        // The account is committed at this point; if the session can not be
        // recorded the caller gets an error but can still log in
        let tokens = self.issue_tokens(&created_user).await.map_err(|e| {
            tracing::error!(
                user_id = %created_user.id,
                error = %e,
                "User registered but no session was issued"
            );
            e
        })?;
        tracing::info!(user_id = %created_user.id, "User registered");

        Ok(AuthSession {
            tokens,
            user: created_user,
        })
    }

    async fn login(&self, command: LoginCommand) -> Result<AuthSession, AuthError> {
        let user = self
            .users
            .find_by_email(command.email.as_str())
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let authenticator = Arc::clone(&self.authenticator);
        let password = command.password;
        let password_hash = user.password_hash.clone();
        let subject = subject_of(&user);

        let issued = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(&password, &password_hash, &subject)
        })
        .await
        .map_err(|e| AuthError::Unknown(e.to_string()))?
        .map_err(|e| match e {
            AuthenticationError::InvalidCredentials => {
                tracing::info!(user_id = %user.id, "Login rejected: wrong password");
                AuthError::InvalidPassword
            }
            AuthenticationError::PasswordError(err) => AuthError::PasswordHashing(err.to_string()),
            AuthenticationError::JwtError(err) => AuthError::TokenSigning(err.to_string()),
        })?;

        self.remember_refresh_token(&user, &issued).await?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(AuthSession {
            tokens: issued.into_pair(),
            user,
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self
            .authenticator
            .verify_refresh_token(refresh_token)
            .ok_or(AuthError::InvalidRefreshToken)?;

        let jti = Uuid::parse_str(&claims.jti).map_err(|_| AuthError::InvalidRefreshToken)?;
        let user_id =
            UserId::from_string(&claims.user_id).map_err(|_| AuthError::InvalidRefreshToken)?;

        // The presented token stays valid until `rotate` succeeds
        let user = self
            .users
            .find_by_id(&user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let issued = self
            .authenticator
            .issue_tokens(&subject_of(&user))
            .map_err(|e| AuthError::TokenSigning(e.to_string()))?;
        let replacement = self.refresh_record(&user, &issued)?;

        if !self
            .refresh_tokens
            .rotate(&jti, replacement, self.clock.now())
            .await?
        {
            tracing::warn!(user_id = %user_id, jti = %jti, "Refresh token reused or revoked");
            return Err(AuthError::RefreshTokenRevoked);
        }

        tracing::debug!(user_id = %user.id, "Token pair rotated");
        Ok(issued.into_pair())
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let Some(claims) = self.authenticator.verify_refresh_token(refresh_token) else {
            return Ok(());
        };

        if let Ok(jti) = Uuid::parse_str(&claims.jti) {
            self.refresh_tokens.revoke(&jti).await?;
        }
        if let Ok(user_id) = UserId::from_string(&claims.user_id) {
            self.cache.invalidate(&user_id).await;
            tracing::info!(user_id = %user_id, "User logged out");
        }

        Ok(())
    }

    async fn resolve_user(&self, access_token: &str) -> Result<Option<User>, AuthError> {
        let Some(claims) = self.authenticator.verify_access_token(access_token) else {
            return Ok(None);
        };
        let Ok(user_id) = UserId::from_string(&claims.user_id) else {
            return Ok(None);
        };

        if let Some(user) = self.cache.get(&user_id).await {
            return Ok(Some(user));
        }

        match self.users.find_by_id(&user_id).await? {
            Some(user) => {
                self.cache.set(user_id, user.clone()).await;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }
}

fn subject_of(user: &User) -> TokenSubject {
    TokenSubject::new(user.id, user.email.as_str())
}
