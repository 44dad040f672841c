use std::sync::Arc;
use std::time::Duration;

use auth_token::{Identity, TokenCodec};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::AppError;
use crate::repos::user_repo::UserRepo;
use crate::services::password::PasswordService;

/// A validated, normalized registration.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Service-level login result; handlers map it to the HTTP DTO.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user_id: Uuid,
    pub username: String,
}

/// Registers users and exchanges email/password pairs for signed tokens.
#[derive(Clone)]
pub struct CredentialService {
    users: Arc<dyn UserRepo>,
    passwords: PasswordService,
    codec: TokenCodec,
    token_ttl: Duration,
}

impl std::fmt::Debug for CredentialService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialService")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl CredentialService {
    pub fn new(
        users: Arc<dyn UserRepo>,
        passwords: PasswordService,
        codec: TokenCodec,
        token_ttl: Duration,
    ) -> Self {
        Self {
            users,
            passwords,
            codec,
            token_ttl,
        }
    }

    /// Store a new user with a salted password hash. Returns the new user id.
    pub async fn register(&self, user: NewUser) -> Result<Uuid, AppError> {
        if self.users.exists(&user.username, &user.email).await? {
            debug!(username = %user.username, "registration rejected: user exists");
            return Err(AppError::Conflict);
        }

        let passwords = self.passwords.clone();
        let password = user.password;
        let password_hash = tokio::task::spawn_blocking(move || passwords.hash(&password))
            .await
            .map_err(|e| {
                error!(error = %e, "password hashing task failed");
                AppError::Internal
            })?
            .map_err(|e| {
                error!(error = %e, "password hashing failed");
                AppError::Internal
            })?;

        // A concurrent registration can still win the race; the store reports it as a conflict.
        let row = self
            .users
            .create(&user.username, &user.email, &password_hash)
            .await?;

        info!(user_id = %row.id, username = %row.username, "user registered");
        Ok(row.id)
    }

    /// Verify the credentials and issue a token for the user.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            debug!("login rejected: unknown email");
            return Err(AppError::InvalidCredentials);
        };

        let passwords = self.passwords.clone();
        let password = password.to_string();
        let stored = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || passwords.verify(&password, &stored))
            .await
            .map_err(|e| {
                error!(error = %e, "password verification task failed");
                AppError::Internal
            })?
            .map_err(|e| {
                error!(user_id = %user.id, error = %e, "password verification failed");
                AppError::Internal
            })?;

        if !matches {
            debug!(user_id = %user.id, "login rejected: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self
            .codec
            .issue(&Identity::new(user.id, user.username.clone()), self.token_ttl)
            .map_err(|e| {
                error!(user_id = %user.id, error = %e, "failed to issue token");
                AppError::Internal
            })?;

        info!(user_id = %user.id, "user logged in");
        Ok(LoginOutcome {
            token,
            user_id: user.id,
            username: user.username,
        })
    }
}
