/*
 * Responsibility
 * - Storage seam for registered users (UserRepo)
 * - PgUserRepo: Postgres via SQLx, unique violations surface as RepoError::Conflict
 * - MemoryUserRepo: process-local store for development and tests
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Whether the username or the email is already registered.
    async fn exists(&self, username: &str, email: &str) -> RepoResult<bool>;

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRow>>;

    async fn create(&self, username: &str, email: &str, password_hash: &str)
    -> RepoResult<UserRow>;
}

#[derive(Clone, Debug)]
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn exists(&self, username: &str, email: &str) -> RepoResult<bool> {
        let found: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id
            FROM users
            WHERE email = $1 OR username = $2
            LIMIT 1
            "#,
        )
        .bind(email)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> RepoResult<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserRepo {
    users: RwLock<Vec<UserRow>>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn exists(&self, username: &str, email: &str) -> RepoResult<bool> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .any(|u| u.email == email || u.username == username))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRow>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> RepoResult<UserRow> {
        let mut users = self.users.write().await;
        // Same uniqueness rules as the users table.
        if users
            .iter()
            .any(|u| u.email == email || u.username == username)
        {
            return Err(RepoError::Conflict);
        }

        let row = UserRow {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        users.push(row.clone());
        Ok(row)
    }
}
