//! User store on PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use liveboard_core::error::AppError;
use liveboard_core::result::AppResult;
use liveboard_core::types::{ConnectionId, UserId};
use liveboard_entity::{CreateUser, User};

use super::store_error;
use crate::store::UserStore;

/// [`UserStore`] backed by the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new user store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error("Failed to find user by id"))
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<Uuid> = ids.iter().map(|id| id.into_uuid()).collect();
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(raw)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error("Failed to find users by id"))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error("Failed to find user by email"))
    }

    async fn create(&self, input: CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, email, password_hash, avatar, is_online, connection_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING *",
        )
        .bind(input.id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(&input.avatar)
        .bind(input.connection_id.is_some())
        .bind(input.connection_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::conflict("User already exists")
            }
            other => store_error("Failed to create user")(other),
        })
    }

    async fn find_online(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE is_online ORDER BY name, id")
            .fetch_all(&self.pool)
            .await
            .map_err(store_error("Failed to list online users"))
    }

    async fn find_all_except(&self, id: UserId) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id <> $1 ORDER BY name, id")
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error("Failed to list users"))
    }

    async fn attach_connection(
        &self,
        id: UserId,
        connection_id: ConnectionId,
        avatar: Option<&str>,
    ) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET connection_id = $2, is_online = TRUE, \
                              avatar = COALESCE($3, avatar), updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(connection_id)
        .bind(avatar)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("Failed to attach connection"))
    }

    async fn detach_connection_if_current(
        &self,
        id: UserId,
        connection_id: ConnectionId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET connection_id = NULL, is_online = FALSE, updated_at = NOW() \
             WHERE id = $1 AND connection_id = $2",
        )
        .bind(id)
        .bind(connection_id)
        .execute(&self.pool)
        .await
        .map_err(store_error("Failed to detach connection"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn detach_all(&self) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE users SET connection_id = NULL, is_online = FALSE, updated_at = NOW() \
             WHERE is_online OR connection_id IS NOT NULL",
        )
        .execute(&self.pool)
        .await
        .map_err(store_error("Failed to detach all connections"))?;

        Ok(result.rows_affected())
    }
}
