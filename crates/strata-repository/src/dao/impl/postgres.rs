//! Postgres user DAO.

use crate::{dao::UserDao, DatabasePoolInterface};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shaku::Component;
use sqlx::{FromRow, Postgres, QueryBuilder};
use std::sync::Arc;
use strata_core::{now_micros, Email, StrataError, StrataResult, User, UserDraft, UserId, UserPatch};
use tracing::debug;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, email, username, first_name, last_name, is_active, created_at, updated_at";

/// Postgres-backed user DAO.
#[derive(Component, Clone)]
#[shaku(interface = UserDao)]
pub struct PostgresUserDao {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl PostgresUserDao {
    /// Creates a new Postgres user DAO.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

/// Database row representation of a user.
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    username: String,
    first_name: String,
    last_name: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StrataError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email)
            .map_err(|e| StrataError::internal(format!("Invalid email in database: {e}")))?;

        Ok(User {
            id: UserId::from_uuid(row.id),
            email,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl UserDao for PostgresUserDao {
    async fn insert(&self, draft: &UserDraft) -> StrataResult<User> {
        let user = User::from_draft(draft.clone());
        debug!("Inserting user {}", user.id);

        sqlx::query(
            r"
            INSERT INTO users (id, email, username, first_name, last_name, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(user.id.into_inner())
        .bind(user.email.as_str())
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(self.pool.inner())
        .await?;

        Ok(user)
    }

    async fn find_active_by_id(&self, id: UserId) -> StrataResult<Option<User>> {
        debug!("Finding active user by id: {}", id);

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND is_active"
        ))
        .bind(id.into_inner())
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_active_by_email(&self, email: &Email) -> StrataResult<Option<User>> {
        debug!("Finding active user by email: {}", email);

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1) AND is_active"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_active_page(&self, limit: i64, offset: i64) -> StrataResult<Vec<User>> {
        debug!("Listing active users: limit={}, offset={}", limit, offset);

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE is_active \
             ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.inner())
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn update_active(&self, id: UserId, patch: &UserPatch) -> StrataResult<u64> {
        let columns = patch.columns();
        if columns.is_empty() {
            return Ok(0);
        }
        debug!("Updating user {} ({} columns)", id, columns.len());

        // Column names come from the closed UserColumn set; values are bound.
        let mut query = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        {
            let mut assignments = query.separated(", ");
            for (column, value) in columns {
                assignments
                    .push(column.as_str())
                    .push_unseparated(" = ")
                    .push_bind_unseparated(value);
            }
            assignments
                .push("updated_at = ")
                .push_bind_unseparated(now_micros());
        }
        query
            .push(" WHERE id = ")
            .push_bind(id.into_inner())
            .push(" AND is_active");

        let result = query.build().execute(self.pool.inner()).await?;
        Ok(result.rows_affected())
    }

    async fn soft_delete(&self, id: UserId) -> StrataResult<u64> {
        debug!("Soft-deleting user {}", id);

        let result = sqlx::query(
            "UPDATE users SET is_active = FALSE, updated_at = $2 WHERE id = $1 AND is_active",
        )
        .bind(id.into_inner())
        .bind(now_micros())
        .execute(self.pool.inner())
        .await?;

        Ok(result.rows_affected())
    }

    async fn count_active(&self) -> StrataResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_active")
            .fetch_one(self.pool.inner())
            .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn ping(&self) -> StrataResult<()> {
        self.pool.health_check().await
    }
}
