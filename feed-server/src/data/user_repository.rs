use crate::domain::{DomainError, User};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

/// Read access to the accounts table owned by the auth subsystem.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<User, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<User, DomainError>;
}

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> Result<User, DomainError> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        date_joined: row.try_get("date_joined")?,
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<User, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, date_joined
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => user_from_row(&row),
            None => Err(DomainError::UserNotFound),
        }
    }

    async fn find_by_id(&self, id: i64) -> Result<User, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, date_joined
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => user_from_row(&row),
            None => Err(DomainError::UserNotFound),
        }
    }
}
