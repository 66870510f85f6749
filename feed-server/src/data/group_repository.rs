use crate::domain::{DomainError, Group};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Group, DomainError>;
    async fn exists(&self, id: i64) -> Result<bool, DomainError>;
    async fn list(&self) -> Result<Vec<Group>, DomainError>;
}

pub struct PostgresGroupRepository {
    pool: PgPool,
}

impl PostgresGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn group_from_row(row: &PgRow) -> Result<Group, DomainError> {
    Ok(Group {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
    })
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Group, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, slug, description
            FROM groups
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => group_from_row(&row),
            None => Err(DomainError::GroupNotFound),
        }
    }

    async fn exists(&self, id: i64) -> Result<bool, DomainError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM groups WHERE id = $1) AS found")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        Ok(row.try_get("found")?)
    }

    async fn list(&self) -> Result<Vec<Group>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, slug, description
            FROM groups
            ORDER BY title, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        rows.iter().map(group_from_row).collect()
    }
}
