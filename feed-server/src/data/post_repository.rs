use crate::domain::group::GroupSummary;
use crate::domain::post::{PostDraft, PostFilter};
use crate::domain::user::Author;
use crate::domain::{DomainError, Post};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, author_id: i64, draft: PostDraft) -> Result<Post, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Post, DomainError>;
    async fn update(&self, id: i64, draft: PostDraft) -> Result<Post, DomainError>;
    async fn count(&self, filter: PostFilter) -> Result<i64, DomainError>;
    /// Newest first: by publication date, then by id.
    async fn list(
        &self,
        filter: PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, DomainError>;
}

pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_POSTS: &str = r#"
    SELECT p.id, p.text, p.pub_date,
           p.author_id, u.username AS author_username,
           p.group_id, g.title AS group_title, g.slug AS group_slug
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN groups g ON g.id = p.group_id
"#;

fn post_from_row(row: &PgRow) -> Result<Post, DomainError> {
    let group_id: Option<i64> = row.try_get("group_id")?;
    let group_title: Option<String> = row.try_get("group_title")?;
    let group_slug: Option<String> = row.try_get("group_slug")?;

    let group = match (group_id, group_title, group_slug) {
        (Some(id), Some(title), Some(slug)) => Some(GroupSummary { id, title, slug }),
        _ => None,
    };

    Ok(Post {
        id: row.try_get("id")?,
        text: row.try_get("text")?,
        pub_date: row.try_get("pub_date")?,
        author: Author {
            id: row.try_get("author_id")?,
            username: row.try_get("author_username")?,
        },
        group,
    })
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: PostFilter) {
    match filter {
        PostFilter::All => {}
        PostFilter::Group(group_id) => {
            query.push(" WHERE p.group_id = ").push_bind(group_id);
        }
        PostFilter::Author(author_id) => {
            query.push(" WHERE p.author_id = ").push_bind(author_id);
        }
    }
}

// Foreign key violations mean the referenced author or group is gone.
fn map_write_error(err: sqlx::Error) -> DomainError {
    let constraint = err
        .as_database_error()
        .and_then(|db| db.constraint())
        .map(str::to_owned);

    match constraint.as_deref() {
        Some("posts_author_id_fkey") => DomainError::UserNotFound,
        Some("posts_group_id_fkey") => DomainError::GroupNotFound,
        _ => {
            tracing::error!("Failed to write post: {}", err);
            DomainError::DatabaseError(err.to_string())
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, author_id: i64, draft: PostDraft) -> Result<Post, DomainError> {
        let row = sqlx::query(
            r#"
            WITH p AS (
                INSERT INTO posts (text, author_id, group_id, pub_date)
                VALUES ($1, $2, $3, NOW())
                RETURNING id, text, pub_date, author_id, group_id
            )
            SELECT p.id, p.text, p.pub_date,
                   p.author_id, u.username AS author_username,
                   p.group_id, g.title AS group_title, g.slug AS group_slug
            FROM p
            JOIN users u ON u.id = p.author_id
            LEFT JOIN groups g ON g.id = p.group_id
            "#,
        )
        .bind(&draft.text)
        .bind(author_id)
        .bind(draft.group_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        post_from_row(&row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Post, DomainError> {
        let mut query = QueryBuilder::<Postgres>::new(SELECT_POSTS);
        query.push(" WHERE p.id = ").push_bind(id);

        let row = query
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => post_from_row(&row),
            None => Err(DomainError::PostNotFound),
        }
    }

    async fn update(&self, id: i64, draft: PostDraft) -> Result<Post, DomainError> {
        let row = sqlx::query(
            r#"
            WITH p AS (
                UPDATE posts
                SET text = $1, group_id = $2
                WHERE id = $3
                RETURNING id, text, pub_date, author_id, group_id
            )
            SELECT p.id, p.text, p.pub_date,
                   p.author_id, u.username AS author_username,
                   p.group_id, g.title AS group_title, g.slug AS group_slug
            FROM p
            JOIN users u ON u.id = p.author_id
            LEFT JOIN groups g ON g.id = p.group_id
            "#,
        )
        .bind(&draft.text)
        .bind(draft.group_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        match row {
            Some(row) => post_from_row(&row),
            None => Err(DomainError::PostNotFound),
        }
    }

    async fn count(&self, filter: PostFilter) -> Result<i64, DomainError> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) AS count FROM posts p");
        push_filter(&mut query, filter);

        let row = query
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        Ok(row.try_get("count")?)
    }

    async fn list(
        &self,
        filter: PostFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>, DomainError> {
        let mut query = QueryBuilder::<Postgres>::new(SELECT_POSTS);
        push_filter(&mut query, filter);
        query
            .push(" ORDER BY p.pub_date DESC, p.id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        rows.iter().map(post_from_row).collect()
    }
}
