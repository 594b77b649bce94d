//! Post metadata persistence.
//!
//! Handlers talk to [`SqlStorage`] so tests can swap `PostgreSQL` for an
//! in-memory implementation. [`PgStorage`] is the production backend.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::future::Future;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::config::Config;

/// Initialize a `PostgreSQL` connection pool.
pub async fn create_pool(config: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections())
        .connect(config.database_url())
        .await?;

    tracing::info!("Database connection pool established");

    Ok(pool)
}

/// Create the `posts` table and its index if they do not exist yet.
pub async fn run_migrations(pool: &PgPool) -> Result<(), SqlStorageError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id UUID PRIMARY KEY,
            caption TEXT,
            url TEXT NOT NULL,
            file_type TEXT NOT NULL,
            file_name TEXT NOT NULL UNIQUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_posts_created_at_id ON posts (created_at DESC, id DESC)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migrations completed");
    Ok(())
}

/// One stored upload.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub caption: Option<String>,
    pub url: String,
    pub file_type: String,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

/// A fully formed record ready for insertion.
///
/// Identifier and timestamp are assigned by the caller, not the database.
#[derive(Debug, Clone)]
pub struct PostInsert {
    pub id: Uuid,
    pub caption: Option<String>,
    pub url: String,
    pub file_type: String,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<PostInsert> for PostRow {
    fn from(input: PostInsert) -> Self {
        Self {
            id: input.id,
            caption: input.caption,
            url: input.url,
            file_type: input.file_type,
            file_name: input.file_name,
            created_at: input.created_at,
        }
    }
}

/// Window into the feed, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedParams {
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum SqlStorageError {
    #[error("database error: {0}")]
    Db(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<sqlx::Error> for SqlStorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Conflict(db.message().to_owned())
            }
            _ => Self::Db(err.to_string()),
        }
    }
}

pub trait SqlStorage: Clone + Send + Sync + 'static {
    fn is_connected(&self) -> impl Future<Output = bool> + Send;

    fn posts_insert(
        &self,
        input: PostInsert,
    ) -> impl Future<Output = Result<PostRow, SqlStorageError>> + Send;

    /// Posts newest first, sliced to `params`.
    ///
    /// Ties on `created_at` are broken by `id` descending so pages never
    /// overlap.
    fn posts_list(
        &self,
        params: FeedParams,
    ) -> impl Future<Output = Result<Vec<PostRow>, SqlStorageError>> + Send;

    /// Total number of posts, independent of any window.
    fn posts_count(&self) -> impl Future<Output = Result<i64, SqlStorageError>> + Send;
}

#[derive(Clone)]
pub struct PgStorage {
    pub pool: PgPool,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SqlStorage for PgStorage {
    async fn is_connected(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    async fn posts_insert(&self, input: PostInsert) -> Result<PostRow, SqlStorageError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (id, caption, url, file_type, file_name, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, caption, url, file_type, file_name, created_at
            "#,
        )
        .bind(input.id)
        .bind(input.caption)
        .bind(input.url)
        .bind(input.file_type)
        .bind(input.file_name)
        .bind(input.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn posts_list(&self, params: FeedParams) -> Result<Vec<PostRow>, SqlStorageError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, caption, url, file_type, file_name, created_at
            FROM posts
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(params.limit)
        .bind(params.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn posts_count(&self) -> Result<i64, SqlStorageError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }
}

/// In-memory implementation of `SqlStorage` for tests.
///
/// Failure switches let tests drive the error paths of the handlers.
#[derive(Clone)]
pub struct MockSqlStorage {
    posts: Arc<RwLock<Vec<PostRow>>>,
    pub is_connected: bool,
    pub fail_inserts: bool,
    pub fail_reads: bool,
}

impl MockSqlStorage {
    pub fn new() -> Self {
        Self {
            posts: Arc::default(),
            is_connected: true,
            fail_inserts: false,
            fail_reads: false,
        }
    }

    pub fn disconnected() -> Self {
        Self {
            is_connected: false,
            ..Self::new()
        }
    }

    /// Every insert fails with a database error naming the mock.
    pub fn failing_inserts() -> Self {
        Self {
            fail_inserts: true,
            ..Self::new()
        }
    }

    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::new()
        }
    }

    pub fn with_posts(self, posts: impl IntoIterator<Item = PostRow>) -> Self {
        self.posts.write().expect("lock poisoned").extend(posts);
        self
    }

    pub fn posts(&self) -> Vec<PostRow> {
        self.posts.read().expect("lock poisoned").clone()
    }

    pub fn len(&self) -> usize {
        self.posts.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MockSqlStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlStorage for MockSqlStorage {
    async fn is_connected(&self) -> bool {
        self.is_connected
    }

    async fn posts_insert(&self, input: PostInsert) -> Result<PostRow, SqlStorageError> {
        if self.fail_inserts {
            return Err(SqlStorageError::Db(
                "MockSqlStorage.posts_insert: connection reset by peer".to_owned(),
            ));
        }

        let mut posts = self.posts.write().expect("lock poisoned");
        if posts.iter().any(|p| p.file_name == input.file_name) {
            return Err(SqlStorageError::Conflict(input.file_name));
        }

        let row = PostRow::from(input);
        posts.push(row.clone());
        Ok(row)
    }

    async fn posts_list(&self, params: FeedParams) -> Result<Vec<PostRow>, SqlStorageError> {
        if self.fail_reads {
            return Err(SqlStorageError::Db(
                "MockSqlStorage.posts_list: relation \"posts\" does not exist".to_owned(),
            ));
        }

        let mut posts = self.posts();
        posts.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        let offset = usize::try_from(params.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(params.limit).unwrap_or(0);
        Ok(posts.into_iter().skip(offset).take(limit).collect())
    }

    async fn posts_count(&self) -> Result<i64, SqlStorageError> {
        if self.fail_reads {
            return Err(SqlStorageError::Db(
                "MockSqlStorage.posts_count: relation \"posts\" does not exist".to_owned(),
            ));
        }

        Ok(self.len() as i64)
    }
}
