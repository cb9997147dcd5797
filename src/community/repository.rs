//! Handle community post persistence.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::community::{Post, field};
use crate::error::{Result, ServerError};
use crate::patch::Patch;

/// Port for post persistence operations.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, post: &Post) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>>;

    /// Every post, newest first.
    async fn list(&self) -> Result<Vec<Post>>;

    /// Persist the fields named by `patch` and `updated_at`.
    async fn update(&self, post: &Post, patch: &Patch) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<bool>;
}

const POST_COLUMNS: &str = "id, user_id, user_name, title, content, created_at, updated_at";

/// PostgreSQL community post repository.
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    /// Create a new [`PgPostRepository`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn insert(&self, post: &Post) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO community_posts (id, user_id, user_name, title, content, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(&post.id)
        .bind(&post.user_id)
        .bind(&post.user_name)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Post>> {
        let query = format!("SELECT {POST_COLUMNS} FROM community_posts WHERE id = $1");

        Ok(sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list(&self) -> Result<Vec<Post>> {
        let query =
            format!("SELECT {POST_COLUMNS} FROM community_posts ORDER BY created_at DESC, id");

        Ok(sqlx::query_as::<_, Post>(&query).fetch_all(&self.pool).await?)
    }

    async fn update(&self, post: &Post, patch: &Patch) -> Result<()> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE community_posts SET ");
        {
            let mut set = query.separated(", ");
            set.push("updated_at = ").push_bind_unseparated(post.updated_at);

            for name in patch.fields() {
                match name {
                    field::TITLE => {
                        set.push("title = ").push_bind_unseparated(&post.title);
                    },
                    field::CONTENT => {
                        set.push("content = ").push_bind_unseparated(&post.content);
                    },
                    other => tracing::warn!(field = other, "unknown post column ignored"),
                }
            }
        }
        query.push(" WHERE id = ").push_bind(&post.id);

        let result = query.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(ServerError::NotFound("post"));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM community_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
