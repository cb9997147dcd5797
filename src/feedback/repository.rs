//! Handle feedback persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::{Result, ServerError};
use crate::feedback::{ContentType, Feedback, field};
use crate::patch::Patch;

/// Port for feedback persistence operations.
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn insert(&self, feedback: &Feedback) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Feedback>>;

    /// Feedback of one study, oldest first.
    async fn list_by_study(&self, study_id: &str) -> Result<Vec<Feedback>>;

    /// Feedback of every study, oldest first.
    async fn list_all(&self) -> Result<Vec<Feedback>>;

    /// Persist the fields named by `patch` and `updated_at`.
    async fn update(&self, feedback: &Feedback, patch: &Patch) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<bool>;
}

#[derive(sqlx::FromRow)]
struct FeedbackRecord {
    id: String,
    study_id: String,
    user_id: String,
    user_name: String,
    is_comment: bool,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<FeedbackRecord> for Feedback {
    fn from(record: FeedbackRecord) -> Self {
        Self {
            id: record.id,
            study_id: record.study_id,
            user_id: record.user_id,
            user_name: record.user_name,
            content_type: ContentType::from(record.is_comment),
            content: record.content,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

const FEEDBACK_COLUMNS: &str =
    "id, study_id, user_id, user_name, is_comment, content, created_at, updated_at";

/// PostgreSQL feedback repository.
#[derive(Clone)]
pub struct PgFeedbackRepository {
    pool: PgPool,
}

impl PgFeedbackRepository {
    /// Create a new [`PgFeedbackRepository`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedbackRepository for PgFeedbackRepository {
    async fn insert(&self, feedback: &Feedback) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO study_feedback (id, study_id, user_id, user_name, is_comment, content, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(&feedback.id)
        .bind(&feedback.study_id)
        .bind(&feedback.user_id)
        .bind(&feedback.user_name)
        .bind(bool::from(feedback.content_type))
        .bind(&feedback.content)
        .bind(feedback.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Feedback>> {
        let query = format!("SELECT {FEEDBACK_COLUMNS} FROM study_feedback WHERE id = $1");

        Ok(sqlx::query_as::<_, FeedbackRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Feedback::from))
    }

    async fn list_by_study(&self, study_id: &str) -> Result<Vec<Feedback>> {
        let query = format!(
            "SELECT {FEEDBACK_COLUMNS} FROM study_feedback WHERE study_id = $1 ORDER BY created_at, id"
        );

        Ok(sqlx::query_as::<_, FeedbackRecord>(&query)
            .bind(study_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Feedback::from)
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Feedback>> {
        let query =
            format!("SELECT {FEEDBACK_COLUMNS} FROM study_feedback ORDER BY created_at, id");

        Ok(sqlx::query_as::<_, FeedbackRecord>(&query)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Feedback::from)
            .collect())
    }

    async fn update(&self, feedback: &Feedback, patch: &Patch) -> Result<()> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE study_feedback SET ");
        {
            let mut set = query.separated(", ");
            set.push("updated_at = ").push_bind_unseparated(feedback.updated_at);

            for name in patch.fields() {
                match name {
                    field::CONTENT => {
                        set.push("content = ").push_bind_unseparated(&feedback.content);
                    },
                    field::CONTENT_TYPE => {
                        set.push("is_comment = ")
                            .push_bind_unseparated(bool::from(feedback.content_type));
                    },
                    other => tracing::warn!(field = other, "unknown feedback column ignored"),
                }
            }
        }
        query.push(" WHERE id = ").push_bind(&feedback.id);

        let result = query.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(ServerError::NotFound("feedback"));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM study_feedback WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
