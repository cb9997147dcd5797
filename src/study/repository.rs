//! Handle study and membership persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::{Result, ServerError};
use crate::patch::Patch;
use crate::study::{Member, MemberStatus, Study, field};

/// Port for study persistence operations.
#[async_trait]
pub trait StudyRepository: Send + Sync {
    /// Insert a study with its initial members.
    async fn insert(&self, study: &Study) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Study>>;

    /// Every study, oldest first.
    async fn list(&self) -> Result<Vec<Study>>;

    /// Persist the fields named by `patch` and `updated_at`.
    async fn update(&self, study: &Study, patch: &Patch) -> Result<()>;

    /// Delete a study with its members and feedback.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Add a membership. Returns `false` if the user already holds one.
    async fn add_member(&self, study_id: &str, member: &Member) -> Result<bool>;

    /// Turn a pending application into an accepted membership.
    ///
    /// Capacity is checked in the same write: fails with
    /// [`ServerError::Conflict`] when the study is full and with
    /// [`ServerError::NotFound`] when no application is pending.
    async fn accept_member(&self, study_id: &str, user_id: &str) -> Result<()>;

    /// Remove a membership. Returns `false` if there was none.
    async fn remove_member(&self, study_id: &str, user_id: &str) -> Result<bool>;
}

#[derive(sqlx::FromRow)]
struct StudyRecord {
    id: String,
    owner_id: String,
    title: String,
    description: String,
    capacity: i32,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow)]
struct MemberRecord {
    study_id: String,
    user_id: String,
    status: String,
    applied_at: DateTime<Utc>,
}

impl MemberRecord {
    fn try_into_member(self) -> Result<Member> {
        let status = MemberStatus::parse(&self.status).ok_or_else(|| {
            ServerError::Internal {
                details: format!("unknown membership status {:?}", self.status),
                source: None,
            }
        })?;

        Ok(Member {
            user_id: self.user_id,
            status,
            applied_at: self.applied_at,
        })
    }
}

/// Join study rows with their member rows.
fn assemble(studies: Vec<StudyRecord>, members: Vec<MemberRecord>) -> Result<Vec<Study>> {
    let mut studies: Vec<Study> = studies
        .into_iter()
        .map(|record| Study {
            id: record.id,
            owner_id: record.owner_id,
            title: record.title,
            description: record.description,
            capacity: record.capacity,
            members: Vec::new(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
        .collect();

    for record in members {
        if let Some(study) = studies.iter_mut().find(|s| s.id == record.study_id) {
            study.members.push(record.try_into_member()?);
        }
    }

    Ok(studies)
}

const STUDY_COLUMNS: &str = "id, owner_id, title, description, capacity, created_at, updated_at";
const MEMBER_COLUMNS: &str = "study_id, user_id, status, applied_at";

/// PostgreSQL study repository.
#[derive(Clone)]
pub struct PgStudyRepository {
    pool: PgPool,
}

impl PgStudyRepository {
    /// Create a new [`PgStudyRepository`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudyRepository for PgStudyRepository {
    async fn insert(&self, study: &Study) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO studies (id, owner_id, title, description, capacity, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(&study.id)
        .bind(&study.owner_id)
        .bind(&study.title)
        .bind(&study.description)
        .bind(study.capacity)
        .bind(study.created_at)
        .execute(&mut *tx)
        .await?;

        for member in &study.members {
            sqlx::query(
                r#"INSERT INTO study_members (study_id, user_id, status, applied_at)
                    VALUES ($1, $2, $3, $4)"#,
            )
            .bind(&study.id)
            .bind(&member.user_id)
            .bind(member.status.as_str())
            .bind(member.applied_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Study>> {
        let query = format!("SELECT {STUDY_COLUMNS} FROM studies WHERE id = $1");
        let Some(study) = sqlx::query_as::<_, StudyRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM study_members WHERE study_id = $1 ORDER BY applied_at"
        );
        let members = sqlx::query_as::<_, MemberRecord>(&query)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        Ok(assemble(vec![study], members)?.pop())
    }

    async fn list(&self) -> Result<Vec<Study>> {
        let query = format!("SELECT {STUDY_COLUMNS} FROM studies ORDER BY created_at, id");
        let studies = sqlx::query_as::<_, StudyRecord>(&query)
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<String> = studies.iter().map(|s| s.id.clone()).collect();
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM study_members WHERE study_id = ANY($1) ORDER BY applied_at"
        );
        let members = sqlx::query_as::<_, MemberRecord>(&query)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

        assemble(studies, members)
    }

    async fn update(&self, study: &Study, patch: &Patch) -> Result<()> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE studies SET ");
        {
            let mut set = query.separated(", ");
            set.push("updated_at = ").push_bind_unseparated(study.updated_at);

            for name in patch.fields() {
                match name {
                    field::TITLE => {
                        set.push("title = ").push_bind_unseparated(&study.title);
                    },
                    field::DESCRIPTION => {
                        set.push("description = ")
                            .push_bind_unseparated(&study.description);
                    },
                    field::CAPACITY => {
                        set.push("capacity = ").push_bind_unseparated(study.capacity);
                    },
                    other => tracing::warn!(field = other, "unknown study column ignored"),
                }
            }
        }
        query.push(" WHERE id = ").push_bind(&study.id);

        let result = query.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(ServerError::NotFound("study"));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        // Members and feedback follow by `ON DELETE CASCADE`.
        let result = sqlx::query("DELETE FROM studies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn add_member(&self, study_id: &str, member: &Member) -> Result<bool> {
        let result = sqlx::query(
            r#"INSERT INTO study_members (study_id, user_id, status, applied_at)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (study_id, user_id) DO NOTHING"#,
        )
        .bind(study_id)
        .bind(&member.user_id)
        .bind(member.status.as_str())
        .bind(member.applied_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn accept_member(&self, study_id: &str, user_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent accepts of the same study.
        let capacity: i32 =
            sqlx::query_scalar("SELECT capacity FROM studies WHERE id = $1 FOR UPDATE")
                .bind(study_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(ServerError::NotFound("study"))?;

        let accepted: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM study_members WHERE study_id = $1 AND status = $2",
        )
        .bind(study_id)
        .bind(MemberStatus::Accepted.as_str())
        .fetch_one(&mut *tx)
        .await?;
        if accepted >= i64::from(capacity) {
            return Err(ServerError::Conflict("study is full"));
        }

        let result = sqlx::query(
            r#"UPDATE study_members SET status = $3
                WHERE study_id = $1 AND user_id = $2 AND status = $4"#,
        )
        .bind(study_id)
        .bind(user_id)
        .bind(MemberStatus::Accepted.as_str())
        .bind(MemberStatus::Pending.as_str())
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() != 1 {
            return Err(ServerError::NotFound("application"));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn remove_member(&self, study_id: &str, user_id: &str) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM study_members WHERE study_id = $1 AND user_id = $2",
        )
        .bind(study_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
