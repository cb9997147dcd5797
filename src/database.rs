//! database (db) union structure.
mod memory;

pub use memory::MemoryStore;

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::postgres::PgPoolOptions;

use crate::AppState;
use crate::community::{PgPostRepository, PostRepository};
use crate::feedback::{FeedbackRepository, PgFeedbackRepository};
use crate::study::{PgStudyRepository, StudyRepository};
use crate::user::{PgUserRepository, UserRepository};

pub const DEFAULT_CREDENTIALS: &str = "postgres";
pub const DEFAULT_DATABASE_NAME: &str = "interview_king";
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// PostgreSQL error code for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Repositories of every collection, shared with Axum.
#[derive(Clone)]
pub struct Database {
    pub users: Arc<dyn UserRepository>,
    pub studies: Arc<dyn StudyRepository>,
    pub feedback: Arc<dyn FeedbackRepository>,
    pub posts: Arc<dyn PostRepository>,
}

impl Database {
    /// Init PostgreSQL connections and run pending migrations.
    pub async fn postgres(
        hostname: &str,
        username: &str,
        password: &str,
        db: &str,
        pool: u32,
    ) -> Result<Self, sqlx::Error> {
        let addr = format!("postgres://{username}:{password}@{hostname}/{db}");
        let pool = PgPoolOptions::new().max_connections(pool);
        let postgres = pool.connect(&addr).await?;

        tracing::info!(%hostname, %db, "postgres connected");

        sqlx::migrate!().run(&postgres).await?;

        Ok(Self {
            users: Arc::new(PgUserRepository::new(postgres.clone())),
            studies: Arc::new(PgStudyRepository::new(postgres.clone())),
            feedback: Arc::new(PgFeedbackRepository::new(postgres.clone())),
            posts: Arc::new(PgPostRepository::new(postgres)),
        })
    }

    /// Keep every record in process memory.
    pub fn memory() -> Self {
        Self::from(MemoryStore::default())
    }
}

impl From<MemoryStore> for Database {
    fn from(store: MemoryStore) -> Self {
        Self {
            users: Arc::new(store.clone()),
            studies: Arc::new(store.clone()),
            feedback: Arc::new(store.clone()),
            posts: Arc::new(store),
        }
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(app_state: &AppState) -> Database {
        app_state.db.clone()
    }
}

/// Whether `err` reports a `UNIQUE` constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_detection() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!is_unique_violation(&sqlx::Error::PoolTimedOut));
    }
}
