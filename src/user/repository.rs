//! Handle user persistence.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::database::is_unique_violation;
use crate::error::{Result, ServerError};
use crate::patch::Patch;
use crate::user::{User, field};

/// Port for user persistence operations.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with [`ServerError::DuplicateEmail`] when the
    /// email is taken; the check and the insert are a single operation.
    async fn insert(&self, user: &User) -> Result<()>;

    /// Find a user using `id` field.
    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Find a user using `email` field.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Persist the fields named by `patch` and `updated_at`.
    async fn update(&self, user: &User, patch: &Patch) -> Result<()>;

    /// Hard delete a user, their owned studies and their memberships.
    async fn delete(&self, id: &str) -> Result<bool>;
}

const USER_COLUMNS: &str = "id, user_name, email, password, phone_number, intro_yn, file_key, file_name, created_at, updated_at";

/// PostgreSQL user repository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new [`PgUserRepository`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO users (id, user_name, email, password, phone_number, intro_yn, file_key, file_name, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
        )
        .bind(&user.id)
        .bind(&user.user_name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.phone_number)
        .bind(user.intro_yn)
        .bind(&user.file_key)
        .bind(&user.file_name)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ServerError::DuplicateEmail
            } else {
                err.into()
            }
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        Ok(sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        Ok(sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update(&self, user: &User, patch: &Patch) -> Result<()> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        {
            let mut set = query.separated(", ");
            set.push("updated_at = ").push_bind_unseparated(user.updated_at);

            for name in patch.fields() {
                match name {
                    field::PASSWORD => {
                        set.push("password = ").push_bind_unseparated(&user.password);
                    },
                    field::INTRO_YN => {
                        set.push("intro_yn = ").push_bind_unseparated(user.intro_yn);
                    },
                    field::PHONE_NUMBER => {
                        set.push("phone_number = ")
                            .push_bind_unseparated(&user.phone_number);
                    },
                    field::FILE_KEY => {
                        set.push("file_key = ").push_bind_unseparated(&user.file_key);
                    },
                    field::FILE_NAME => {
                        set.push("file_name = ").push_bind_unseparated(&user.file_name);
                    },
                    other => tracing::warn!(field = other, "unknown user column ignored"),
                }
            }
        }
        query.push(" WHERE id = ").push_bind(&user.id);

        let result = query.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(ServerError::NotFound("user"));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        // Owned studies, their members and feedback follow by `ON DELETE CASCADE`.
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
