mod repository;
mod service;

pub use repository::*;
pub use service::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Column names an update may touch.
pub mod field {
    pub const PASSWORD: &str = "password";
    pub const INTRO_YN: &str = "intro_yn";
    pub const PHONE_NUMBER: &str = "phone_number";
    pub const FILE_KEY: &str = "file_key";
    pub const FILE_NAME: &str = "file_name";
}

/// User as saved on database.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct User {
    pub id: String,
    pub user_name: String,
    pub email: String,
    #[serde(skip)]
    pub password: String,
    pub phone_number: Option<String>,
    pub intro_yn: bool,
    pub file_key: Option<String>,
    pub file_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// What anybody may see about a [`User`].
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub user_id: String,
    pub user_name: String,
    pub intro_yn: bool,
    pub file_key: Option<String>,
    pub file_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicProfile {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            user_name: user.user_name.clone(),
            intro_yn: user.intro_yn,
            file_key: user.file_key.clone(),
            file_name: user.file_name.clone(),
            created_at: user.created_at,
        }
    }
}

/// What a [`User`] sees about themselves.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub user_name: String,
    pub email: String,
    pub intro_yn: bool,
    pub phone_number: Option<String>,
    pub file_key: Option<String>,
    pub file_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&User> for Profile {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            user_name: user.user_name.clone(),
            email: user.email.clone(),
            intro_yn: user.intro_yn,
            phone_number: user.phone_number.clone(),
            file_key: user.file_key.clone(),
            file_name: user.file_name.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Validated sign-up input.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
}

/// Submitted profile values. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub password: Option<String>,
    pub intro_yn: Option<bool>,
    pub phone_number: Option<Option<String>>,
    pub file_key: Option<Option<String>>,
    pub file_name: Option<Option<String>>,
}
