mod repository;
mod service;

pub use repository::*;
pub use service::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Column names an update may touch.
pub mod field {
    pub const CONTENT: &str = "content";
    pub const CONTENT_TYPE: &str = "content_type";
}

/// Kind of a feedback entry, `false` (post) or `true` (comment) on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum ContentType {
    #[default]
    Post,
    Comment,
}

impl From<bool> for ContentType {
    fn from(is_comment: bool) -> Self {
        if is_comment {
            ContentType::Comment
        } else {
            ContentType::Post
        }
    }
}

impl From<ContentType> for bool {
    fn from(kind: ContentType) -> Self {
        kind == ContentType::Comment
    }
}

/// Feedback entry posted in a study thread.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(rename = "feedback_id")]
    pub id: String,
    pub study_id: String,
    pub user_id: String,
    /// Author name when the entry was written.
    pub user_name: String,
    pub content_type: ContentType,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Validated feedback creation input.
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub study_id: String,
    pub content_type: ContentType,
    pub content: String,
}

/// Submitted feedback values. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct FeedbackChanges {
    pub content: Option<String>,
    pub content_type: Option<ContentType>,
}
