mod repository;
mod service;

pub use repository::*;
pub use service::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Column names an update may touch.
pub mod field {
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const CAPACITY: &str = "capacity";
}

/// State of a membership.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    /// Applied, waiting for the owner.
    Pending,
    /// Accepted by the owner.
    Accepted,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Pending => "pending",
            MemberStatus::Accepted => "accepted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(MemberStatus::Pending),
            "accepted" => Some(MemberStatus::Accepted),
            _ => None,
        }
    }
}

/// One user's membership in a [`Study`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: String,
    pub status: MemberStatus,
    pub applied_at: DateTime<Utc>,
}

/// Study group.
///
/// The owner is always an accepted member. A user appears at most once in
/// `members`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Study {
    #[serde(rename = "study_id")]
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    /// Maximum number of accepted members, owner included.
    pub capacity: i32,
    pub members: Vec<Member>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Study {
    /// Membership of `user_id`, if any.
    pub fn member(&self, user_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    /// Whether `user_id` is an accepted member.
    pub fn is_accepted(&self, user_id: &str) -> bool {
        self.member(user_id)
            .is_some_and(|m| m.status == MemberStatus::Accepted)
    }

    pub fn accepted_count(&self) -> usize {
        self.members
            .iter()
            .filter(|m| m.status == MemberStatus::Accepted)
            .count()
    }

    /// Whether no more members can be accepted.
    pub fn is_full(&self) -> bool {
        self.accepted_count() >= self.seats()
    }

    /// Whether more members are accepted than `capacity` allows.
    pub fn is_over_capacity(&self) -> bool {
        self.accepted_count() > self.seats()
    }

    fn seats(&self) -> usize {
        usize::try_from(self.capacity).unwrap_or_default()
    }
}

/// Validated study creation input.
#[derive(Debug, Clone)]
pub struct NewStudy {
    pub title: String,
    pub description: String,
    pub capacity: i32,
}

/// Submitted study values. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct StudyChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub capacity: Option<i32>,
}
