// Vote Domain Model

use serde::{Deserialize, Serialize};

use super::user::UserId;

/// Like or dislike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteKind {
    Like,
    Dislike,
}

impl VoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteKind::Like => "LIKE",
            VoteKind::Dislike => "DISLIKE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LIKE" => Some(VoteKind::Like),
            "DISLIKE" => Some(VoteKind::Dislike),
            _ => None,
        }
    }
}

impl std::fmt::Display for VoteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a vote is attached to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "target_type", content = "target_id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoteTarget {
    Post(String),
    Comment(String),
}

impl VoteTarget {
    pub fn type_str(&self) -> &'static str {
        match self {
            VoteTarget::Post(_) => "POST",
            VoteTarget::Comment(_) => "COMMENT",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            VoteTarget::Post(id) | VoteTarget::Comment(id) => id,
        }
    }
}

impl std::fmt::Display for VoteTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.type_str(), self.id())
    }
}

/// A single user's vote on a target. At most one per (user, target).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub user_id: UserId,
    pub target: VoteTarget,
    pub kind: VoteKind,
    pub created_at: i64,
}

/// Aggregated votes for one target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCounts {
    pub likes: i64,
    pub dislikes: i64,
}

impl VoteCounts {
    pub fn total(&self) -> i64 {
        self.likes + self.dislikes
    }
}
