// Post Domain Model

use serde::{Deserialize, Serialize};

use super::user::UserId;
use super::vote::VoteCounts;

/// Post ID (UUID v4)
pub type PostId = String;

/// Lowest and highest song rating a post may carry
pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 10;

/// A song review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    /// Track identifier on the external music service
    pub song_id: String,
    pub title: String,
    pub body: Option<String>,
    pub rating: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Post together with its aggregated votes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub votes: VoteCounts,
}

pub fn validate_rating(rating: i64) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}
