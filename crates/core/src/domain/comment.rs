// Comment Domain Model

use serde::{Deserialize, Serialize};

use super::post::PostId;
use super::user::UserId;

/// Comment ID (UUID v4)
pub type CommentId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: UserId,
    pub body: String,
    pub created_at: i64,
    pub updated_at: i64,
}
