// Review Repository Port (Interface)

use crate::domain::{Comment, Post, User, VoteCounts, VoteTarget};
use crate::error::Result;
use async_trait::async_trait;

/// Plain reads and inserts that need no read-modify-write protection
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn insert_user(&self, user: &User) -> Result<()>;

    async fn find_user(&self, id: &str) -> Result<Option<User>>;

    async fn insert_post(&self, post: &Post) -> Result<()>;

    async fn find_post(&self, id: &str) -> Result<Option<Post>>;

    /// Posts by one author, newest first
    async fn list_posts_by_author(&self, author_id: &str, limit: i64, offset: i64)
        -> Result<Vec<Post>>;

    async fn insert_comment(&self, comment: &Comment) -> Result<()>;

    async fn find_comment(&self, id: &str) -> Result<Option<Comment>>;

    /// Comments on a post, oldest first
    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>>;

    async fn vote_counts(&self, target: &VoteTarget) -> Result<VoteCounts>;
}
