// SQLite ReviewRepository Implementation

use crate::error::map_sqlx_error;
use crate::rows::{CommentRow, PostRow, UserRow};
use crate::transaction::{SqliteReviewTransaction, COUNT_VOTES_SQL};
use async_trait::async_trait;
use encore_core::domain::{Comment, Post, User, VoteCounts, VoteTarget};
use encore_core::error::Result;
use encore_core::port::{
    IsolationLevel, ReviewRepository, ReviewTransaction, TransactionalReviewRepository,
};
use sqlx::SqlitePool;
use tracing::debug;

pub struct SqliteReviewRepository {
    pool: SqlitePool,
}

impl SqliteReviewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for SqliteReviewRepository {
    async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, provider_id, username, display_name, bio, avatar_url,
                role, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.provider_id)
        .bind(&user.username)
        .bind(&user.display_name)
        .bind(&user.bio)
        .bind(&user.avatar_url)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn insert_post(&self, post: &Post) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (
                id, author_id, song_id, title, body, rating, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&post.id)
        .bind(&post.author_id)
        .bind(&post.song_id)
        .bind(&post.title)
        .bind(&post.body)
        .bind(post.rating)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_post(&self, id: &str) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PostRow::into_post))
    }

    async fn list_posts_by_author(
        &self,
        author_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>> {
        let rows: Vec<PostRow> = sqlx::query_as(
            r#"
            SELECT * FROM posts
            WHERE author_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostRow::into_post).collect())
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, post_id, author_id, body, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.post_id)
        .bind(&comment.author_id)
        .bind(&comment.body)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_comment(&self, id: &str) -> Result<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>("SELECT * FROM comments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(CommentRow::into_comment))
    }

    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>> {
        let rows: Vec<CommentRow> = sqlx::query_as(
            "SELECT * FROM comments WHERE post_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(CommentRow::into_comment).collect())
    }

    async fn vote_counts(&self, target: &VoteTarget) -> Result<VoteCounts> {
        let (likes, dislikes): (i64, i64) = sqlx::query_as(COUNT_VOTES_SQL)
            .bind(target.type_str())
            .bind(target.id())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(VoteCounts { likes, dislikes })
    }
}

#[async_trait]
impl TransactionalReviewRepository for SqliteReviewRepository {
    /// SQLite transactions are always serializable, so every requested
    /// level is satisfied by a deferred BEGIN. Write conflicts surface as
    /// BUSY / BUSY_SNAPSHOT and are classified as transient.
    async fn begin_transaction(
        &self,
        isolation: IsolationLevel,
    ) -> Result<Box<dyn ReviewTransaction>> {
        debug!(isolation = %isolation, "Beginning transaction");
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(SqliteReviewTransaction::new(tx, isolation)))
    }
}
