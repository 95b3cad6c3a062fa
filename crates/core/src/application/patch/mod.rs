// Patch Service - partial updates of profiles, posts and comments
//
// Requests are validated and turned into a single UPDATE .. RETURNING
// statement, then executed in its own transaction under the retrying
// executor. The WHERE clause always pins the owner, so a mismatched
// author simply matches no row.

pub mod request;

pub use request::{CommentPatch, PostPatch, ProfilePatch};

use crate::application::retry::TransactionExecutor;
use crate::domain::{Comment, Post, Scalar, User};
use crate::error::{AppError, Result};
use crate::port::{finish, IsolationLevel, TimeProvider, TransactionalReviewRepository};
use crate::query::columns::{
    COMMENTS_TABLE, COMMENT_COLUMNS, POSTS_TABLE, POST_COLUMNS, USERS_TABLE, USER_COLUMNS,
};
use crate::query::{GeneratedStatement, PatchBuilder, PatchError};
use std::sync::Arc;
use tracing::info;

/// Patch Service
pub struct PatchService {
    repo: Arc<dyn TransactionalReviewRepository>,
    executor: Arc<TransactionExecutor>,
    time_provider: Arc<dyn TimeProvider>,
}

impl PatchService {
    pub fn new(
        repo: Arc<dyn TransactionalReviewRepository>,
        executor: Arc<TransactionExecutor>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            repo,
            executor,
            time_provider,
        }
    }

    /// Update the caller's own profile
    pub async fn patch_profile(&self, user_id: &str, patch: ProfilePatch) -> Result<User> {
        if patch.is_empty() {
            return Err(PatchError::NothingToUpdate.into());
        }
        patch.validate()?;

        let stmt = self.statement(USERS_TABLE, patch.into_fields(), &[("id", user_id)], USER_COLUMNS)?;
        let stmt = &stmt;
        let user = self
            .executor
            .run(move || self.patch_user_once(stmt))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;

        info!(user_id, "Profile updated");
        Ok(user)
    }

    /// Update a post written by `author_id`
    pub async fn patch_post(&self, author_id: &str, post_id: &str, patch: PostPatch) -> Result<Post> {
        if patch.is_empty() {
            return Err(PatchError::NothingToUpdate.into());
        }
        patch.validate()?;

        let stmt = self.statement(
            POSTS_TABLE,
            patch.into_fields(),
            &[("id", post_id), ("author_id", author_id)],
            POST_COLUMNS,
        )?;
        let stmt = &stmt;
        let post = self
            .executor
            .run(move || self.patch_post_once(stmt))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {post_id} by {author_id}")))?;

        info!(post_id, author_id, "Post updated");
        Ok(post)
    }

    /// Update a comment written by `author_id`
    pub async fn patch_comment(
        &self,
        author_id: &str,
        comment_id: &str,
        patch: CommentPatch,
    ) -> Result<Comment> {
        if patch.is_empty() {
            return Err(PatchError::NothingToUpdate.into());
        }
        patch.validate()?;

        let stmt = self.statement(
            COMMENTS_TABLE,
            patch.into_fields(),
            &[("id", comment_id), ("author_id", author_id)],
            COMMENT_COLUMNS,
        )?;
        let stmt = &stmt;
        let comment = self
            .executor
            .run(move || self.patch_comment_once(stmt))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {comment_id} by {author_id}")))?;

        info!(comment_id, author_id, "Comment updated");
        Ok(comment)
    }

    fn statement(
        &self,
        table: &str,
        fields: Vec<(&'static str, Option<Scalar>)>,
        conditions: &[(&str, &str)],
        returning: &[&str],
    ) -> Result<GeneratedStatement> {
        let mut builder = PatchBuilder::new(table);
        for (column, value) in fields {
            builder = builder.set(column, value);
        }
        builder = builder.set("updated_at", Some(Scalar::Timestamp(self.time_provider.now())));
        for (column, value) in conditions {
            builder = builder.where_eq(*column, *value);
        }
        Ok(builder.returning(returning.iter().copied()).build()?)
    }

    async fn patch_user_once(&self, stmt: &GeneratedStatement) -> Result<Option<User>> {
        let mut tx = self
            .repo
            .begin_transaction(IsolationLevel::ReadCommitted)
            .await?;
        let result = tx.patch_user(stmt).await;
        finish(tx, result).await
    }

    async fn patch_post_once(&self, stmt: &GeneratedStatement) -> Result<Option<Post>> {
        let mut tx = self
            .repo
            .begin_transaction(IsolationLevel::ReadCommitted)
            .await?;
        let result = tx.patch_post(stmt).await;
        finish(tx, result).await
    }

    async fn patch_comment_once(&self, stmt: &GeneratedStatement) -> Result<Option<Comment>> {
        let mut tx = self
            .repo
            .begin_transaction(IsolationLevel::ReadCommitted)
            .await?;
        let result = tx.patch_comment(stmt).await;
        finish(tx, result).await
    }
}
