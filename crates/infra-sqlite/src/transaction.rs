// SQLite Transaction Implementation

use crate::bind::bind_scalars;
use crate::error::{map_insert_race, map_sqlx_error};
use crate::rows::{CommentRow, PostRow, UserRow, VoteRow};
use async_trait::async_trait;
use encore_core::domain::{Comment, Post, User, Vote, VoteCounts, VoteKind, VoteTarget};
use encore_core::error::{AppError, Result};
use encore_core::port::{IsolationLevel, ReviewTransaction, Transaction};
use encore_core::query::GeneratedStatement;
use sqlx::{Sqlite, Transaction as SqlxTransaction};
use tracing::debug;

pub struct SqliteReviewTransaction {
    tx: SqlxTransaction<'static, Sqlite>,
    isolation: IsolationLevel,
}

impl SqliteReviewTransaction {
    pub fn new(tx: SqlxTransaction<'static, Sqlite>, isolation: IsolationLevel) -> Self {
        Self { tx, isolation }
    }

    pub fn isolation(&self) -> IsolationLevel {
        self.isolation
    }
}

#[async_trait]
impl Transaction for SqliteReviewTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        debug!(isolation = %self.isolation, "Rolling back transaction");
        self.tx.rollback().await.map_err(map_sqlx_error)?;
        Ok(())
    }
}

#[async_trait]
impl ReviewTransaction for SqliteReviewTransaction {
    async fn target_exists(&mut self, target: &VoteTarget) -> Result<bool> {
        let sql = match target {
            VoteTarget::Post(_) => "SELECT EXISTS(SELECT 1 FROM posts WHERE id = ?)",
            VoteTarget::Comment(_) => "SELECT EXISTS(SELECT 1 FROM comments WHERE id = ?)",
        };

        let exists: i64 = sqlx::query_scalar(sql)
            .bind(target.id())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        Ok(exists != 0)
    }

    async fn find_vote(&mut self, user_id: &str, target: &VoteTarget) -> Result<Option<Vote>> {
        let row = sqlx::query_as::<_, VoteRow>(
            r#"
            SELECT user_id, target_type, target_id, kind, created_at
            FROM votes
            WHERE user_id = ? AND target_type = ? AND target_id = ?
            "#,
        )
        .bind(user_id)
        .bind(target.type_str())
        .bind(target.id())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        row.map(VoteRow::into_vote).transpose()
    }

    async fn insert_vote(&mut self, vote: &Vote) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO votes (user_id, target_type, target_id, kind, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&vote.user_id)
        .bind(vote.target.type_str())
        .bind(vote.target.id())
        .bind(vote.kind.as_str())
        .bind(vote.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_insert_race)?;

        Ok(())
    }

    async fn update_vote(&mut self, user_id: &str, target: &VoteTarget, kind: VoteKind) -> Result<()> {
        let result = sqlx::query(
            "UPDATE votes SET kind = ? WHERE user_id = ? AND target_type = ? AND target_id = ?",
        )
        .bind(kind.as_str())
        .bind(user_id)
        .bind(target.type_str())
        .bind(target.id())
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        // Row vanished since it was read: a concurrent remove won
        if result.rows_affected() == 0 {
            return Err(AppError::TransientConflict(format!(
                "vote by {user_id} on {target} removed concurrently"
            )));
        }
        Ok(())
    }

    async fn delete_vote(&mut self, user_id: &str, target: &VoteTarget) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM votes WHERE user_id = ? AND target_type = ? AND target_id = ?",
        )
        .bind(user_id)
        .bind(target.type_str())
        .bind(target.id())
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn vote_counts(&mut self, target: &VoteTarget) -> Result<VoteCounts> {
        let (likes, dislikes): (i64, i64) = sqlx::query_as(COUNT_VOTES_SQL)
            .bind(target.type_str())
            .bind(target.id())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(VoteCounts { likes, dislikes })
    }

    async fn patch_user(&mut self, stmt: &GeneratedStatement) -> Result<Option<User>> {
        debug!(sql = %stmt.text, args = stmt.args.len(), "Patching user");
        let row = bind_scalars(sqlx::query_as::<_, UserRow>(&stmt.text), &stmt.args)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        row.map(UserRow::into_user).transpose()
    }

    async fn patch_post(&mut self, stmt: &GeneratedStatement) -> Result<Option<Post>> {
        debug!(sql = %stmt.text, args = stmt.args.len(), "Patching post");
        let row = bind_scalars(sqlx::query_as::<_, PostRow>(&stmt.text), &stmt.args)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(PostRow::into_post))
    }

    async fn patch_comment(&mut self, stmt: &GeneratedStatement) -> Result<Option<Comment>> {
        debug!(sql = %stmt.text, args = stmt.args.len(), "Patching comment");
        let row = bind_scalars(sqlx::query_as::<_, CommentRow>(&stmt.text), &stmt.args)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(CommentRow::into_comment))
    }
}

pub(crate) const COUNT_VOTES_SQL: &str = r#"
    SELECT
        COALESCE(SUM(CASE WHEN kind = 'LIKE' THEN 1 ELSE 0 END), 0) AS likes,
        COALESCE(SUM(CASE WHEN kind = 'DISLIKE' THEN 1 ELSE 0 END), 0) AS dislikes
    FROM votes
    WHERE target_type = ? AND target_id = ?
"#;
