// Vote Service - like / dislike / remove-vote under retry
//
// Each call is one unit of work: begin (repeatable read) -> read existing
// vote -> reject duplicate -> write -> re-read counts -> commit. Conflicts
// with concurrent voters are retried from the top by the executor.


use crate::application::retry::TransactionExecutor;
use crate::domain::{Vote, VoteCounts, VoteKind, VoteTarget};
use crate::error::{AppError, Result};
use crate::port::{
    finish, IsolationLevel, ReviewTransaction, TimeProvider, TransactionalReviewRepository,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Vote Service
pub struct VoteService {
    repo: Arc<dyn TransactionalReviewRepository>,
    executor: Arc<TransactionExecutor>,
    time_provider: Arc<dyn TimeProvider>,
}

impl VoteService {
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

    pub async fn like(&self, user_id: &str, target: &VoteTarget) -> Result<VoteCounts> {
        self.cast(user_id, target, VoteKind::Like).await
    }

    pub async fn dislike(&self, user_id: &str, target: &VoteTarget) -> Result<VoteCounts> {
        self.cast(user_id, target, VoteKind::Dislike).await
    }

    /// Cast a vote, flipping an opposite vote if one exists
    pub async fn cast(&self, user_id: &str, target: &VoteTarget, kind: VoteKind) -> Result<VoteCounts> {
        let counts = self
            .executor
            .run(move || self.cast_once(user_id, target, kind))
            .await?;

        info!(user_id, target = %target, kind = %kind, likes = counts.likes, dislikes = counts.dislikes, "Vote cast");
        Ok(counts)
    }

    /// Withdraw the caller's vote on a target
    pub async fn remove_vote(&self, user_id: &str, target: &VoteTarget) -> Result<VoteCounts> {
        let counts = self
            .executor
            .run(move || self.remove_once(user_id, target))
            .await?;

        info!(user_id, target = %target, "Vote removed");
        Ok(counts)
    }

    async fn cast_once(&self, user_id: &str, target: &VoteTarget, kind: VoteKind) -> Result<VoteCounts> {
        let mut tx = self
            .repo
            .begin_transaction(IsolationLevel::RepeatableRead)
            .await?;
        let result = self.cast_in(tx.as_mut(), user_id, target, kind).await;
        finish(tx, result).await
    }

    async fn cast_in(
        &self,
        tx: &mut dyn ReviewTransaction,
        user_id: &str,
        target: &VoteTarget,
        kind: VoteKind,
    ) -> Result<VoteCounts> {
        if !tx.target_exists(target).await? {
            return Err(AppError::NotFound(format!("{target}")));
        }

        match tx.find_vote(user_id, target).await? {
            Some(existing) if existing.kind == kind => {
                return Err(AppError::Duplicate(format!(
                    "{} already {}d by {user_id}",
                    target,
                    kind.as_str().to_lowercase()
                )));
            }
            Some(existing) => {
                debug!(user_id, target = %target, from = %existing.kind, to = %kind, "Flipping vote");
                tx.update_vote(user_id, target, kind).await?;
            }
            None => {
                let vote = Vote {
                    user_id: user_id.to_string(),
                    target: target.clone(),
                    kind,
                    created_at: self.time_provider.now_millis(),
                };
                tx.insert_vote(&vote).await?;
            }
        }

        tx.vote_counts(target).await
    }

    async fn remove_once(&self, user_id: &str, target: &VoteTarget) -> Result<VoteCounts> {
        let mut tx = self
            .repo
            .begin_transaction(IsolationLevel::RepeatableRead)
            .await?;
        let result = Self::remove_in(tx.as_mut(), user_id, target).await;
        finish(tx, result).await
    }

    async fn remove_in(
        tx: &mut dyn ReviewTransaction,
        user_id: &str,
        target: &VoteTarget,
    ) -> Result<VoteCounts> {
        if tx.find_vote(user_id, target).await?.is_none() {
            return Err(AppError::NotFound(format!("no vote by {user_id} on {target}")));
        }

        tx.delete_vote(user_id, target).await?;
        tx.vote_counts(target).await
    }
}
