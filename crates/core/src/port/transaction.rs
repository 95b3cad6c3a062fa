// Transaction port for atomic read-modify-write operations

use crate::domain::{Comment, Post, User, Vote, VoteCounts, VoteKind, VoteTarget};
use crate::error::Result;
use crate::query::GeneratedStatement;
use async_trait::async_trait;

/// Visibility guarantee requested when a transaction begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolationLevel {
    ReadCommitted,
    #[default]
    RepeatableRead,
    Serializable,
}

impl std::fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IsolationLevel::ReadCommitted => write!(f, "READ COMMITTED"),
            IsolationLevel::RepeatableRead => write!(f, "REPEATABLE READ"),
            IsolationLevel::Serializable => write!(f, "SERIALIZABLE"),
        }
    }
}

/// Transaction trait for atomic multi-step operations
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Opens transactions against the review store
#[async_trait]
pub trait TransactionalReviewRepository: Send + Sync {
    /// Begin a new transaction at the given isolation level
    async fn begin_transaction(
        &self,
        isolation: IsolationLevel,
    ) -> Result<Box<dyn ReviewTransaction>>;
}

/// Review store operations within a transaction
#[async_trait]
pub trait ReviewTransaction: Transaction {
    /// Whether the vote target exists (within transaction)
    async fn target_exists(&mut self, target: &VoteTarget) -> Result<bool>;

    /// Current vote of a user on a target
    async fn find_vote(&mut self, user_id: &str, target: &VoteTarget) -> Result<Option<Vote>>;

    async fn insert_vote(&mut self, vote: &Vote) -> Result<()>;

    /// Flip an existing vote to `kind`
    async fn update_vote(&mut self, user_id: &str, target: &VoteTarget, kind: VoteKind)
        -> Result<()>;

    /// Returns the number of rows removed
    async fn delete_vote(&mut self, user_id: &str, target: &VoteTarget) -> Result<u64>;

    /// Aggregated likes and dislikes for a target
    async fn vote_counts(&mut self, target: &VoteTarget) -> Result<VoteCounts>;

    /// Run a patch statement on `users`; `None` when no row matched
    async fn patch_user(&mut self, stmt: &GeneratedStatement) -> Result<Option<User>>;

    async fn patch_post(&mut self, stmt: &GeneratedStatement) -> Result<Option<Post>>;

    async fn patch_comment(&mut self, stmt: &GeneratedStatement) -> Result<Option<Comment>>;
}

/// Commit on success, roll back on failure, and hand back the unit's result.
///
/// A failed rollback is logged but never replaces the original error.
pub async fn finish<T, X>(tx: Box<X>, result: Result<T>) -> Result<T>
where
    X: Transaction + ?Sized,
{
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "Rollback failed");
            }
            Err(e)
        }
    }
}
