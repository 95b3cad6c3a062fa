// Domain Layer - Pure business logic and entities

pub mod comment;
pub mod post;
pub mod scalar;
pub mod user;
pub mod vote;

// Re-exports
pub use comment::{Comment, CommentId};
pub use post::{validate_rating, Post, PostId, PostView, MAX_RATING, MIN_RATING};
pub use scalar::{scalar_from_json, Scalar};
pub use user::{Role, User, UserId};
pub use vote::{Vote, VoteCounts, VoteKind, VoteTarget};
