// Application Layer - Use Cases and Business Logic

pub mod cancel;
pub mod patch;
pub mod retry;
pub mod review;
pub mod validation;
pub mod vote;

// Re-exports
pub use cancel::{cancel_channel, CancelSender, CancelToken};
pub use patch::{CommentPatch, PatchService, PostPatch, ProfilePatch};
pub use retry::{run_with_retry, RetryPolicy, TransactionExecutor};
pub use review::{NewPost, NewUser, ReviewService};
pub use vote::VoteService;
