// Port Layer - Interfaces for external dependencies

pub mod id_provider; // For deterministic testing
pub mod review_repository;
pub mod sleeper;
pub mod time_provider;
pub mod transaction;

// Re-exports
pub use id_provider::IdProvider;
pub use review_repository::ReviewRepository;
pub use sleeper::{Sleeper, TokioSleeper};
pub use time_provider::TimeProvider;
pub use transaction::{
    finish, IsolationLevel, ReviewTransaction, Transaction, TransactionalReviewRepository,
};
