// Encore Infrastructure - SQLite Adapter
// Implements: ReviewRepository, TransactionalReviewRepository

mod bind;
mod connection;
mod error;
mod migration;
mod review_repository;
mod rows;
mod transaction;

pub use connection::create_pool;
pub use migration::run_migrations;
pub use review_repository::SqliteReviewRepository;
pub use transaction::SqliteReviewTransaction;

// Note: sqlx::Error conversion is handled by map_sqlx_error
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
