// Encore Core - Domain Logic, Ports & Transaction Retry
// NO infrastructure dependencies (hexagonal architecture)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;
pub mod query;

pub use error::{AppError, ErrorClass, ErrorKind, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
