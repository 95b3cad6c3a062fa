// Runtime configuration (flags with environment fallbacks)

use anyhow::{Context, Result};
use clap::Args;
use encore_core::application::RetryPolicy;
use std::time::Duration;

const DEFAULT_DB_PATH: &str = "~/.encore/encore.db";

/// Settings shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// SQLite database path or URL
    #[arg(long, global = true, env = "ENCORE_DB_PATH", default_value = DEFAULT_DB_PATH)]
    pub db_path: String,

    /// Total attempts for a transaction hitting write conflicts
    #[arg(long, global = true, env = "ENCORE_RETRY_MAX_ATTEMPTS", default_value_t = 3)]
    pub retry_max_attempts: u32,

    /// Backoff base in milliseconds (delay = base ^ attempt)
    #[arg(long, global = true, env = "ENCORE_RETRY_BASE_MS", default_value_t = 100)]
    pub retry_base_ms: u64,

    /// Upper bound on a single backoff delay, in milliseconds
    #[arg(long, global = true, env = "ENCORE_RETRY_MAX_DELAY_MS")]
    pub retry_max_delay_ms: Option<u64>,
}

impl Settings {
    /// Database URL with `~` expanded; plain paths get the sqlite scheme
    pub fn database_url(&self) -> String {
        let expanded = shellexpand::tilde(&self.db_path).into_owned();
        if expanded.starts_with("sqlite:") {
            expanded
        } else {
            format!("sqlite://{expanded}")
        }
    }

    /// Build the process-wide retry policy (validated once, at startup)
    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        let policy = RetryPolicy::new(self.retry_max_attempts, self.retry_base_ms)
            .context("Invalid retry configuration")?;
        Ok(match self.retry_max_delay_ms {
            Some(ms) => policy.with_max_delay(Duration::from_millis(ms)),
            None => policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            db_path: "/tmp/encore.db".to_string(),
            retry_max_attempts: 3,
            retry_base_ms: 100,
            retry_max_delay_ms: None,
        }
    }

    #[test]
    fn test_database_url() {
        assert_eq!(settings().database_url(), "sqlite:///tmp/encore.db");

        let memory = Settings {
            db_path: "sqlite::memory:".to_string(),
            ..settings()
        };
        assert_eq!(memory.database_url(), "sqlite::memory:");
    }

    #[test]
    fn test_zero_attempts_rejected_at_startup() {
        let bad = Settings {
            retry_max_attempts: 0,
            ..settings()
        };
        assert!(bad.retry_policy().is_err());
    }

    #[test]
    fn test_max_delay_applied() {
        let capped = Settings {
            retry_max_delay_ms: Some(500),
            ..settings()
        };
        let policy = capped.retry_policy().unwrap();
        assert_eq!(policy.backoff(3), Duration::from_millis(500));
    }
}
