//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use encore_core::application::{
    NewPost, NewUser, PatchService, RetryPolicy, ReviewService, TransactionExecutor, VoteService,
};
use encore_core::domain::{Post, User};
use encore_core::port::id_provider::UuidProvider;
use encore_core::port::time_provider::SystemTimeProvider;
use encore_infra_sqlite::{create_pool, run_migrations, SqliteReviewRepository};
use sqlx::SqlitePool;

pub struct Harness {
    pub pool: SqlitePool,
    pub reviews: ReviewService,
    pub votes: Arc<VoteService>,
    pub patches: PatchService,
}

impl Harness {
    pub async fn in_memory() -> Self {
        Self::open("sqlite::memory:", RetryPolicy::default()).await
    }

    pub async fn open(url: &str, policy: RetryPolicy) -> Self {
        let pool = create_pool(url).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let time_provider = Arc::new(SystemTimeProvider);
        let repo = Arc::new(SqliteReviewRepository::new(pool.clone()));
        let executor = Arc::new(TransactionExecutor::with_tokio(policy));

        Self {
            pool,
            reviews: ReviewService::new(repo.clone(), Arc::new(UuidProvider), time_provider.clone()),
            votes: Arc::new(VoteService::new(
                repo.clone(),
                executor.clone(),
                time_provider.clone(),
            )),
            patches: PatchService::new(repo, executor, time_provider),
        }
    }

    pub async fn user(&self, username: &str) -> User {
        self.reviews
            .create_user(NewUser {
                provider_id: format!("spotify:user:{username}"),
                username: username.to_string(),
                display_name: None,
            })
            .await
            .unwrap()
    }

    pub async fn post(&self, author: &User) -> Post {
        self.reviews
            .create_post(
                &author.id,
                NewPost {
                    song_id: "spotify:track:0VjIjW4GlUZAMYd2vXMi3b".to_string(),
                    title: "Blinding Lights".to_string(),
                    body: Some("Synths for days.".to_string()),
                    rating: 8,
                },
            )
            .await
            .unwrap()
    }

    pub async fn vote_rows(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM votes")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

/// A file-backed database so several connections can race on it
pub struct TempDb {
    pub path: PathBuf,
}

impl TempDb {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("encore_test_{}.db", uuid::Uuid::new_v4()));
        Self { path }
    }

    pub fn url(&self) -> String {
        format!("sqlite://{}", self.path.display())
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

/// Generous policy for contention tests: many attempts, short capped waits
pub fn contention_policy() -> RetryPolicy {
    RetryPolicy::new(25, 2)
        .unwrap()
        .with_max_delay(Duration::from_millis(20))
}
