// Dependency wiring

use anyhow::{Context, Result};
use encore_core::application::{
    PatchService, RetryPolicy, ReviewService, TransactionExecutor, VoteService,
};
use encore_core::port::id_provider::UuidProvider;
use encore_core::port::time_provider::SystemTimeProvider;
use encore_infra_sqlite::{create_pool, run_migrations, SqliteReviewRepository};
use std::sync::Arc;
use tracing::info;

pub struct App {
    pub reviews: ReviewService,
    pub votes: VoteService,
    pub patches: PatchService,
}

impl App {
    pub async fn connect(database_url: &str, policy: RetryPolicy) -> Result<Self> {
        info!(database_url, "Initializing database...");

        let pool = create_pool(database_url)
            .await
            .context("DB pool creation failed")?;
        run_migrations(&pool).await.context("Migration failed")?;

        let time_provider = Arc::new(SystemTimeProvider);
        let repo = Arc::new(SqliteReviewRepository::new(pool));
        let executor = Arc::new(TransactionExecutor::with_tokio(policy));

        Ok(Self {
            reviews: ReviewService::new(repo.clone(), Arc::new(UuidProvider), time_provider.clone()),
            votes: VoteService::new(repo.clone(), executor.clone(), time_provider.clone()),
            patches: PatchService::new(repo, executor, time_provider),
        })
    }
}
