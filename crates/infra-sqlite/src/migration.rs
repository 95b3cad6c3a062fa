// Schema migrations

use crate::error::map_sqlx_error;
use encore_core::error::Result;
use sqlx::SqlitePool;
use tracing::{debug, info};

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "users, posts, comments",
        sql: include_str!("../migrations/001_initial_schema.sql"),
    },
    Migration {
        version: 2,
        name: "votes",
        sql: include_str!("../migrations/002_add_votes.sql"),
    },
];

/// Bring the schema up to the latest version. Safe to call on every start.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current = schema_version(pool).await?;
    let pending: Vec<_> = MIGRATIONS.iter().filter(|m| m.version > current).collect();

    if pending.is_empty() {
        debug!(version = current, "Schema up to date");
        return Ok(());
    }

    for migration in pending {
        info!(version = migration.version, name = migration.name, "Applying migration");
        apply(pool, migration).await?;
    }
    Ok(())
}

async fn schema_version(pool: &SqlitePool) -> Result<i64> {
    let has_table: i64 = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version')",
    )
    .fetch_one(pool)
    .await
    .map_err(map_sqlx_error)?;

    if has_table == 0 {
        return Ok(0);
    }

    let version: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await
        .map_err(map_sqlx_error)?;
    Ok(version.unwrap_or(0))
}

/// Each migration file records its own version row, so the whole file runs
/// in one transaction.
async fn apply(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    let mut tx = pool.begin().await.map_err(map_sqlx_error)?;
    for statement in statements(migration.sql) {
        sqlx::query(&statement)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
    }
    tx.commit().await.map_err(map_sqlx_error)
}

/// Drop `--` comment lines, then split the rest on `;`.
///
/// Comments go first so a `;` inside one never ends a statement.
fn statements(sql: &str) -> Vec<String> {
    let code = sql
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    code.split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .map(str::to_string)
        .collect()
}
