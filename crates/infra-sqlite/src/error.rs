// sqlx::Error -> AppError classification
//
// Lock and snapshot conflicts become TransientConflict so the executor
// retries them. Everything unrecognized stays an unclassified Database
// error and is masked at the executor boundary.

use encore_core::error::AppError;

// SQLite extended result codes: https://www.sqlite.org/rescode.html
const SQLITE_BUSY: &str = "5";
const SQLITE_LOCKED: &str = "6";
const SQLITE_LOCKED_SHAREDCACHE: &str = "262";
const SQLITE_BUSY_RECOVERY: &str = "261";
const SQLITE_BUSY_SNAPSHOT: &str = "517";
const SQLITE_BUSY_TIMEOUT: &str = "773";
const SQLITE_CONSTRAINT_FOREIGNKEY: &str = "787";
const SQLITE_CONSTRAINT_PRIMARYKEY: &str = "1555";
const SQLITE_CONSTRAINT_UNIQUE: &str = "2067";
const SQLITE_CONSTRAINT_CHECK: &str = "275";

pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => match code.as_ref() {
                SQLITE_BUSY | SQLITE_LOCKED | SQLITE_LOCKED_SHAREDCACHE | SQLITE_BUSY_RECOVERY
                | SQLITE_BUSY_SNAPSHOT | SQLITE_BUSY_TIMEOUT => AppError::TransientConflict(
                    format!("{} ({})", db_err.message(), code),
                ),
                SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY => {
                    AppError::Duplicate(db_err.message().to_string())
                }
                SQLITE_CONSTRAINT_FOREIGNKEY => {
                    AppError::NotFound(format!("referenced row missing: {}", db_err.message()))
                }
                SQLITE_CONSTRAINT_CHECK => AppError::Validation(db_err.message().to_string()),
                other => AppError::Database(format!(
                    "Database error [{}]: {}",
                    other,
                    db_err.message()
                )),
            },
            None => AppError::Database(format!("Database error: {}", db_err.message())),
        },
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => AppError::Database(format!("Column not found: {}", col)),
        // Connection, pool, protocol errors
        _ => AppError::Database(err.to_string()),
    }
}

/// Insert that lost a race for the same key: a concurrent writer created
/// the row after our read, so the whole unit of work should start over.
pub(crate) fn map_insert_race(err: sqlx::Error) -> AppError {
    match map_sqlx_error(err) {
        AppError::Duplicate(msg) => AppError::TransientConflict(format!("concurrent insert: {msg}")),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};

    #[tokio::test]
    async fn test_unique_violation_is_duplicate() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();

        let insert = "INSERT INTO users (id, provider_id, username, role, created_at, updated_at) \
                      VALUES (?, ?, 'same', 'MEMBER', 0, 0)";
        sqlx::query(insert).bind("u1").bind("p1").execute(&pool).await.unwrap();
        let err = sqlx::query(insert)
            .bind("u2")
            .bind("p2")
            .execute(&pool)
            .await
            .map_err(map_sqlx_error)
            .unwrap_err();

        assert!(matches!(err, AppError::Duplicate(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_foreign_key_violation_is_not_found() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();

        let err = sqlx::query(
            "INSERT INTO posts (id, author_id, song_id, title, rating, created_at, updated_at) \
             VALUES ('p1', 'ghost', 's1', 't', 5, 0, 0)",
        )
        .execute(&pool)
        .await
        .map_err(map_sqlx_error)
        .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)), "{err:?}");
    }

    #[test]
    fn test_pool_errors_are_unclassified() {
        let err = map_sqlx_error(sqlx::Error::PoolTimedOut);
        assert_eq!(err.class(), encore_core::ErrorClass::Unclassified);
    }
}
