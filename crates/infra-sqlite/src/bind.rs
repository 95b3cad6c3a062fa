// Binding Scalars to positional placeholders

use encore_core::domain::Scalar;
use sqlx::query::QueryAs;
use sqlx::sqlite::SqliteArguments;
use sqlx::Sqlite;

/// Bind `args` in order, so `args[N - 1]` fills placeholder `$N`.
///
/// Timestamps are stored as epoch milliseconds, like every other
/// timestamp column in the schema.
pub(crate) fn bind_scalars<'q, O>(
    mut query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    args: &[Scalar],
) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
    for arg in args {
        query = match arg {
            Scalar::Text(s) => query.bind(s.clone()),
            Scalar::Integer(i) => query.bind(*i),
            Scalar::Float(x) => query.bind(*x),
            Scalar::Bool(b) => query.bind(*b),
            Scalar::Timestamp(t) => query.bind(t.timestamp_millis()),
        };
    }
    query
}
