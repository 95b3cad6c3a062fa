// Partial-Update Statement Builder
//
// Produces `UPDATE <table> SET .. [WHERE ..] [RETURNING ..]` with `$N`
// placeholders. SET values come first in the argument list, then WHERE
// values, so placeholder N always binds args[N - 1].

use crate::domain::Scalar;
use thiserror::Error;

/// Builder input errors. Always terminal, raised before any statement is run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("table name is empty")]
    EmptyTable,

    #[error("nothing to update")]
    NothingToUpdate,

    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("unsupported value type: {0}")]
    UnsupportedValueType(String),
}

/// Parameterized statement and the arguments matching its placeholders
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedStatement {
    pub text: String,
    pub args: Vec<Scalar>,
}

impl GeneratedStatement {
    pub fn placeholder_count(&self) -> usize {
        self.args.len()
    }
}

/// Collects a sparse update and renders it once complete.
///
/// # Example
/// ```
/// use encore_core::query::PatchBuilder;
/// use encore_core::domain::Scalar;
///
/// let stmt = PatchBuilder::new("users")
///     .set("bio", Some(Scalar::from("hi")))
///     .set("role", None)
///     .where_eq("id", "u1")
///     .returning(["bio", "role"])
///     .build()
///     .unwrap();
///
/// assert_eq!(stmt.text, "UPDATE users SET bio = $1 WHERE id = $2 RETURNING bio, role");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PatchBuilder {
    table: String,
    set: Vec<(String, Option<Scalar>)>,
    conditions: Vec<(String, Scalar)>,
    returning: Vec<String>,
}

impl PatchBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    /// Add a column to the SET clause. `None` leaves the column untouched.
    pub fn set(mut self, column: impl Into<String>, value: Option<Scalar>) -> Self {
        self.set.push((column.into(), value));
        self
    }

    /// Add an equality condition, ANDed with the others.
    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.conditions.push((column.into(), value.into()));
        self
    }

    pub fn returning<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.returning.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Result<GeneratedStatement, PatchError> {
        build_patch_statement(&self.table, self.set, self.conditions, &self.returning)
    }
}

/// Build an UPDATE statement touching only the supplied columns.
pub fn build_patch_statement<S>(
    table: &str,
    set_fields: impl IntoIterator<Item = (S, Option<Scalar>)>,
    where_fields: impl IntoIterator<Item = (S, Scalar)>,
    returning: &[String],
) -> Result<GeneratedStatement, PatchError>
where
    S: AsRef<str>,
{
    if table.is_empty() {
        return Err(PatchError::EmptyTable);
    }
    check_identifier(table)?;

    let mut args = Vec::new();

    let mut assignments = Vec::new();
    for (column, value) in set_fields {
        let Some(value) = value else { continue };
        let column = column.as_ref();
        check_identifier(column)?;
        args.push(value);
        assignments.push(Clause::new(column, args.len()));
    }

    if assignments.is_empty() {
        return Err(PatchError::NothingToUpdate);
    }

    let mut conditions = Vec::new();
    for (column, value) in where_fields {
        let column = column.as_ref();
        check_identifier(column)?;
        args.push(value);
        conditions.push(Clause::new(column, args.len()));
    }

    for column in returning {
        check_identifier(column)?;
    }

    let mut text = format!("UPDATE {table} SET {}", join(&assignments, ", "));
    if !conditions.is_empty() {
        text.push_str(" WHERE ");
        text.push_str(&join(&conditions, " AND "));
    }
    if !returning.is_empty() {
        text.push_str(" RETURNING ");
        text.push_str(&returning.join(", "));
    }

    Ok(GeneratedStatement { text, args })
}

/// `column = $index`
struct Clause {
    column: String,
    placeholder: usize,
}

impl Clause {
    fn new(column: &str, placeholder: usize) -> Self {
        Self {
            column: column.to_string(),
            placeholder,
        }
    }
}

fn join(clauses: &[Clause], separator: &str) -> String {
    clauses
        .iter()
        .map(|c| format!("{} = ${}", c.column, c.placeholder))
        .collect::<Vec<_>>()
        .join(separator)
}

// Identifiers are written into the statement text, so only plain names pass.
fn check_identifier(name: &str) -> Result<(), PatchError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(PatchError::InvalidIdentifier(name.to_string()))
    }
}
