// Scalar values bound to statement placeholders

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::query::PatchError;

/// A concrete value that can be bound to a positional placeholder.
///
/// Statement argument lists only ever contain these; optional inputs are
/// `Option<Scalar>` and are unwrapped before they reach an argument list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl Scalar {
    pub fn kind(&self) -> &'static str {
        match self {
            Scalar::Text(_) => "text",
            Scalar::Integer(_) => "integer",
            Scalar::Float(_) => "float",
            Scalar::Bool(_) => "bool",
            Scalar::Timestamp(_) => "timestamp",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => write!(f, "{s}"),
            Scalar::Integer(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Integer(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Integer(i64::from(v))
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<DateTime<Utc>> for Scalar {
    fn from(v: DateTime<Utc>) -> Self {
        Scalar::Timestamp(v)
    }
}

/// Converts an untyped JSON value into an optional scalar.
///
/// `null` is an absent value. Arrays and objects have no scalar form and
/// are rejected instead of being passed through.
pub fn scalar_from_json(value: serde_json::Value) -> Result<Option<Scalar>, PatchError> {
    use serde_json::Value;

    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(Scalar::Bool(b))),
        Value::String(s) => Ok(Some(Scalar::Text(s))),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Some(Scalar::Integer(i)))
            } else if let Some(x) = n.as_f64() {
                Ok(Some(Scalar::Float(x)))
            } else {
                Err(PatchError::UnsupportedValueType(format!("number {n}")))
            }
        }
        Value::Array(_) => Err(PatchError::UnsupportedValueType("array".to_string())),
        Value::Object(_) => Err(PatchError::UnsupportedValueType("object".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_null_is_absent() {
        assert_eq!(scalar_from_json(json!(null)).unwrap(), None);
    }

    #[test]
    fn test_json_scalars() {
        assert_eq!(
            scalar_from_json(json!("hi")).unwrap(),
            Some(Scalar::Text("hi".into()))
        );
        assert_eq!(scalar_from_json(json!(7)).unwrap(), Some(Scalar::Integer(7)));
        assert_eq!(scalar_from_json(json!(true)).unwrap(), Some(Scalar::Bool(true)));
        assert_eq!(scalar_from_json(json!(1.5)).unwrap(), Some(Scalar::Float(1.5)));
    }

    #[test]
    fn test_json_compound_values_rejected() {
        let err = scalar_from_json(json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("unsupported value type"));

        let err = scalar_from_json(json!({"nested": 1})).unwrap_err();
        assert!(err.to_string().contains("object"));
    }
}
