use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime value of a query literal or a folded constant sub-expression.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(Vec<(String, Value)>),
    /// Integer interval with both ends inclusive (`lo..hi`).
    Range(i64, i64),
}

/// Scalar kind as the index distinguishes it. Compound values have no kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Null,
    Bool,
    Numeric,
    String,
}

impl Value {
    /// Scalar kind classification; `None` for arrays, objects and ranges.
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Null => Some(ValueKind::Null),
            Value::Boolean(_) => Some(ValueKind::Bool),
            Value::Int(_) | Value::Float(_) => Some(ValueKind::Numeric),
            Value::String(_) => Some(ValueKind::String),
            Value::Array(_) | Value::Object(_) | Value::Range(_, _) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Boolean coercion: `false`, `0`, `0.0`, `null` and `""` are falsy,
    /// everything else (including empty arrays and objects) is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(v) => *v,
            Value::Int(v) => *v != 0,
            Value::Float(v) => *v != 0.0,
            Value::String(v) => !v.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Range(_, _) => true,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "\"{v}\""),
            Value::Array(items) => {
                let inner = items
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<String>>()
                    .join(", ");
                write!(f, "[{inner}]")
            }
            Value::Object(entries) => {
                let inner = entries
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect::<Vec<String>>()
                    .join(", ");
                write!(f, "{{{inner}}}")
            }
            Value::Range(lo, hi) => write!(f, "{lo}..{hi}"),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Null => write!(f, "null"),
            ValueKind::Bool => write!(f, "bool"),
            ValueKind::Numeric => write!(f, "numeric"),
            ValueKind::String => write!(f, "string"),
        }
    }
}
