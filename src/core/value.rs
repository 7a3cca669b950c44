//! Filter and bind value types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A loosely typed filter value as supplied by callers
///
/// Request descriptors mix strings, numbers and booleans in one mapping.
/// `FilterValue` keeps that shape at the API boundary; the query builder
/// turns it into a [`BindValue`] with a coarse [`BindType`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FilterValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

impl FilterValue {
    /// Convert a JSON scalar into a filter value
    ///
    /// Arrays and objects have no equality semantics and return `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(FilterValue::String(s.clone())),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(FilterValue::Integer(i)),
                None => n.as_f64().map(FilterValue::Float),
            },
            Value::Bool(b) => Some(FilterValue::Boolean(*b)),
            Value::Null => Some(FilterValue::Null),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Whether the value counts as "set"
    ///
    /// Empty strings, `"0"`, zero, `false` and null are falsy and never
    /// produce an equality clause.
    pub fn is_truthy(&self) -> bool {
        match self {
            FilterValue::String(s) => !s.is_empty() && s != "0",
            FilterValue::Integer(i) => *i != 0,
            FilterValue::Float(f) => *f != 0.0,
            FilterValue::Boolean(b) => *b,
            FilterValue::Null => false,
        }
    }

    /// Coarse bind classification: strings bind as strings, everything else
    /// as integers.
    ///
    /// Floats and booleans land in the integer bucket. Callers that need finer
    /// typing must normalize their values before building the request.
    pub fn bind_type(&self) -> BindType {
        match self {
            FilterValue::String(_) => BindType::String,
            _ => BindType::Integer,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FilterValue::String(s) => Value::String(s.clone()),
            FilterValue::Integer(i) => Value::from(*i),
            FilterValue::Float(f) => Value::from(*f),
            FilterValue::Boolean(b) => Value::Bool(*b),
            FilterValue::Null => Value::Null,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::String(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::String(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Integer(value.into())
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Float(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Boolean(value)
    }
}

/// Bind parameter type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BindType {
    String,
    Integer,
}

/// A bound literal tagged with its bind type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BindValue {
    pub kind: BindType,
    pub value: FilterValue,
}

impl BindValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            kind: BindType::String,
            value: FilterValue::String(value.into()),
        }
    }

    /// Tag a filter value with its coarse classification
    pub fn classify(value: FilterValue) -> Self {
        Self {
            kind: value.bind_type(),
            value,
        }
    }
}
