//! Cache key derivation for read operations
//!
//! Keys have the shape `model.{op}.{Model}.{md5}.cache`. The hash covers a
//! canonical JSON rendering of the operation parameters: object keys are
//! sorted recursively so two logically identical parameter sets always hash
//! the same, while array order is kept because it carries meaning (column
//! lists, clause order).

use crate::core::error::{CacheError, ModelResult};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Read operation a cache key belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    FindOne,
    FindMany,
    Count,
    Paginate,
}

impl OperationKind {
    /// Segment used in the key prefix
    pub fn key_segment(&self) -> &'static str {
        match self {
            OperationKind::FindOne => "first",
            OperationKind::FindMany => "find",
            OperationKind::Count => "count",
            OperationKind::Paginate => "paginate",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_segment())
    }
}

/// Strip namespace separators from a model name
///
/// `App\Models\Article` and `app::models::Article` both become a single
/// dot-free token usable inside a key.
pub fn sanitize_model_name(model: &str) -> String {
    model
        .replace("::", "")
        .chars()
        .filter(|c| !matches!(c, '\\' | '/'))
        .collect()
}

/// Render a value with recursively sorted object keys
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::with_capacity(map.len());
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// MD5 hex digest of the canonical JSON form of `params`
pub fn hash_params<P: Serialize + ?Sized>(params: &P) -> ModelResult<String> {
    let value = serde_json::to_value(params).map_err(|e| CacheError::Payload {
        key: String::new(),
        message: e.to_string(),
    })?;
    let canonical = canonicalize(&value).to_string();

    let mut hasher = Md5::new();
    hasher.update(canonical.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Derive the cache key for an operation on a model
///
/// Pure: same inputs always yield the same key.
pub fn derive_key<P: Serialize + ?Sized>(
    op: OperationKind,
    model: &str,
    params: &P,
) -> ModelResult<String> {
    Ok(format!(
        "model.{}.{}.{}.cache",
        op.key_segment(),
        sanitize_model_name(model),
        hash_params(params)?
    ))
}
