//! Store traits for the data and cache collaborators

use crate::core::error::{CacheError, ModelResult};
use crate::core::query::{QueryDescriptor, Row};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Caching instruction handed down to a data store
///
/// Stores with their own result cache may use the key and lifetime to cache
/// at execution time. Stores without one ignore it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheInstruction {
    pub key: String,
    /// Seconds; `0` means no expiry
    pub lifetime: u64,
}

/// The underlying data store
///
/// Implementations run reads described by a [`QueryDescriptor`]. Errors are
/// propagated to callers unchanged.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// First row matching the descriptor
    async fn find_one(
        &self,
        query: &QueryDescriptor,
        cache: Option<&CacheInstruction>,
    ) -> ModelResult<Option<Row>>;

    /// All rows matching the descriptor (honouring limit/offset)
    async fn find_many(
        &self,
        query: &QueryDescriptor,
        cache: Option<&CacheInstruction>,
    ) -> ModelResult<Vec<Row>>;

    /// Number of rows matching the descriptor's condition
    async fn count(
        &self,
        query: &QueryDescriptor,
        cache: Option<&CacheInstruction>,
    ) -> ModelResult<usize>;

    /// Execute a built query
    ///
    /// Used by pagination; semantics match `find_many`.
    async fn execute(
        &self,
        query: &QueryDescriptor,
        cache: Option<&CacheInstruction>,
    ) -> ModelResult<Vec<Row>>;
}

/// A key/value cache with per-entry lifetime
///
/// Errors returned here never fail a read: the facade logs them and falls
/// through to the data store.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Store a payload; `lifetime` is in seconds, `0` means no expiry
    async fn set(&self, key: &str, payload: Value, lifetime: u64) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
