//! # this-model
//!
//! Filter compilation and cached reads for table-backed models.
//!
//! ## Features
//!
//! - **Condition Compilation**: keyword search + equality filters become a
//!   parameterized expression with typed bindings
//! - **Cache Keys**: deterministic keys from canonicalized parameters
//! - **Cached Reads**: find-one, find-many, count and paginate with optional
//!   result caching that never fails a read when the cache does
//! - **Explicit Wiring**: model-to-table registry and stores passed in, no
//!   global lookups
//! - **HTTP Exposure**: axum routes that accept the request descriptor as JSON
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use this_model::prelude::*;
//!
//! let registry = ModelRegistry::new().with("Article", "articles");
//! let store = Arc::new(InMemoryStore::new());
//! let cache = Arc::new(InMemoryCache::new());
//! let articles = Model::new("Article", &registry, store, cache)?;
//!
//! let request = FilterRequest::new("id")
//!     .keyword("rust")
//!     .search_in(["title", "body"])
//!     .filter("status", 1)
//!     .direction(OrderDirection::Desc);
//!
//! let page = articles.paginate(&request, 20, 1, CacheOptions::cached(300)).await?;
//! ```

pub mod config;
pub mod core;
pub mod model;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        BindType, BindValue, CacheInstruction, CacheStore, Clause, CompiledCondition, DataStore,
        FilterRequest, FilterValue, FindParams, ModelError, ModelRegistry, ModelResult,
        OperationKind, OrderBy, OrderDirection, Page, PaginationMeta, QueryDescriptor, Row,
        compile, derive_key,
        error::{CacheError, ConfigError, RequestError, StorageError},
    };

    // === Model facade ===
    pub use crate::model::{CacheOptions, Model, PaginatorAdapter};

    // === Storage ===
    pub use crate::storage::{InMemoryCache, InMemoryStore, StoreCalls};

    // === Config ===
    pub use crate::config::{CacheConfig, ModelConfig, ModelsConfig};

    // === Server ===
    pub use crate::server::{AppState, build_model_routes};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
}
