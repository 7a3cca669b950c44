//! Core module containing the request, condition and store types

pub mod cache_key;
pub mod condition;
pub mod error;
pub mod query;
pub mod registry;
pub mod request;
pub mod store;
pub mod value;

pub use cache_key::{OperationKind, derive_key};
pub use condition::{Clause, CompiledCondition, compile};
pub use error::{ModelError, ModelResult};
pub use query::{FindParams, OrderBy, Page, PaginationMeta, QueryDescriptor, Row};
pub use registry::ModelRegistry;
pub use request::{FilterRequest, OrderDirection};
pub use store::{CacheInstruction, CacheStore, DataStore};
pub use value::{BindType, BindValue, FilterValue};
