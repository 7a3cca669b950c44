//! Reference implementations of the data and cache stores

pub mod cache;
pub mod in_memory;

pub use cache::InMemoryCache;
pub use in_memory::{InMemoryStore, StoreCalls};
