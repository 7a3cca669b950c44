//! Cache-aware model facade and paginator adapters

pub mod facade;
pub mod paginator;

pub use facade::{CacheOptions, Model};
pub use paginator::PaginatorAdapter;
