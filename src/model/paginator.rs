//! Paginator adapters
//!
//! Two ways to produce a [`Page`]: run a bounded query plus a count against
//! the store, or slice an already materialized result set (what the cache
//! hands back).

use crate::core::error::ModelResult;
use crate::core::query::{Page, PaginationMeta, QueryDescriptor, Row};
use crate::core::store::DataStore;

/// Where page rows come from
pub enum PaginatorAdapter<'a> {
    /// Count + bounded `execute` against the store
    QueryBuilder {
        store: &'a dyn DataStore,
        query: &'a QueryDescriptor,
    },
    /// Slice of a full result set already in memory
    Model { rows: Vec<Row> },
}

impl PaginatorAdapter<'_> {
    pub async fn paginate(self, limit: usize, page: usize) -> ModelResult<Page> {
        match self {
            PaginatorAdapter::QueryBuilder { store, query } => {
                let total = store.count(query, None).await?;
                let meta = PaginationMeta::new(page, limit, total);
                let data = if meta.offset() >= total {
                    Vec::new()
                } else {
                    store
                        .execute(&query.page(meta.limit, meta.offset()), None)
                        .await?
                };
                Ok(Page {
                    data,
                    pagination: meta,
                })
            }
            PaginatorAdapter::Model { rows } => {
                let meta = PaginationMeta::new(page, limit, rows.len());
                let data = rows
                    .into_iter()
                    .skip(meta.offset())
                    .take(meta.limit)
                    .collect();
                Ok(Page {
                    data,
                    pagination: meta,
                })
            }
        }
    }
}
