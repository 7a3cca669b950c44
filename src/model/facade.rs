//! Cache-aware read facade for a single model

use crate::core::cache_key::{OperationKind, derive_key};
use crate::core::condition::compile;
use crate::core::error::{CacheError, ModelResult};
use crate::core::query::{FindParams, OrderBy, Page, QueryDescriptor, Row};
use crate::core::registry::ModelRegistry;
use crate::core::request::FilterRequest;
use crate::core::store::{CacheInstruction, CacheStore, DataStore};
use crate::model::paginator::PaginatorAdapter;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;

/// Per-call caching options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheOptions {
    pub cache: bool,
    /// Seconds; `0` means no expiry
    pub lifetime: u64,
}

impl CacheOptions {
    /// Bypass the cache entirely
    pub fn none() -> Self {
        Self::default()
    }

    pub fn cached(lifetime: u64) -> Self {
        Self {
            cache: true,
            lifetime,
        }
    }
}

/// Read operations for one model, with optional result caching
///
/// Dependencies are passed in explicitly; nothing is looked up globally.
///
/// # Example
///
/// ```rust,ignore
/// let registry = ModelRegistry::new().with("Article", "articles");
/// let articles = Model::new("Article", &registry, store, cache)?;
///
/// let request = FilterRequest::new("id").keyword("rust").search_in(["title"]);
/// let page = articles.paginate(&request, 20, 1, CacheOptions::cached(300)).await?;
/// ```
#[derive(Clone)]
pub struct Model {
    name: String,
    table: String,
    store: Arc<dyn DataStore>,
    cache: Arc<dyn CacheStore>,
}

impl Model {
    pub fn new(
        name: impl Into<String>,
        registry: &ModelRegistry,
        store: Arc<dyn DataStore>,
        cache: Arc<dyn CacheStore>,
    ) -> ModelResult<Self> {
        let name = name.into();
        let table = registry.table_name(&name)?.to_string();
        Ok(Self {
            name,
            table,
            store,
            cache,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub async fn find_one(
        &self,
        params: &FindParams,
        options: CacheOptions,
    ) -> ModelResult<Option<Row>> {
        let query = self.descriptor(params);
        self.cached(OperationKind::FindOne, params, options, |instruction| async move {
            self.store.find_one(&query, instruction.as_ref()).await
        })
        .await
    }

    pub async fn find_many(
        &self,
        params: &FindParams,
        options: CacheOptions,
    ) -> ModelResult<Vec<Row>> {
        let query = self.descriptor(params);
        self.cached(OperationKind::FindMany, params, options, |instruction| async move {
            self.store.find_many(&query, instruction.as_ref()).await
        })
        .await
    }

    pub async fn count(&self, params: &FindParams, options: CacheOptions) -> ModelResult<usize> {
        let query = self.descriptor(params);
        self.cached(OperationKind::Count, params, options, |instruction| async move {
            self.store.count(&query, instruction.as_ref()).await
        })
        .await
    }

    /// Compile `request` into a query and return one page of it
    ///
    /// Uncached calls page through the store. Cached calls store the full
    /// matching result set under a key that ignores `limit`/`page`, so every
    /// page of the same query is served from one entry.
    pub async fn paginate(
        &self,
        request: &FilterRequest,
        limit: usize,
        page: usize,
        options: CacheOptions,
    ) -> ModelResult<Page> {
        let query = self.paginate_descriptor(request)?;

        if !options.cache {
            return PaginatorAdapter::QueryBuilder {
                store: self.store.as_ref(),
                query: &query,
            }
            .paginate(limit, page)
            .await;
        }

        let rows: Vec<Row> = self
            .cached(OperationKind::Paginate, &query, options, |instruction| {
                let query = &query;
                async move { self.store.execute(query, instruction.as_ref()).await }
            })
            .await?;

        PaginatorAdapter::Model { rows }.paginate(limit, page).await
    }

    /// Drop the cached result of an operation
    pub async fn invalidate<P: Serialize + ?Sized>(
        &self,
        op: OperationKind,
        params: &P,
    ) -> ModelResult<()> {
        let key = derive_key(op, &self.name, params)?;
        self.cache.delete(&key).await?;
        tracing::debug!(model = %self.name, key = %key, "cache entry invalidated");
        Ok(())
    }

    /// Drop the cached pages of a paginated query
    pub async fn invalidate_paginate(&self, request: &FilterRequest) -> ModelResult<()> {
        let query = self.paginate_descriptor(request)?;
        self.invalidate(OperationKind::Paginate, &query).await
    }

    fn descriptor(&self, params: &FindParams) -> QueryDescriptor {
        QueryDescriptor::from_params(&self.name, &self.table, params)
    }

    fn paginate_descriptor(&self, request: &FilterRequest) -> ModelResult<QueryDescriptor> {
        Ok(QueryDescriptor {
            model: self.name.clone(),
            table: self.table.clone(),
            columns: request.columns.clone(),
            conditions: compile(request)?,
            order: Some(OrderBy::new(&request.order_by, request.order_direction)),
            limit: None,
            offset: None,
        })
    }

    /// Run `exec` behind the cache
    ///
    /// On a hit the store is never touched. On a miss `exec` runs with a
    /// caching instruction and the result is written back. Any cache failure
    /// degrades to an uncached read.
    async fn cached<T, P, F, Fut>(
        &self,
        op: OperationKind,
        params: &P,
        options: CacheOptions,
        exec: F,
    ) -> ModelResult<T>
    where
        T: Serialize + DeserializeOwned,
        P: Serialize + ?Sized,
        F: FnOnce(Option<CacheInstruction>) -> Fut,
        Fut: Future<Output = ModelResult<T>>,
    {
        if !options.cache {
            return exec(None).await;
        }

        let key = match derive_key(op, &self.name, params) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(model = %self.name, op = %op, error = %e, "cannot derive cache key, reading uncached");
                return exec(None).await;
            }
        };

        match self.lookup::<T>(&key).await {
            Some(hit) => {
                tracing::debug!(model = %self.name, op = %op, key = %key, "cache hit");
                return Ok(hit);
            }
            None => tracing::debug!(model = %self.name, op = %op, key = %key, "cache miss"),
        }

        let instruction = CacheInstruction {
            key: key.clone(),
            lifetime: options.lifetime,
        };
        let result = exec(Some(instruction)).await?;
        self.populate(&key, &result, options.lifetime).await;
        Ok(result)
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let payload = match self.cache.get(key).await {
            Ok(payload) => payload?,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };
        match serde_json::from_value(payload) {
            Ok(value) => Some(value),
            Err(e) => {
                let err = CacheError::Payload {
                    key: key.to_string(),
                    message: e.to_string(),
                };
                tracing::warn!(error = %err, "discarding unreadable cache entry");
                None
            }
        }
    }

    async fn populate<T: Serialize>(&self, key: &str, result: &T, lifetime: u64) {
        let payload = match serde_json::to_value(result) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "cannot serialize result for cache");
                return;
            }
        };
        if let Err(e) = self.cache.set(key, payload, lifetime).await {
            tracing::warn!(key = %key, error = %e, "cache write failed");
        }
    }
}
