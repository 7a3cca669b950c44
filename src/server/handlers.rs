//! HTTP handlers for model reads
//!
//! Handlers accept the request descriptor as a JSON body and resolve the
//! model from the path, so one set of routes serves every registered model.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::Value;
use std::sync::Arc;

use crate::core::error::ModelResult;
use crate::core::query::{Page, PageParams};
use crate::core::registry::ModelRegistry;
use crate::core::request::FilterRequest;
use crate::core::store::{CacheStore, DataStore};
use crate::model::{CacheOptions, Model};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataStore>,
    pub cache: Arc<dyn CacheStore>,
    pub registry: Arc<ModelRegistry>,
    /// Lifetime used when a cached call does not name one
    pub default_lifetime: u64,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DataStore>,
        cache: Arc<dyn CacheStore>,
        registry: Arc<ModelRegistry>,
        default_lifetime: u64,
    ) -> Self {
        Self {
            store,
            cache,
            registry,
            default_lifetime,
        }
    }

    /// Facade for a registered model
    pub fn model(&self, name: &str) -> ModelResult<Model> {
        Model::new(
            name,
            &self.registry,
            self.store.clone(),
            self.cache.clone(),
        )
    }

    fn cache_options(&self, params: &PageParams) -> CacheOptions {
        if params.cache {
            CacheOptions::cached(params.lifetime.unwrap_or(self.default_lifetime))
        } else {
            CacheOptions::none()
        }
    }
}

/// Paginate a model
///
/// POST /models/{model}/paginate?page=1&limit=20&cache=true&lifetime=300
pub async fn paginate(
    State(state): State<AppState>,
    Path(model): Path<String>,
    Query(params): Query<PageParams>,
    Json(body): Json<Value>,
) -> ModelResult<Json<Page>> {
    let model = state.model(&model)?;
    let request = FilterRequest::from_value(&body)?;

    tracing::debug!(
        model = %model.name(),
        page = params.page(),
        limit = params.limit(),
        cache = params.cache,
        "paginate"
    );

    let page = model
        .paginate(
            &request,
            params.limit(),
            params.page(),
            state.cache_options(&params),
        )
        .await?;
    Ok(Json(page))
}

/// Drop the cached result set of a paginated query
///
/// POST /models/{model}/paginate/invalidate
pub async fn invalidate_paginate(
    State(state): State<AppState>,
    Path(model): Path<String>,
    Json(body): Json<Value>,
) -> ModelResult<StatusCode> {
    let model = state.model(&model)?;
    let request = FilterRequest::from_value(&body)?;
    model.invalidate_paginate(&request).await?;
    Ok(StatusCode::NO_CONTENT)
}
