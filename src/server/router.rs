//! Router builder for model routes

use crate::server::handlers::{AppState, invalidate_paginate, paginate};
use axum::{Router, routing::post};
use tower_http::trace::TraceLayer;

/// Build model routes
///
/// - POST /models/{model}/paginate - One page of a filtered, ordered query
/// - POST /models/{model}/paginate/invalidate - Drop the cached result set
pub fn build_model_routes(state: AppState) -> Router {
    Router::new()
        .route("/models/{model}/paginate", post(paginate))
        .route(
            "/models/{model}/paginate/invalidate",
            post(invalidate_paginate),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
