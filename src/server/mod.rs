//! HTTP exposure of the model facade

pub mod handlers;
pub mod router;

pub use handlers::AppState;
pub use router::build_model_routes;
