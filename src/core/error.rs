//! Typed error handling for this-model
//!
//! Errors are grouped by category so callers can match on what went wrong
//! instead of inspecting strings.
//!
//! # Error Categories
//!
//! - [`RequestError`]: malformed request descriptors
//! - [`StorageError`]: failures reported by the underlying data store
//! - [`CacheError`]: failures reported by the cache store (never fatal for reads)
//! - [`ConfigError`]: model registry and configuration problems
//!
//! # Example
//!
//! ```rust,ignore
//! match model.paginate(&request, 20, 1, CacheOptions::none()).await {
//!     Ok(page) => println!("{} rows", page.data.len()),
//!     Err(ModelError::Request(RequestError::InvalidRequest { message })) => {
//!         eprintln!("bad request: {}", message);
//!     }
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Result alias used throughout the crate
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// The main error type
#[derive(Debug, Error)]
pub enum ModelError {
    /// Malformed request descriptor
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Underlying data store failure, propagated unchanged
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Cache store failure
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Registry or configuration problem
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Error response body for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ModelError {
    /// Shorthand for an [`RequestError::InvalidRequest`]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        ModelError::Request(RequestError::InvalidRequest {
            message: message.into(),
        })
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ModelError::Request(_) => StatusCode::BAD_REQUEST,
            ModelError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ModelError::Cache(_) => StatusCode::SERVICE_UNAVAILABLE,
            ModelError::Config(e) => e.status_code(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ModelError::Request(e) => e.error_code(),
            ModelError::Storage(_) => "STORAGE_ERROR",
            ModelError::Cache(_) => "CACHE_ERROR",
            ModelError::Config(e) => e.error_code(),
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
        }
    }
}

impl IntoResponse for ModelError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Request Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum RequestError {
    /// The descriptor is missing an expected sub-structure or has the wrong shape
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// A field name is not a plain identifier
    #[error("Invalid field name '{field}'")]
    InvalidField { field: String },

    /// A filter field shadows the keyword search binding
    #[error("Field name '{field}' is reserved for keyword search")]
    ReservedField { field: String },
}

impl RequestError {
    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidRequest { .. } => "INVALID_REQUEST",
            RequestError::InvalidField { .. } => "INVALID_FIELD",
            RequestError::ReservedField { .. } => "RESERVED_FIELD",
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Table '{table}' does not exist")]
    TableNotFound { table: String },

    #[error("Missing binding ':{placeholder}:' in condition")]
    MissingBinding { placeholder: String },

    #[error("Storage backend error: {0}")]
    Backend(String),
}

// =============================================================================
// Cache Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to (de)serialize cache payload for '{key}': {message}")]
    Payload { key: String, message: String },
}

// =============================================================================
// Config Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown model: {model}")]
    UnknownModel { model: String },

    #[error("Model '{model}' is registered twice")]
    DuplicateModel { model: String },

    #[error("Failed to load configuration: {0}")]
    Load(String),
}

impl ConfigError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ConfigError::UnknownModel { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::UnknownModel { .. } => "UNKNOWN_MODEL",
            ConfigError::DuplicateModel { .. } => "DUPLICATE_MODEL",
            ConfigError::Load(_) => "CONFIG_ERROR",
        }
    }
}
