//! Query descriptors and pagination utilities

use crate::core::condition::CompiledCondition;
use crate::core::request::OrderDirection;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single result row
pub type Row = Map<String, Value>;

/// Order clause `{qualifier}.{field} {direction}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: OrderDirection,
}

impl OrderBy {
    pub fn new(field: impl Into<String>, direction: OrderDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Render the clause qualified by a model name
    pub fn render(&self, model: &str) -> String {
        format!("{}.{} {}", model, self.field, self.direction)
    }
}

/// Parameters of a find-one / find-many / count call
///
/// These are also what the cache key is derived from, so everything that
/// changes the result must live here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FindParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<CompiledCondition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

impl FindParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conditions(mut self, conditions: Option<CompiledCondition>) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn order(mut self, field: impl Into<String>, direction: OrderDirection) -> Self {
        self.order = Some(OrderBy::new(field, direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Everything a data store needs to run a read
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryDescriptor {
    /// Model name, used to qualify the order clause
    pub model: String,
    /// Table resolved from the model registry
    pub table: String,
    pub columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<CompiledCondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

impl QueryDescriptor {
    pub fn from_params(model: &str, table: &str, params: &FindParams) -> Self {
        Self {
            model: model.to_string(),
            table: table.to_string(),
            columns: params.columns.clone(),
            conditions: params.conditions.clone(),
            order: params.order.clone(),
            limit: params.limit,
            offset: params.offset,
        }
    }

    /// `Model.field DIR`, if an order is set
    pub fn order_expression(&self) -> Option<String> {
        self.order.as_ref().map(|o| o.render(&self.model))
    }

    /// Same query restricted to one page
    pub fn page(&self, limit: usize, offset: usize) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
            ..self.clone()
        }
    }
}

/// Pagination parameters as they arrive in a URL query string
///
/// ```text
/// POST /models/Article/paginate?page=2&limit=10&cache=true&lifetime=300
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PageParams {
    /// Page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,

    /// Serve from / populate the cache
    pub cache: bool,

    /// Cache lifetime in seconds; falls back to the configured default
    pub lifetime: Option<u64>,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            cache: false,
            lifetime: None,
        }
    }
}

impl PageParams {
    /// Get page number, ensuring minimum of 1
    pub fn page(&self) -> usize {
        self.page.max(1)
    }

    /// Get limit, clamped to 1..=100
    pub fn limit(&self) -> usize {
        self.limit.clamp(1, 100)
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    pub data: Vec<Row>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,

    /// Total number of items (after filters)
    pub total: usize,

    /// Total number of pages
    pub total_pages: usize,

    pub has_next: bool,

    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        let page = page.max(1);
        let limit = limit.max(1);
        let total_pages = if total == 0 { 0 } else { total.div_ceil(limit) };
        let start = (page - 1).saturating_mul(limit);

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: start.saturating_add(limit) < total,
            has_prev: page > 1,
        }
    }

    /// Row offset of the first item on this page
    ///
    /// Saturates instead of overflowing for absurd page numbers, which
    /// simply yields an empty page.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_params_defaults() {
        let params = PageParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), 20);
        assert!(!params.cache);
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(1, 20, 145);
        assert_eq!(meta.total, 145);
        assert_eq!(meta.total_pages, 8);
        assert!(!meta.has_prev);
        assert!(meta.has_next);

        let last = PaginationMeta::new(8, 20, 145);
        assert_eq!(last.offset(), 140);
        assert!(!last.has_next);
        assert!(last.has_prev);
    }

    #[test]
    fn test_page_zero_is_clamped() {
        let meta = PaginationMeta::new(0, 10, 5);
        assert_eq!(meta.page, 1);
        assert_eq!(meta.offset(), 0);
    }

    #[test]
    fn test_huge_page_saturates() {
        let meta = PaginationMeta::new(usize::MAX, 10, 145);
        assert_eq!(meta.offset(), usize::MAX);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
        assert_eq!(meta.total_pages, 15);
    }

    #[test]
    fn test_order_expression() {
        let descriptor = QueryDescriptor::from_params(
            "Article",
            "articles",
            &FindParams::new().order("created_at", OrderDirection::Desc),
        );
        assert_eq!(
            descriptor.order_expression().as_deref(),
            Some("Article.created_at DESC")
        );
    }
}
