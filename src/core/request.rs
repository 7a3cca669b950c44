//! Filter request descriptors
//!
//! A [`FilterRequest`] is the structured form of what callers send to list
//! endpoints. On the wire it looks like:
//!
//! ```json
//! {
//!   "conditions": {
//!     "keyword": "rust",
//!     "searchKeywordIn": ["title", "body"],
//!     "filterBy": {"status": 1, "category": "news"}
//!   },
//!   "columns": ["id", "title"],
//!   "orderBy": "id",
//!   "orderType": "DESC"
//! }
//! ```

use crate::core::condition::SEARCH_KEYWORD;
use crate::core::error::{ModelError, ModelResult, RequestError};
use crate::core::value::FilterValue;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::OnceLock;

/// Sort direction
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    /// Parse `asc` / `desc` case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Some(OrderDirection::Asc),
            "DESC" => Some(OrderDirection::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured filter/search request
///
/// `search_fields` only matters when `keyword` is non-empty. The iteration
/// order of `equality_filters` is the clause order of the compiled condition.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRequest {
    pub keyword: Option<String>,
    pub search_fields: Vec<String>,
    pub equality_filters: IndexMap<String, FilterValue>,
    pub columns: Vec<String>,
    pub order_by: String,
    pub order_direction: OrderDirection,
}

impl FilterRequest {
    /// Start a request ordered by `order_by` ascending with no filters
    pub fn new(order_by: impl Into<String>) -> Self {
        Self {
            keyword: None,
            search_fields: Vec::new(),
            equality_filters: IndexMap::new(),
            columns: Vec::new(),
            order_by: order_by.into(),
            order_direction: OrderDirection::Asc,
        }
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn search_in<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.equality_filters.insert(field.into(), value.into());
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

    pub fn direction(mut self, direction: OrderDirection) -> Self {
        self.order_direction = direction;
        self
    }

    /// Whether a keyword search clause will be produced
    pub fn has_keyword_search(&self) -> bool {
        self.keyword.as_deref().is_some_and(|k| !k.is_empty()) && !self.search_fields.is_empty()
    }

    /// Parse the caller-facing descriptor shape
    ///
    /// `conditions`, `columns`, `orderBy` and `orderType` are required.
    /// Inside `conditions`, `keyword` and `searchKeywordIn` are optional and
    /// `filterBy` must be an object (possibly empty).
    pub fn from_value(value: &Value) -> ModelResult<Self> {
        let root = value
            .as_object()
            .ok_or_else(|| ModelError::invalid_request("request descriptor must be an object"))?;

        let conditions = root
            .get("conditions")
            .ok_or_else(|| ModelError::invalid_request("missing 'conditions'"))?
            .as_object()
            .ok_or_else(|| ModelError::invalid_request("'conditions' must be an object"))?;

        let keyword = match conditions.get("keyword") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(_) => {
                return Err(ModelError::invalid_request(
                    "'conditions.keyword' must be a string",
                ));
            }
        };

        let search_fields = match conditions.get("searchKeywordIn") {
            None | Some(Value::Null) => Vec::new(),
            Some(v) => string_list(v, "conditions.searchKeywordIn")?,
        };

        let equality_filters = parse_filter_by(conditions)?;

        let columns = string_list(
            root.get("columns")
                .ok_or_else(|| ModelError::invalid_request("missing 'columns'"))?,
            "columns",
        )?;

        let order_by = root
            .get("orderBy")
            .and_then(Value::as_str)
            .ok_or_else(|| ModelError::invalid_request("missing or non-string 'orderBy'"))?
            .to_string();

        let order_type = root
            .get("orderType")
            .and_then(Value::as_str)
            .ok_or_else(|| ModelError::invalid_request("missing or non-string 'orderType'"))?;
        let order_direction = OrderDirection::parse(order_type).ok_or_else(|| {
            ModelError::invalid_request(format!("unknown orderType '{}'", order_type))
        })?;

        let request = Self {
            keyword,
            search_fields,
            equality_filters,
            columns,
            order_by,
            order_direction,
        };
        request.validate_fields()?;
        Ok(request)
    }

    /// Check that every field name is a plain identifier
    ///
    /// Field names are interpolated into condition and order expressions, so
    /// only `[A-Za-z_][A-Za-z0-9_.]*` is accepted. `*` is allowed as a column.
    pub fn validate_fields(&self) -> ModelResult<()> {
        let fields = self
            .search_fields
            .iter()
            .chain(self.equality_filters.keys())
            .chain(std::iter::once(&self.order_by));
        for field in fields {
            ensure_identifier(field)?;
        }
        for column in &self.columns {
            if column != "*" {
                ensure_identifier(column)?;
            }
        }
        // Equality placeholders are named after their field
        if let Some(field) = self.equality_filters.keys().find(|f| *f == SEARCH_KEYWORD) {
            return Err(RequestError::ReservedField {
                field: field.clone(),
            }
            .into());
        }
        Ok(())
    }
}

impl<'de> Deserialize<'de> for FilterRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        FilterRequest::from_value(&value).map_err(serde::de::Error::custom)
    }
}

/// Reject names that are not plain (optionally dotted) identifiers
pub fn ensure_identifier(field: &str) -> ModelResult<()> {
    static IDENT_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = IDENT_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
            .expect("identifier regex is valid")
    });
    if regex.is_match(field) {
        Ok(())
    } else {
        Err(RequestError::InvalidField {
            field: field.to_string(),
        }
        .into())
    }
}

fn string_list(value: &Value, name: &str) -> ModelResult<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| ModelError::invalid_request(format!("'{}' must be an array", name)))?;
    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                ModelError::invalid_request(format!("'{}' must only contain strings", name))
            })
        })
        .collect()
}

fn parse_filter_by(conditions: &Map<String, Value>) -> ModelResult<IndexMap<String, FilterValue>> {
    let filter_by = match conditions.get("filterBy") {
        None => return Err(ModelError::invalid_request("missing 'conditions.filterBy'")),
        Some(Value::Object(map)) => map,
        // An empty JSON array is how some clients spell "no filters"
        Some(Value::Array(items)) if items.is_empty() => return Ok(IndexMap::new()),
        Some(_) => {
            return Err(ModelError::invalid_request(
                "'conditions.filterBy' must be an object",
            ));
        }
    };

    let mut filters = IndexMap::with_capacity(filter_by.len());
    for (field, raw) in filter_by {
        let value = FilterValue::from_json(raw).ok_or_else(|| {
            ModelError::invalid_request(format!("filter '{}' must be a scalar value", field))
        })?;
        filters.insert(field.clone(), value);
    }
    Ok(filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor() -> Value {
        json!({
            "conditions": {
                "keyword": "abc",
                "searchKeywordIn": ["title", "body"],
                "filterBy": {"status": 1, "category": "news"}
            },
            "columns": ["id", "title"],
            "orderBy": "id",
            "orderType": "desc"
        })
    }

    #[test]
    fn test_parse_full_descriptor() {
        let request = FilterRequest::from_value(&descriptor()).unwrap();
        assert_eq!(request.keyword.as_deref(), Some("abc"));
        assert_eq!(request.search_fields, vec!["title", "body"]);
        assert_eq!(request.columns, vec!["id", "title"]);
        assert_eq!(request.order_by, "id");
        assert_eq!(request.order_direction, OrderDirection::Desc);
        assert!(request.has_keyword_search());
    }

    #[test]
    fn test_search_keyword_filter_is_reserved() {
        let mut value = descriptor();
        value["conditions"]["filterBy"] = json!({"searchKeyword": "x"});
        let err = FilterRequest::from_value(&value).unwrap_err();
        assert_eq!(err.error_code(), "RESERVED_FIELD");
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_conditions_is_invalid() {
        let mut value = descriptor();
        value.as_object_mut().unwrap().remove("conditions");
        let err = FilterRequest::from_value(&value).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_REQUEST");
    }

    #[test]
    fn test_missing_filter_by_is_invalid() {
        let mut value = descriptor();
        value["conditions"].as_object_mut().unwrap().remove("filterBy");
        assert!(FilterRequest::from_value(&value).is_err());
    }

    #[test]
    fn test_empty_array_filter_by_means_no_filters() {
        let mut value = descriptor();
        value["conditions"]["filterBy"] = json!([]);
        let request = FilterRequest::from_value(&value).unwrap();
        assert!(request.equality_filters.is_empty());
    }

    #[test]
    fn test_unknown_order_type_is_invalid() {
        let mut value = descriptor();
        value["orderType"] = json!("sideways");
        assert!(FilterRequest::from_value(&value).is_err());
    }

    #[test]
    fn test_field_names_must_be_identifiers() {
        let mut value = descriptor();
        value["conditions"]["searchKeywordIn"] = json!(["title; DROP TABLE x"]);
        let err = FilterRequest::from_value(&value).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_FIELD");

        assert!(ensure_identifier("Article.title").is_ok());
        assert!(ensure_identifier("1title").is_err());
    }

    #[test]
    fn test_deserialize_uses_same_rules() {
        let request: FilterRequest = serde_json::from_value(descriptor()).unwrap();
        assert_eq!(request.equality_filters.len(), 2);

        let bad: Result<FilterRequest, _> = serde_json::from_value(json!({"columns": []}));
        assert!(bad.is_err());
    }
}
