//! Condition compilation
//!
//! Turns a [`FilterRequest`] into a placeholder-parameterized condition
//! expression with its bind values and bind types.
//!
//! ```rust,ignore
//! let request = FilterRequest::new("id")
//!     .keyword("abc")
//!     .search_in(["title", "body"])
//!     .filter("status", 1);
//!
//! let condition = compile(&request)?.expect("has clauses");
//! assert_eq!(
//!     condition.expression(),
//!     "(title LIKE :searchKeyword: OR body LIKE :searchKeyword:) AND status = :status:"
//! );
//! ```

use crate::core::error::ModelResult;
use crate::core::request::FilterRequest;
use crate::core::value::{BindType, BindValue, FilterValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Placeholder name used for the keyword search binding
pub const SEARCH_KEYWORD: &str = "searchKeyword";

/// One clause of a compiled condition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Clause {
    /// `(f1 LIKE :p: OR f2 LIKE :p: ...)`
    Search {
        fields: Vec<String>,
        placeholder: String,
    },
    /// `field = :placeholder:`
    Equals { field: String, placeholder: String },
}

impl Clause {
    fn render(&self) -> String {
        match self {
            Clause::Search {
                fields,
                placeholder,
            } => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|field| format!("{} LIKE :{}:", field, placeholder))
                    .collect();
                format!("({})", parts.join(" OR "))
            }
            Clause::Equals { field, placeholder } => format!("{} = :{}:", field, placeholder),
        }
    }
}

/// A parameterized condition ready to hand to a data store
///
/// Built once by [`compile`] and never mutated afterwards. The clause list is
/// kept alongside the rendered expression so stores that do not parse SQL
/// can still evaluate it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompiledCondition {
    expression: String,
    bindings: IndexMap<String, FilterValue>,
    binding_types: IndexMap<String, BindType>,
    clauses: Vec<Clause>,
}

impl CompiledCondition {
    fn from_clauses(clauses: Vec<Clause>, binds: IndexMap<String, BindValue>) -> Self {
        let expression = clauses
            .iter()
            .map(Clause::render)
            .collect::<Vec<_>>()
            .join(" AND ");
        let mut bindings = IndexMap::with_capacity(binds.len());
        let mut binding_types = IndexMap::with_capacity(binds.len());
        for (name, bind) in binds {
            binding_types.insert(name.clone(), bind.kind);
            bindings.insert(name, bind.value);
        }
        Self {
            expression,
            bindings,
            binding_types,
            clauses,
        }
    }

    /// The rendered expression, placeholders written as `:name:`
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn bindings(&self) -> &IndexMap<String, FilterValue> {
        &self.bindings
    }

    pub fn binding_types(&self) -> &IndexMap<String, BindType> {
        &self.binding_types
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Bound value and type for a placeholder
    pub fn binding(&self, placeholder: &str) -> Option<BindValue> {
        let value = self.bindings.get(placeholder)?;
        let kind = *self.binding_types.get(placeholder)?;
        Some(BindValue {
            kind,
            value: value.clone(),
        })
    }
}

/// Compile a filter request into a condition
///
/// Keyword search comes first, then one equality clause per truthy filter in
/// the request's filter order. Returns `Ok(None)` when nothing was produced,
/// which callers must treat as "no filter".
pub fn compile(request: &FilterRequest) -> ModelResult<Option<CompiledCondition>> {
    request.validate_fields()?;

    let mut clauses = Vec::new();
    let mut binds: IndexMap<String, BindValue> = IndexMap::new();

    if request.has_keyword_search() {
        let keyword = request.keyword.as_deref().unwrap_or_default();
        clauses.push(Clause::Search {
            fields: request.search_fields.clone(),
            placeholder: SEARCH_KEYWORD.to_string(),
        });
        binds.insert(
            SEARCH_KEYWORD.to_string(),
            BindValue::string(format!("%{}%", keyword)),
        );
    }

    for (field, value) in &request.equality_filters {
        if !value.is_truthy() {
            continue;
        }
        clauses.push(Clause::Equals {
            field: field.clone(),
            placeholder: field.clone(),
        });
        binds.insert(field.clone(), BindValue::classify(value.clone()));
    }

    if clauses.is_empty() {
        return Ok(None);
    }

    Ok(Some(CompiledCondition::from_clauses(clauses, binds)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_request_compiles_to_none() {
        let request = FilterRequest::new("id");
        assert!(compile(&request).unwrap().is_none());
    }

    #[test]
    fn test_keyword_without_fields_is_ignored() {
        let request = FilterRequest::new("id").keyword("abc");
        assert!(compile(&request).unwrap().is_none());
    }

    #[test]
    fn test_fields_without_keyword_are_ignored() {
        let request = FilterRequest::new("id").keyword("").search_in(["title"]);
        assert!(compile(&request).unwrap().is_none());
    }

    #[test]
    fn test_filter_cannot_shadow_keyword_binding() {
        let request = FilterRequest::new("id")
            .keyword("abc")
            .search_in(["title"])
            .filter(SEARCH_KEYWORD, "x");
        let err = compile(&request).unwrap_err();
        assert_eq!(err.error_code(), "RESERVED_FIELD");
    }

    #[test]
    fn test_keyword_search() {
        let request = FilterRequest::new("id")
            .keyword("abc")
            .search_in(["title", "body"]);
        let condition = compile(&request).unwrap().unwrap();

        assert_eq!(
            condition.expression(),
            "(title LIKE :searchKeyword: OR body LIKE :searchKeyword:)"
        );
        assert_eq!(
            condition.bindings().get("searchKeyword"),
            Some(&FilterValue::String("%abc%".to_string()))
        );
        assert_eq!(
            condition.binding_types().get("searchKeyword"),
            Some(&BindType::String)
        );
    }

    #[test]
    fn test_equality_filters_keep_order_and_types() {
        let request = FilterRequest::new("id")
            .filter("status", 1)
            .filter("category", "news");
        let condition = compile(&request).unwrap().unwrap();

        assert_eq!(
            condition.expression(),
            "status = :status: AND category = :category:"
        );
        assert_eq!(condition.binding_types()["status"], BindType::Integer);
        assert_eq!(condition.binding_types()["category"], BindType::String);
        let keys: Vec<&String> = condition.bindings().keys().collect();
        assert_eq!(keys, vec!["status", "category"]);
    }

    #[test]
    fn test_wire_filter_order_is_preserved() {
        let request = FilterRequest::from_value(&json!({
            "conditions": {"filterBy": {"status": 1, "category": "news"}},
            "columns": ["*"],
            "orderBy": "id",
            "orderType": "ASC"
        }))
        .unwrap();
        let condition = compile(&request).unwrap().unwrap();
        assert_eq!(
            condition.expression(),
            "status = :status: AND category = :category:"
        );
    }

    #[test]
    fn test_falsy_filters_are_skipped() {
        let request = FilterRequest::new("id")
            .filter("status", 0)
            .filter("category", "")
            .filter("featured", false);
        assert!(compile(&request).unwrap().is_none());

        let request = FilterRequest::new("id")
            .filter("status", 0)
            .filter("category", "news");
        let condition = compile(&request).unwrap().unwrap();
        assert_eq!(condition.expression(), "category = :category:");
        assert!(condition.bindings().get("status").is_none());
    }

    #[test]
    fn test_search_comes_before_filters() {
        let request = FilterRequest::new("id")
            .filter("status", 1)
            .keyword("rust")
            .search_in(["title"]);
        let condition = compile(&request).unwrap().unwrap();
        assert_eq!(
            condition.expression(),
            "(title LIKE :searchKeyword:) AND status = :status:"
        );
        assert_eq!(condition.clauses().len(), 2);
    }

    #[test]
    fn test_floats_and_booleans_bind_as_integer() {
        let request = FilterRequest::new("id")
            .filter("rating", 4.5)
            .filter("published", true);
        let condition = compile(&request).unwrap().unwrap();
        assert_eq!(condition.binding_types()["rating"], BindType::Integer);
        assert_eq!(condition.binding_types()["published"], BindType::Integer);
        assert_eq!(
            condition.binding("rating").unwrap().value,
            FilterValue::Float(4.5)
        );
    }

    #[test]
    fn test_invalid_field_is_rejected() {
        let request = FilterRequest::new("id").filter("status = 1 OR 1", 1);
        assert!(compile(&request).is_err());
    }
}
