//! In-memory implementation of DataStore for testing and development

use crate::core::condition::{Clause, CompiledCondition};
use crate::core::error::{ModelResult, StorageError};
use crate::core::query::{QueryDescriptor, Row};
use crate::core::request::OrderDirection;
use crate::core::store::{CacheInstruction, DataStore};
use crate::core::value::FilterValue;
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Number of times each store operation ran
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCalls {
    pub find_one: usize,
    pub find_many: usize,
    pub count: usize,
    pub execute: usize,
}

#[derive(Default)]
struct Inner {
    tables: HashMap<String, Vec<Row>>,
    calls: StoreCalls,
    last_instruction: Option<CacheInstruction>,
}

/// In-memory data store
///
/// Tables are vectors of JSON rows. Compiled conditions are evaluated
/// clause by clause: `LIKE` is a case-insensitive pattern match with `%` and
/// `_` wildcards, equality compares the bound value against the column.
/// Every call is counted so tests can assert how often the store was hit.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append rows to a table, creating it if needed
    ///
    /// Non-object values are ignored.
    pub fn insert_all(&self, table: &str, rows: Vec<Value>) {
        if let Ok(mut inner) = self.inner.write() {
            let target = inner.tables.entry(table.to_string()).or_default();
            target.extend(rows.into_iter().filter_map(|row| match row {
                Value::Object(map) => Some(map),
                _ => None,
            }));
        }
    }

    pub fn calls(&self) -> StoreCalls {
        self.inner
            .read()
            .map(|inner| inner.calls)
            .unwrap_or_default()
    }

    /// Caching instruction received by the most recent call
    pub fn last_instruction(&self) -> Option<CacheInstruction> {
        self.inner
            .read()
            .ok()
            .and_then(|inner| inner.last_instruction.clone())
    }

    fn run(
        &self,
        query: &QueryDescriptor,
        instruction: Option<&CacheInstruction>,
        record: impl FnOnce(&mut StoreCalls),
    ) -> ModelResult<Vec<Row>> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| StorageError::Backend(format!("Failed to acquire write lock: {}", e)))?;

        record(&mut inner.calls);
        inner.last_instruction = instruction.cloned();

        let rows = inner
            .tables
            .get(&query.table)
            .ok_or_else(|| StorageError::TableNotFound {
                table: query.table.clone(),
            })?;

        let mut matched = Vec::new();
        for row in rows {
            if matches_condition(row, query.conditions.as_ref())? {
                matched.push(row);
            }
        }
        Ok(matched.into_iter().cloned().collect())
    }
}

#[async_trait]
impl DataStore for InMemoryStore {
    async fn find_one(
        &self,
        query: &QueryDescriptor,
        cache: Option<&CacheInstruction>,
    ) -> ModelResult<Option<Row>> {
        let rows = self.run(query, cache, |calls| calls.find_one += 1)?;
        let bounded = QueryDescriptor {
            limit: Some(1),
            ..query.clone()
        };
        Ok(shape(rows, &bounded).into_iter().next())
    }

    async fn find_many(
        &self,
        query: &QueryDescriptor,
        cache: Option<&CacheInstruction>,
    ) -> ModelResult<Vec<Row>> {
        let rows = self.run(query, cache, |calls| calls.find_many += 1)?;
        Ok(shape(rows, query))
    }

    async fn count(
        &self,
        query: &QueryDescriptor,
        cache: Option<&CacheInstruction>,
    ) -> ModelResult<usize> {
        Ok(self.run(query, cache, |calls| calls.count += 1)?.len())
    }

    async fn execute(
        &self,
        query: &QueryDescriptor,
        cache: Option<&CacheInstruction>,
    ) -> ModelResult<Vec<Row>> {
        let rows = self.run(query, cache, |calls| calls.execute += 1)?;
        Ok(shape(rows, query))
    }
}

/// Sort, window and project matched rows
fn shape(mut rows: Vec<Row>, query: &QueryDescriptor) -> Vec<Row> {
    if let Some(order) = &query.order {
        let field = column_name(&order.field);
        rows.sort_by(|a, b| {
            let ord = compare_values(a.get(field), b.get(field));
            match order.direction {
                OrderDirection::Asc => ord,
                OrderDirection::Desc => ord.reverse(),
            }
        });
    }

    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(usize::MAX);

    rows.into_iter()
        .skip(offset)
        .take(limit)
        .map(|row| project(row, &query.columns))
        .collect()
}

fn project(row: Row, columns: &[String]) -> Row {
    if columns.is_empty() || columns.iter().any(|c| c == "*") {
        return row;
    }
    columns
        .iter()
        .filter_map(|column| {
            let name = column_name(column);
            row.get(name).map(|v| (name.to_string(), v.clone()))
        })
        .collect()
}

/// `Article.title` -> `title`
fn column_name(field: &str) -> &str {
    field.rsplit('.').next().unwrap_or(field)
}

fn matches_condition(row: &Row, condition: Option<&CompiledCondition>) -> ModelResult<bool> {
    let Some(condition) = condition else {
        return Ok(true);
    };

    for clause in condition.clauses() {
        let matched = match clause {
            Clause::Search {
                fields,
                placeholder,
            } => {
                let pattern = binding_text(condition, placeholder)?;
                fields.iter().any(|field| {
                    row.get(column_name(field))
                        .and_then(value_text)
                        .is_some_and(|text| like(&text, &pattern))
                })
            }
            Clause::Equals { field, placeholder } => {
                let bound = condition.bindings().get(placeholder).ok_or_else(|| {
                    StorageError::MissingBinding {
                        placeholder: placeholder.clone(),
                    }
                })?;
                row.get(column_name(field))
                    .is_some_and(|value| equals(value, bound))
            }
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn binding_text(condition: &CompiledCondition, placeholder: &str) -> ModelResult<String> {
    match condition.bindings().get(placeholder) {
        Some(FilterValue::String(s)) => Ok(s.clone()),
        Some(other) => Ok(value_text(&other.to_json()).unwrap_or_default()),
        None => Err(StorageError::MissingBinding {
            placeholder: placeholder.to_string(),
        }
        .into()),
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        _ => None,
    }
}

/// Loose equality in the way SQL compares a column against a bound literal
fn equals(column: &Value, bound: &FilterValue) -> bool {
    match (column, bound) {
        (Value::String(a), FilterValue::String(b)) => a == b,
        (Value::Number(n), FilterValue::String(s)) => s.parse::<f64>().ok() == n.as_f64(),
        (Value::String(s), FilterValue::Integer(i)) => s.parse::<i64>().ok() == Some(*i),
        (Value::Number(n), FilterValue::Integer(i)) => n.as_f64() == Some(*i as f64),
        (Value::Number(n), FilterValue::Float(f)) => n.as_f64() == Some(*f),
        (Value::Bool(a), FilterValue::Boolean(b)) => a == b,
        (Value::Number(n), FilterValue::Boolean(b)) => n.as_i64() == Some(i64::from(*b)),
        (Value::Bool(a), FilterValue::Integer(i)) => i64::from(*a) == *i,
        _ => false,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

/// Case-insensitive SQL `LIKE` with `%` (any run) and `_` (one char)
fn like(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.to_lowercase().chars().collect();
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();

    // dp[j]: pattern[..i] matches text[..j]
    let mut dp = vec![false; text.len() + 1];
    dp[0] = true;
    for p in &pattern {
        let mut next = vec![false; text.len() + 1];
        match p {
            '%' => {
                let mut seen = false;
                for j in 0..=text.len() {
                    seen |= dp[j];
                    next[j] = seen;
                }
            }
            _ => {
                for j in 1..=text.len() {
                    next[j] = dp[j - 1] && (*p == '_' || *p == text[j - 1]);
                }
            }
        }
        dp = next;
    }
    dp[text.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::condition::compile;
    use crate::core::query::{FindParams, OrderBy};
    use crate::core::request::FilterRequest;
    use serde_json::json;

    fn store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.insert_all(
            "articles",
            vec![
                json!({"id": 1, "title": "Intro to Rust", "body": "ownership", "status": 1, "category": "news"}),
                json!({"id": 2, "title": "PHP tips", "body": "arrays in rust?", "status": 1, "category": "blog"}),
                json!({"id": 3, "title": "Draft", "body": "nothing", "status": 0, "category": "news"}),
            ],
        );
        store
    }

    fn query(request: &FilterRequest) -> QueryDescriptor {
        let mut descriptor = QueryDescriptor::from_params(
            "Article",
            "articles",
            &FindParams::new().conditions(compile(request).unwrap()),
        );
        descriptor.order = Some(OrderBy::new("id", OrderDirection::Asc));
        descriptor
    }

    #[test]
    fn test_like() {
        assert!(like("Intro to Rust", "%rust%"));
        assert!(like("abc", "a_c"));
        assert!(like("abc", "%"));
        assert!(!like("abc", "%d%"));
        assert!(!like("abc", "ab"));
    }

    #[tokio::test]
    async fn test_keyword_search_across_fields() {
        let store = store();
        let request = FilterRequest::new("id")
            .keyword("rust")
            .search_in(["title", "body"]);

        let rows = store.find_many(&query(&request), None).await.unwrap();
        let ids: Vec<&Value> = rows.iter().map(|r| &r["id"]).collect();
        assert_eq!(ids, vec![&json!(1), &json!(2)]);
    }

    #[tokio::test]
    async fn test_equality_and_count() {
        let store = store();
        let request = FilterRequest::new("id")
            .filter("status", 1)
            .filter("category", "news");

        assert_eq!(store.count(&query(&request), None).await.unwrap(), 1);
        assert_eq!(store.calls().count, 1);
    }

    #[tokio::test]
    async fn test_order_limit_and_projection() {
        let store = store();
        let mut descriptor = query(&FilterRequest::new("id"));
        descriptor.order = Some(OrderBy::new("Article.id", OrderDirection::Desc));
        descriptor.columns = vec!["id".to_string(), "title".to_string()];
        descriptor.limit = Some(2);
        descriptor.offset = Some(1);

        let rows = store.execute(&descriptor, None).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], json!(2));
        assert_eq!(rows[1]["id"], json!(1));
        assert!(rows[0].get("body").is_none());
    }

    #[tokio::test]
    async fn test_find_one_respects_order() {
        let store = store();
        let mut descriptor = query(&FilterRequest::new("id").filter("category", "news"));
        descriptor.order = Some(OrderBy::new("id", OrderDirection::Desc));

        let row = store.find_one(&descriptor, None).await.unwrap().unwrap();
        assert_eq!(row["id"], json!(3));
    }

    #[tokio::test]
    async fn test_unknown_table() {
        let store = InMemoryStore::new();
        let descriptor = query(&FilterRequest::new("id"));
        let err = store.find_many(&descriptor, None).await.unwrap_err();
        assert_eq!(err.error_code(), "STORAGE_ERROR");
    }
}
