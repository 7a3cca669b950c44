//! Model to table mapping

use crate::core::error::{ConfigError, ModelResult};
use std::collections::HashMap;

/// Explicit `model name -> table name` mapping, resolved at startup
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    tables: HashMap<String, String>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model; a model may only be registered once
    pub fn register(
        &mut self,
        model: impl Into<String>,
        table: impl Into<String>,
    ) -> ModelResult<()> {
        let model = model.into();
        if self.tables.contains_key(&model) {
            return Err(ConfigError::DuplicateModel { model }.into());
        }
        self.tables.insert(model, table.into());
        Ok(())
    }

    /// Builder-style registration for static setups
    pub fn with(mut self, model: impl Into<String>, table: impl Into<String>) -> Self {
        self.tables.insert(model.into(), table.into());
        self
    }

    pub fn table_name(&self, model: &str) -> ModelResult<&str> {
        self.tables
            .get(model)
            .map(String::as_str)
            .ok_or_else(|| {
                ConfigError::UnknownModel {
                    model: model.to_string(),
                }
                .into()
            })
    }

    pub fn contains(&self, model: &str) -> bool {
        self.tables.contains_key(model)
    }

    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
