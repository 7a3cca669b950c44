//! Configuration loading and management

use crate::core::ModelRegistry;
use crate::core::error::ConfigError;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Model to table binding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name as callers refer to it (e.g., `App\Models\Article`)
    pub name: String,

    /// Backing table
    pub table: String,
}

/// Cache defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Default entry lifetime in seconds
    #[serde(default = "default_lifetime")]
    pub lifetime: u64,
}

fn default_lifetime() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            lifetime: default_lifetime(),
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    pub models: Vec<ModelConfig>,

    #[serde(default)]
    pub cache: CacheConfig,
}

impl ModelsConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Load(format!("{}: {}", path, e)))?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Load(e.to_string()))?;
        Ok(config)
    }

    /// Build the model registry; duplicate model names are an error
    pub fn registry(&self) -> Result<ModelRegistry> {
        let mut registry = ModelRegistry::new();
        for model in &self.models {
            registry.register(&model.name, &model.table)?;
        }
        Ok(registry)
    }

    /// Create a default configuration for testing
    pub fn default_config() -> Self {
        Self {
            models: vec![
                ModelConfig {
                    name: "Article".to_string(),
                    table: "articles".to_string(),
                },
                ModelConfig {
                    name: "Category".to_string(),
                    table: "categories".to_string(),
                },
            ],
            cache: CacheConfig::default(),
        }
    }
}
