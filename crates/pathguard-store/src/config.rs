use std::path::Path;

use indexmap::IndexMap;
use pathguard_types::AccessLevel;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::store::{Store, StoreBuilder, DEFAULT_MAX_DEPTH};
use crate::value::Value;

/// Declarative definition of a store tree.
///
/// ```toml
/// default_policy = "read-write"
/// max_depth = 32
///
/// [permissions]
/// secret = "none"
///
/// [stores.profile]
/// default_policy = "read"
///
/// [stores.profile.permissions]
/// email = "none"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Level for fields without an explicit permission.
    pub default_policy: AccessLevel,
    /// Bound on consecutive descents through plain structures.
    pub max_depth: usize,
    /// Explicit per-field levels.
    pub permissions: IndexMap<String, AccessLevel>,
    /// Fields that hold nested stores, each with its own definition.
    pub stores: IndexMap<String, StoreConfig>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_policy: AccessLevel::ReadWrite,
            max_depth: DEFAULT_MAX_DEPTH,
            permissions: IndexMap::new(),
            stores: IndexMap::new(),
        }
    }
}

impl StoreConfig {
    /// Parse a TOML definition.
    pub fn from_toml_str(input: &str) -> StoreResult<Self> {
        toml::from_str(input).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Load a TOML definition from disk.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let input = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&input)
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> StoreResult<String> {
        toml::to_string(self).map_err(|e| StoreError::Config(e.to_string()))
    }

    fn builder(&self) -> StoreBuilder {
        let mut builder = Store::builder()
            .default_policy(self.default_policy)
            .max_depth(self.max_depth);
        for (field, level) in &self.permissions {
            builder = builder.permission(field.clone(), *level);
        }
        builder
    }
}

impl Store {
    /// Build an empty store tree from `config`.
    ///
    /// Every entry of `config.stores` becomes a nested, empty store.
    pub fn from_config(config: &StoreConfig) -> Self {
        let mut builder = config.builder();
        for (name, nested) in &config.stores {
            builder = builder.field(name.clone(), Store::from_config(nested));
        }
        builder.build()
    }

    /// Build a store tree from a JSON object document.
    ///
    /// Top-level keys become fields. Keys named in `config.stores` become
    /// nested stores populated from the corresponding sub-object; declared
    /// stores absent from the document are created empty. Initial values
    /// are loaded without permission checks.
    pub fn from_json(document: serde_json::Value, config: &StoreConfig) -> StoreResult<Self> {
        let serde_json::Value::Object(map) = document else {
            return Err(StoreError::InvalidDocument(format!(
                "expected a JSON object, got {}",
                json_kind(&document)
            )));
        };

        let absent: Vec<(&String, &StoreConfig)> = config
            .stores
            .iter()
            .filter(|(name, _)| !map.contains_key(name.as_str()))
            .collect();

        let mut builder = config.builder();
        for (name, json) in map {
            let value = match config.stores.get(&name) {
                Some(nested) => Value::Store(Store::from_json(json, nested).map_err(|e| match e {
                    StoreError::InvalidDocument(reason) => {
                        StoreError::InvalidDocument(format!("store '{name}': {reason}"))
                    }
                    other => other,
                })?),
                None => Value::from(json),
            };
            builder = builder.field(name, value);
        }
        for (name, nested) in absent {
            builder = builder.field(name.clone(), Store::from_config(nested));
        }
        Ok(builder.build())
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
