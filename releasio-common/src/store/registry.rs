//! Declarations of named cells
//!
//! Each cell the application persists is declared once with the shape the
//! running code expects and the value it falls back to. Keys that are not
//! registered are still readable and writable, but are never migrated.

use super::migrator::{Shape, StoreMigrator};
use crate::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct CellSpec {
    pub key: &'static str,
    pub shape: Shape,
    pub default: Value,
    /// Older keys whose value is copied forward when `key` is absent
    pub legacy_keys: Vec<&'static str>,
}

impl CellSpec {
    pub fn new(key: &'static str, shape: Shape, default: Value) -> Self {
        Self {
            key,
            shape,
            default,
            legacy_keys: Vec::new(),
        }
    }

    pub fn with_legacy_key(mut self, key: &'static str) -> Self {
        self.legacy_keys.push(key);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct CellRegistry {
    specs: HashMap<&'static str, Arc<CellSpec>>,
}

impl CellRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell declaration
    ///
    /// Rejects duplicate keys and defaults that do not already conform to the
    /// declared shape.
    pub fn register(&mut self, spec: CellSpec) -> Result<()> {
        if self.specs.contains_key(spec.key) {
            return Err(Error::Config(format!("cell '{}' registered twice", spec.key)));
        }

        spec.shape
            .validate_defaults()
            .map_err(|e| Error::Config(format!("cell '{}': {}", spec.key, e)))?;

        if StoreMigrator::migrate(&spec.shape, &spec.default).changed {
            return Err(Error::Config(format!(
                "cell '{}': default does not match its shape",
                spec.key
            )));
        }

        self.specs.insert(spec.key, Arc::new(spec));
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&CellSpec> {
        self.specs.get(key).map(Arc::as_ref)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
