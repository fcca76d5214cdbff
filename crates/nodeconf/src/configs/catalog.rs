//! Type Catalog
//!
//! Explicit name → loader registration. Schemas are registered once at
//! startup; a refresh only reads the catalog.

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use super::types::{Config, ConfigRecord};

/// Deserializes normalized text; `Ok(None)` for a `null` document
pub type LoadFn = fn(&str) -> Result<Option<ConfigRecord>, serde_json::Error>;

/// A registered config type
#[derive(Clone)]
pub struct ConfigTypeDescriptor {
    name: String,
    load: LoadFn,
}

impl ConfigTypeDescriptor {
    pub fn new(name: impl Into<String>, load: LoadFn) -> Self {
        Self {
            name: name.into(),
            load,
        }
    }

    /// Descriptor that deserializes JSON straight into `T`
    pub fn of<T>(name: impl Into<String>) -> Self
    where
        T: Config + DeserializeOwned,
    {
        Self::new(name, load_json::<T>)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn load(&self, text: &str) -> Result<Option<ConfigRecord>, serde_json::Error> {
        (self.load)(text)
    }
}

impl std::fmt::Debug for ConfigTypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigTypeDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn load_json<T>(text: &str) -> Result<Option<ConfigRecord>, serde_json::Error>
where
    T: Config + DeserializeOwned,
{
    let parsed: Option<T> = serde_json::from_str(text)?;
    Ok(parsed.map(|config| Arc::new(config) as ConfigRecord))
}

/// Registry of known config types, keyed by the short name used in `"Type"`
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: HashMap<String, ConfigTypeDescriptor>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor; a later registration under the same name wins
    pub fn register(&mut self, descriptor: ConfigTypeDescriptor) -> &mut Self {
        if let Some(previous) = self.types.insert(descriptor.name.clone(), descriptor) {
            warn!("Config type '{}' registered twice, keeping the latest", previous.name);
        }
        self
    }

    pub fn register_type<T>(&mut self, name: impl Into<String>) -> &mut Self
    where
        T: Config + DeserializeOwned,
    {
        self.register(ConfigTypeDescriptor::of::<T>(name))
    }

    pub fn get(&self, name: &str) -> Option<&ConfigTypeDescriptor> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
