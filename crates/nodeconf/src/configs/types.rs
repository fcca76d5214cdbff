//! Config Types
//!
//! The capabilities a loaded record can expose, plus the built-in node-tree
//! schema matching the `Type` / `Version` / `Id` / `Children` JSON layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::common::from_unix_time;

/// A loaded config record, shared between the registry and its readers
pub type ConfigRecord = Arc<dyn Config>;

/// Minimal capability every loaded record has
pub trait Config: Any + Send + Sync + fmt::Debug {
    /// Node-tree view of the record, if its type opts into path indexing
    fn as_node_tree(&self) -> Option<&dyn NodeTree> {
        None
    }

    fn as_any(&self) -> &dyn Any;

    /// Owned view for downcasting a shared record to its concrete type
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// A node with an id and ordered children; no children means leaf
pub trait NodeTree {
    fn id(&self) -> &str;

    fn children(&self) -> Vec<&dyn NodeTree>;
}

/// Child node of a [`NodesConfig`] tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfigNode {
    pub id: String,
    #[serde(default)]
    pub children: Option<Vec<ConfigNode>>,
}

impl ConfigNode {
    pub fn leaf(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            children: None,
        }
    }

    pub fn branch(id: impl Into<String>, children: Vec<ConfigNode>) -> Self {
        Self {
            id: id.into(),
            children: Some(children),
        }
    }
}

impl NodeTree for ConfigNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn children(&self) -> Vec<&dyn NodeTree> {
        child_views(&self.children)
    }
}

/// Generic node-tree config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodesConfig {
    #[serde(rename = "Type")]
    pub type_name: String,
    /// Unix-epoch seconds, stored as a string
    #[serde(default)]
    pub version: Option<String>,
    pub id: String,
    #[serde(default)]
    pub children: Option<Vec<ConfigNode>>,
}

impl NodesConfig {
    /// Parsed `Version` stamp; `None` when absent or not an integer
    pub fn version_time(&self) -> Option<DateTime<Utc>> {
        let seconds = self.version.as_deref()?.trim().parse::<i64>().ok()?;
        from_unix_time(seconds)
    }
}

impl NodeTree for NodesConfig {
    fn id(&self) -> &str {
        &self.id
    }

    fn children(&self) -> Vec<&dyn NodeTree> {
        child_views(&self.children)
    }
}

impl Config for NodesConfig {
    fn as_node_tree(&self) -> Option<&dyn NodeTree> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

fn child_views(children: &Option<Vec<ConfigNode>>) -> Vec<&dyn NodeTree> {
    children
        .iter()
        .flatten()
        .map(|child| child as &dyn NodeTree)
        .collect()
}
