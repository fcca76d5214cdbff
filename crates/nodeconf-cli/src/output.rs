//! JSON output for CLI subcommands.

use serde::Serialize;
use std::path::PathBuf;

use nodeconf::RegistryEntry;

/// One row of `nodeconf lookup`
#[derive(Debug, Serialize)]
pub struct LookupRow {
    pub path: PathBuf,
    /// Root id, when the record is a node tree
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl LookupRow {
    pub fn from_entry(entry: &RegistryEntry) -> Self {
        Self {
            path: entry.path.clone(),
            id: entry
                .record
                .as_node_tree()
                .map(|tree| tree.id().to_string()),
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
