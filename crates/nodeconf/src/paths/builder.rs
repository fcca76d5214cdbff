//! Path flattening and prefix expansion.

use indexmap::IndexSet;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::index::{PathIndex, TypePaths, SENTINEL};
use crate::common::{IndexError, IndexResult};
use crate::configs::{NodeTree, RegistryEntry};

/// Deepest node nesting a walk accepts before assuming a cycle.
///
/// Trees read from JSON through `serde_json` stop at its recursion limit
/// (about 63 node levels for [`NodesConfig`](crate::configs::NodesConfig))
/// well before this, so only [`NodeTree`] impls built in code can reach it.
pub const MAX_NODE_DEPTH: usize = 256;

/// Full `/`-joined paths from the root to every leaf, in walk order.
///
/// A root without children is its own single path. Intermediate nodes never
/// appear on their own, only as prefixes of longer paths.
pub fn leaf_paths(root: &dyn NodeTree) -> IndexResult<IndexSet<String>> {
    let mut paths = IndexSet::new();
    let children = root.children();
    if children.is_empty() {
        paths.insert(root.id().to_string());
        return Ok(paths);
    }

    let mut relative = IndexSet::new();
    for child in children {
        walk(child, "", 1, root.id(), &mut relative)?;
    }

    for path in relative {
        if path.trim().is_empty() {
            continue;
        }
        paths.insert(format!("{}/{}", root.id(), path));
    }

    Ok(paths)
}

fn walk(
    node: &dyn NodeTree,
    prefix: &str,
    depth: usize,
    root: &str,
    out: &mut IndexSet<String>,
) -> IndexResult<()> {
    if depth > MAX_NODE_DEPTH {
        return Err(IndexError::NodeDepthExceeded {
            root: root.to_string(),
            limit: MAX_NODE_DEPTH,
        });
    }

    let path = format!("{}{}", prefix, node.id());
    let children = node.children();
    if children.is_empty() {
        out.insert(path);
        return Ok(());
    }

    let prefix = format!("{}/", path);
    for child in children {
        walk(child, &prefix, depth + 1, root, out)?;
    }
    Ok(())
}

/// Expand full paths into depth → distinct prefixes, each depth seeded with
/// the sentinel. Depth 0 exists even when there are no paths.
pub fn expand_prefixes<'a, I>(paths: I) -> TypePaths
where
    I: IntoIterator<Item = &'a str>,
{
    let mut levels: BTreeMap<usize, IndexSet<String>> = BTreeMap::new();
    levels.insert(0, seeded());

    for path in paths {
        let segments: Vec<&str> = path.split('/').collect();
        for depth in 0..segments.len() {
            let prefix = segments[..=depth].join("/");
            levels.entry(depth).or_insert_with(seeded).insert(prefix);
        }
    }

    TypePaths::from_levels(levels)
}

fn seeded() -> IndexSet<String> {
    IndexSet::from([SENTINEL.to_string()])
}

/// Build the path table for one type from its registry entries.
///
/// Entries are walked in source-path order so repeated refreshes over the
/// same files give identical tables. A record whose tree is too deep is
/// skipped; the rest of the type still indexes.
pub fn build_type_paths(type_name: &str, entries: &[RegistryEntry]) -> TypePaths {
    let mut ordered: Vec<&RegistryEntry> = entries.iter().collect();
    ordered.sort_by(|a, b| a.path.cmp(&b.path));

    let mut all_paths: IndexSet<String> = IndexSet::new();
    for entry in ordered {
        let Some(tree) = entry.record.as_node_tree() else {
            continue;
        };
        match leaf_paths(tree) {
            Ok(paths) => all_paths.extend(paths),
            Err(e) => warn!("Skipping {:?} while indexing {}: {}", entry.path, type_name, e),
        }
    }

    debug!("Indexed {}: {} leaf paths", type_name, all_paths.len());
    expand_prefixes(all_paths.iter().map(String::as_str))
}

/// Shared target for per-type indexing tasks.
///
/// Slot creation is the only synchronized step; each type is indexed at most
/// once and a second result for the same name is discarded.
#[derive(Debug, Default)]
pub struct PathIndexBuilder {
    types: Mutex<HashMap<String, TypePaths>>,
}

impl PathIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the type already has a table. Returns whether it was kept.
    pub async fn insert_if_absent(&self, type_name: &str, paths: TypePaths) -> bool {
        let mut types = self.types.lock().await;
        if types.contains_key(type_name) {
            debug!("Type {} already indexed, discarding duplicate", type_name);
            return false;
        }
        types.insert(type_name.to_string(), paths);
        true
    }

    /// Build and insert the table for one type
    pub async fn index_type(&self, type_name: &str, entries: &[RegistryEntry]) -> bool {
        let paths = build_type_paths(type_name, entries);
        self.insert_if_absent(type_name, paths).await
    }

    /// Take everything built so far
    pub async fn finish(&self) -> PathIndex {
        let types = std::mem::take(&mut *self.types.lock().await);
        PathIndex::from_types(types)
    }
}
