//! Read-side path tables.

use indexmap::IndexSet;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// "No selection" marker, first at every depth
pub const SENTINEL: &str = "-";

/// Depth requested from a [`TypePaths`] table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    Level(usize),
    /// The deepest level present for the type
    Deepest,
}

impl Depth {
    /// `-1` means deepest; other negatives have no meaning
    pub fn from_signed(depth: i64) -> Option<Self> {
        match depth {
            -1 => Some(Depth::Deepest),
            d if d >= 0 => usize::try_from(d).ok().map(Depth::Level),
            _ => None,
        }
    }
}

impl From<usize> for Depth {
    fn from(level: usize) -> Self {
        Depth::Level(level)
    }
}

/// Depth → ordered, distinct path prefixes for one type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypePaths {
    levels: BTreeMap<usize, IndexSet<String>>,
}

impl TypePaths {
    pub(crate) fn from_levels(levels: BTreeMap<usize, IndexSet<String>>) -> Self {
        Self { levels }
    }

    pub fn level(&self, depth: usize) -> Option<&IndexSet<String>> {
        self.levels.get(&depth)
    }

    /// Highest depth key present
    pub fn max_depth(&self) -> Option<usize> {
        self.levels.keys().next_back().copied()
    }

    pub fn get(&self, depth: Depth) -> Option<Vec<String>> {
        let depth = match depth {
            Depth::Level(level) => level,
            Depth::Deepest => self.max_depth()?,
        };
        self.level(depth).map(|set| set.iter().cloned().collect())
    }

    pub fn depth_count(&self) -> usize {
        self.levels.len()
    }
}

/// Path tables for every indexed type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathIndex {
    types: HashMap<String, TypePaths>,
}

impl PathIndex {
    pub(crate) fn from_types(types: HashMap<String, TypePaths>) -> Self {
        Self { types }
    }

    /// Paths for a type at a depth. `None` when the type was never indexed
    /// or the depth does not exist; an existing depth is never empty.
    pub fn get_paths(&self, type_name: &str, depth: impl Into<Depth>) -> Option<Vec<String>> {
        self.types.get(type_name)?.get(depth.into())
    }

    pub fn type_paths(&self, type_name: &str) -> Option<&TypePaths> {
        self.types.get(type_name)
    }

    pub fn max_depth(&self, type_name: &str) -> Option<usize> {
        self.types.get(type_name)?.max_depth()
    }

    /// Indexed type names, sorted
    pub fn types(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
