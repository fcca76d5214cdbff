//! Path Index
//!
//! Flattens node trees into `/`-joined leaf paths and expands them into
//! per-depth prefix tables for step-by-step selection.

pub mod builder;
pub mod index;

pub use builder::{build_type_paths, expand_prefixes, leaf_paths, PathIndexBuilder, MAX_NODE_DEPTH};
pub use index::{Depth, PathIndex, TypePaths, SENTINEL};
