//! nodeconf
//!
//! Discovers typed JSON config files under a set of directories, keeps a
//! type-keyed registry of the parsed records, and derives per-depth path
//! tables from node-tree configs for step-by-step selection UIs.

pub mod common;
pub mod configs;
pub mod index;
pub mod paths;
pub mod reformat;
pub mod settings;
pub mod task;

pub use common::{IndexError, IndexResult};
pub use configs::{
    Config, ConfigNode, ConfigRecord, ConfigRegistry, ConfigTypeDescriptor, NodeTree, NodesConfig,
    RegistryEntry, TypeCatalog,
};
pub use index::{ConfigIndex, FileFailure, RefreshReport, Snapshot};
pub use paths::{Depth, PathIndex, TypePaths, SENTINEL};
pub use reformat::{reformat_configs, ReformatReport};
pub use settings::Settings;
