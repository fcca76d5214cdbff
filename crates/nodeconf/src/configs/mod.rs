//! Config Records
//!
//! Type catalog, type-tag sniffing, loading, and the type-keyed registry of
//! parsed records.

pub mod catalog;
pub mod loader;
pub mod registry;
pub mod sniff;
pub mod types;

pub use catalog::{ConfigTypeDescriptor, LoadFn, TypeCatalog};
pub use loader::{collect_json_files, load_config, load_config_file, normalize_whitespace, FileOutcome};
pub use registry::{ConfigRegistry, RegistryEntry};
pub use sniff::{sniff_type, SNIFF_LEN};
pub use types::{Config, ConfigNode, ConfigRecord, NodeTree, NodesConfig};
