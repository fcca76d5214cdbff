//! Config Registry
//!
//! Type-keyed store of loaded records and the files they came from. Safe to
//! fill from many loader tasks at once.

use indexmap::map::Entry;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::types::{Config, ConfigRecord};

/// A loaded record and its source file
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub record: ConfigRecord,
    pub path: PathBuf,
}

impl RegistryEntry {
    /// Typed view of the record
    pub fn downcast<T: 'static>(&self) -> Option<&T> {
        self.record.as_any().downcast_ref::<T>()
    }
}

/// Entries for one type, keyed by record address in insertion order.
/// Membership is by record identity, so two files with identical content
/// are two entries.
#[derive(Debug, Default)]
struct Bucket {
    entries: RwLock<IndexMap<usize, RegistryEntry>>,
}

impl Bucket {
    async fn insert(&self, entry: RegistryEntry) -> bool {
        // The entry holds the Arc, so the address stays unique while keyed
        let key = Arc::as_ptr(&entry.record) as *const () as usize;
        match self.entries.write().await.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
        }
    }
}

/// In-memory registry of loaded configs, keyed by type name
#[derive(Debug, Default)]
pub struct ConfigRegistry {
    buckets: RwLock<HashMap<String, Arc<Bucket>>>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record under its type. Returns `false` when this exact record
    /// instance is already registered.
    pub async fn insert(&self, type_name: &str, record: ConfigRecord, path: PathBuf) -> bool {
        let bucket = self.bucket(type_name).await;
        bucket.insert(RegistryEntry { record, path }).await
    }

    /// Existing bucket, or a new one created under the map's write lock
    async fn bucket(&self, type_name: &str) -> Arc<Bucket> {
        if let Some(bucket) = self.buckets.read().await.get(type_name) {
            return Arc::clone(bucket);
        }

        let mut buckets = self.buckets.write().await;
        Arc::clone(buckets.entry(type_name.to_string()).or_default())
    }

    /// Drop every bucket
    pub async fn clear(&self) {
        self.buckets.write().await.clear();
    }

    /// Entries registered for a type; empty when the type is unknown
    pub async fn lookup_by_type(&self, type_name: &str) -> Vec<RegistryEntry> {
        let bucket = match self.buckets.read().await.get(type_name) {
            Some(bucket) => Arc::clone(bucket),
            None => return Vec::new(),
        };
        let entries = bucket.entries.read().await;
        entries.values().cloned().collect()
    }

    /// Records of a type that downcast to `T`, with their source files
    pub async fn records_of<T: Config>(&self, type_name: &str) -> Vec<(Arc<T>, PathBuf)> {
        self.lookup_by_type(type_name)
            .await
            .into_iter()
            .filter_map(|entry| {
                let record = entry.record.into_any().downcast::<T>().ok()?;
                Some((record, entry.path))
            })
            .collect()
    }

    /// Type names with at least one bucket, sorted
    pub async fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.buckets.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Total number of entries across all types
    pub async fn len(&self) -> usize {
        let buckets: Vec<Arc<Bucket>> = self.buckets.read().await.values().cloned().collect();
        let mut total = 0;
        for bucket in buckets {
            total += bucket.entries.read().await.len();
        }
        total
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::types::NodesConfig;

    fn record(id: &str) -> ConfigRecord {
        Arc::new(NodesConfig {
            type_name: "T".into(),
            version: None,
            id: id.into(),
            children: None,
        })
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let registry = ConfigRegistry::new();
        assert!(registry.insert("T", record("A"), PathBuf::from("a.json")).await);
        assert!(registry.insert("T", record("B"), PathBuf::from("b.json")).await);

        let entries = registry.lookup_by_type("T").await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].downcast::<NodesConfig>().unwrap().id, "A");
        assert_eq!(registry.type_names().await, vec!["T".to_string()]);
    }

    #[tokio::test]
    async fn test_same_instance_is_noop() {
        let registry = ConfigRegistry::new();
        let shared = record("A");
        assert!(registry.insert("T", Arc::clone(&shared), PathBuf::from("a.json")).await);
        assert!(!registry.insert("T", shared, PathBuf::from("b.json")).await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_identical_content_not_deduplicated() {
        let registry = ConfigRegistry::new();
        registry.insert("T", record("A"), PathBuf::from("a.json")).await;
        registry.insert("T", record("A"), PathBuf::from("copy.json")).await;
        assert_eq!(registry.lookup_by_type("T").await.len(), 2);
    }

    #[tokio::test]
    async fn test_records_of_downcasts() {
        let registry = ConfigRegistry::new();
        let shared = record("A");
        registry.insert("T", Arc::clone(&shared), PathBuf::from("a.json")).await;
        registry.insert("T", record("B"), PathBuf::from("b.json")).await;

        let typed = registry.records_of::<NodesConfig>("T").await;
        assert_eq!(typed.len(), 2);
        assert_eq!(typed[0].0.id, "A");
        assert_eq!(typed[0].1, PathBuf::from("a.json"));
        assert_eq!(typed[1].0.id, "B");
        assert!(std::ptr::eq(
            Arc::as_ptr(&typed[0].0) as *const (),
            Arc::as_ptr(&shared) as *const ()
        ));
        assert!(registry.records_of::<NodesConfig>("Missing").await.is_empty());
    }

    #[tokio::test]
    async fn test_records_of_skips_other_types() {
        #[derive(Debug)]
        struct Other;

        impl Config for Other {
            fn as_any(&self) -> &dyn std::any::Any {
                self
            }

            fn into_any(self: Arc<Self>) -> Arc<dyn std::any::Any + Send + Sync> {
                self
            }
        }

        let registry = ConfigRegistry::new();
        registry.insert("T", record("A"), PathBuf::from("a.json")).await;
        registry.insert("T", Arc::new(Other), PathBuf::from("other.json")).await;

        assert_eq!(registry.lookup_by_type("T").await.len(), 2);
        let typed = registry.records_of::<NodesConfig>("T").await;
        assert_eq!(typed.len(), 1);
        assert_eq!(typed[0].1, PathBuf::from("a.json"));
    }

    #[tokio::test]
    async fn test_insertion_order_kept() {
        let registry = ConfigRegistry::new();
        for id in ["C", "A", "B"] {
            registry.insert("T", record(id), PathBuf::from(format!("{id}.json"))).await;
        }
        let ids: Vec<String> = registry
            .lookup_by_type("T")
            .await
            .iter()
            .map(|entry| entry.downcast::<NodesConfig>().unwrap().id.clone())
            .collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_unknown_type_is_empty() {
        let registry = ConfigRegistry::new();
        assert!(registry.lookup_by_type("Missing").await.is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let registry = ConfigRegistry::new();
        registry.insert("T", record("A"), PathBuf::from("a.json")).await;
        registry.clear().await;
        assert!(registry.is_empty().await);
        assert!(registry.type_names().await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_inserts() {
        let registry = Arc::new(ConfigRegistry::new());
        let mut set = tokio::task::JoinSet::new();
        for i in 0..64 {
            let registry = Arc::clone(&registry);
            set.spawn(async move {
                let type_name = if i % 2 == 0 { "Even" } else { "Odd" };
                registry
                    .insert(type_name, record(&i.to_string()), PathBuf::from(format!("{i}.json")))
                    .await
            });
        }
        while let Some(inserted) = set.join_next().await {
            assert!(inserted.unwrap());
        }

        assert_eq!(registry.len().await, 64);
        assert_eq!(registry.lookup_by_type("Even").await.len(), 32);
    }
}
