//! Config Index
//!
//! Owns the published registry + path index snapshot and rebuilds both on
//! refresh.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::common::{IndexError, IndexResult};
use crate::configs::{collect_json_files, load_config_file, ConfigRegistry, FileOutcome, RegistryEntry, TypeCatalog};
use crate::paths::{Depth, PathIndex, PathIndexBuilder};
use crate::settings::Settings;
use crate::task::{default_limit, fan_out};

/// Registry and path index built by one refresh, published together
#[derive(Debug, Default)]
pub struct Snapshot {
    pub registry: Arc<ConfigRegistry>,
    pub paths: PathIndex,
}

/// A file that could not be loaded
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Counters from one refresh
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshReport {
    pub roots: usize,
    pub files: usize,
    pub loaded: usize,
    /// Files without a type tag, or tagged with a type the catalog lacks
    pub skipped: usize,
    pub failures: Vec<FileFailure>,
    /// Loader or indexing tasks that panicked
    pub aborted_tasks: usize,
    pub types: Vec<String>,
}

/// Loads configs from disk and answers path queries.
///
/// Readers always see either the previous snapshot or the complete new one.
pub struct ConfigIndex {
    catalog: Arc<TypeCatalog>,
    snapshot: RwLock<Arc<Snapshot>>,
    refresh_lock: Mutex<()>,
    task_limit: usize,
}

impl ConfigIndex {
    pub fn new(catalog: TypeCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
            refresh_lock: Mutex::new(()),
            task_limit: default_limit(),
        }
    }

    /// Cap on concurrently running loader/indexing tasks
    pub fn with_task_limit(mut self, limit: usize) -> Self {
        self.task_limit = limit.max(1);
        self
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Rebuild from the roots named in `settings`.
    ///
    /// Missing settings, an empty root list, an empty entry, or a root that
    /// does not exist all fail before any file is read, and leave the index
    /// empty.
    pub async fn refresh(&self, settings: Option<&Settings>) -> IndexResult<RefreshReport> {
        let _guard = self.refresh_lock.lock().await;

        let roots = settings
            .ok_or_else(|| IndexError::SettingsMissing("no settings available".to_string()))
            .and_then(Settings::config_roots);

        match roots {
            Ok(roots) => self.rebuild(&roots).await,
            Err(e) => {
                self.publish(Snapshot::default()).await;
                Err(e)
            }
        }
    }

    /// Rebuild from explicit root directories
    pub async fn refresh_roots(&self, roots: &[PathBuf]) -> IndexResult<RefreshReport> {
        let _guard = self.refresh_lock.lock().await;

        if roots.is_empty() {
            self.publish(Snapshot::default()).await;
            return Err(IndexError::SettingsMissing("no config roots given".to_string()));
        }
        if let Some(missing) = roots.iter().find(|root| !root.is_dir()) {
            self.publish(Snapshot::default()).await;
            return Err(IndexError::DirectoryNotFound(missing.clone()));
        }

        self.rebuild(roots).await
    }

    async fn rebuild(&self, roots: &[PathBuf]) -> IndexResult<RefreshReport> {
        let registry = Arc::new(ConfigRegistry::new());
        let mut report = RefreshReport {
            roots: roots.len(),
            ..Default::default()
        };

        for root in roots {
            if let Err(e) = self.load_root(root, &registry, &mut report).await {
                self.publish(Snapshot::default()).await;
                return Err(e);
            }
        }

        let builder = Arc::new(PathIndexBuilder::new());
        let type_names = registry.type_names().await;
        let indexed = fan_out("index_type", self.task_limit, type_names, |type_name| {
            let registry = Arc::clone(&registry);
            let builder = Arc::clone(&builder);
            async move {
                let entries = registry.lookup_by_type(&type_name).await;
                builder.index_type(&type_name, &entries).await
            }
        })
        .await;
        report.aborted_tasks += indexed.failed;

        let paths = builder.finish().await;
        report.types = paths.types();

        info!(
            "Config index refreshed: {} files, {} loaded, {} types",
            report.files,
            report.loaded,
            report.types.len()
        );

        self.publish(Snapshot { registry, paths }).await;
        Ok(report)
    }

    async fn load_root(
        &self,
        root: &Path,
        registry: &Arc<ConfigRegistry>,
        report: &mut RefreshReport,
    ) -> IndexResult<()> {
        let files = collect_json_files(root)?;
        info!("Scanning {} JSON files under {:?}", files.len(), root);
        report.files += files.len();

        let loaded = fan_out("load_config", self.task_limit, files, |path| {
            let catalog = Arc::clone(&self.catalog);
            let registry = Arc::clone(registry);
            async move {
                let outcome = load_config_file(&path, &catalog).await;
                if let FileOutcome::Loaded { type_name, record } = &outcome {
                    registry.insert(type_name, Arc::clone(record), path.clone()).await;
                }
                (path, outcome)
            }
        })
        .await;

        report.aborted_tasks += loaded.failed;
        for (path, outcome) in loaded.results {
            match outcome {
                FileOutcome::Loaded { .. } => report.loaded += 1,
                FileOutcome::Untyped | FileOutcome::UnknownType(_) => report.skipped += 1,
                FileOutcome::Empty => report.failures.push(FileFailure {
                    path,
                    reason: "document is null".to_string(),
                }),
                FileOutcome::Failed(e) => report.failures.push(FileFailure {
                    path,
                    reason: e.to_string(),
                }),
            }
        }

        if loaded.failed > 0 {
            warn!("{} loader tasks aborted under {:?}", loaded.failed, root);
        }
        Ok(())
    }

    async fn publish(&self, snapshot: Snapshot) {
        *self.snapshot.write().await = Arc::new(snapshot);
    }

    /// The currently published snapshot
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.snapshot.read().await)
    }

    /// Path prefixes for a type at a depth, `None` if unknown
    pub async fn get_paths(&self, type_name: &str, depth: impl Into<Depth>) -> Option<Vec<String>> {
        self.snapshot().await.paths.get_paths(type_name, depth)
    }

    /// Loaded records of a type with their source files; empty if unknown
    pub async fn lookup_by_type(&self, type_name: &str) -> Vec<RegistryEntry> {
        let snapshot = self.snapshot().await;
        snapshot.registry.lookup_by_type(type_name).await
    }

    /// Indexed type names, sorted
    pub async fn types(&self) -> Vec<String> {
        self.snapshot().await.paths.types()
    }
}
