//! Settings
//!
//! Reads the nodeconf settings file: which directories hold config JSON and
//! which type names use the built-in node schema.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::common::{default_settings_path, IndexError, IndexResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Settings {
    /// Config root directories, relative to the settings file's directory
    #[serde(default)]
    pub configs_paths: Option<Vec<String>>,
    /// Type names registered with the generic node schema
    #[serde(default)]
    pub types: Vec<String>,
    /// Directory that relative `ConfigsPaths` entries resolve against
    #[serde(skip)]
    pub base_dir: PathBuf,
    #[serde(skip)]
    pub source: PathBuf,
}

impl Settings {
    /// Load settings from an explicit file
    pub fn load(path: &Path) -> IndexResult<Self> {
        if !path.is_file() {
            return Err(IndexError::SettingsMissing(format!(
                "no settings file at {:?}",
                path
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let mut settings: Settings = serde_json::from_str(&content)?;
        settings.source = path.to_path_buf();
        settings.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Load settings from `NODECONF_SETTINGS` or `~/.nodeconf/settings.json`
    pub fn load_default() -> IndexResult<Self> {
        let path = default_settings_path().map_err(IndexError::SettingsMissing)?;
        Self::load(&path)
    }

    /// Build in-memory settings rooted at `base_dir`
    pub fn with_roots<I, S>(base_dir: impl Into<PathBuf>, roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            configs_paths: Some(roots.into_iter().map(Into::into).collect()),
            types: Vec::new(),
            base_dir: base_dir.into(),
            source: PathBuf::new(),
        }
    }

    /// Resolve every configured root to an absolute, existing directory.
    ///
    /// Fails on the first missing list, empty entry, or absent directory, so
    /// a refresh never starts loading against a half-valid configuration.
    pub fn config_roots(&self) -> IndexResult<Vec<PathBuf>> {
        let Some(paths) = self.configs_paths.as_ref().filter(|p| !p.is_empty()) else {
            return Err(IndexError::SettingsMissing(format!(
                "ConfigsPaths is not set in {:?}",
                self.source
            )));
        };

        let mut roots = Vec::with_capacity(paths.len());
        for entry in paths {
            if entry.trim().is_empty() {
                return Err(IndexError::EmptyConfigPath(self.source.clone()));
            }

            let resolved = resolve_root(&self.base_dir, entry);
            if !resolved.is_dir() {
                return Err(IndexError::DirectoryNotFound(resolved));
            }
            roots.push(resolved);
        }

        Ok(roots)
    }
}

fn resolve_root(base_dir: &Path, entry: &str) -> PathBuf {
    let joined = base_dir.join(entry);
    let absolute = if joined.is_absolute() {
        joined
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&joined))
            .unwrap_or(joined)
    };
    normalize(&absolute)
}

/// Lexically drop `.` and fold `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
