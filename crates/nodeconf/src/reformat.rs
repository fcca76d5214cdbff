//! Config Reformatting
//!
//! Maintenance pass over every JSON file under the config roots: stamps
//! `Version` with the current Unix time and rewrites the file indented or
//! compact. Runs sequentially; it is not part of a refresh.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::common::{to_unix_time, IndexError, IndexResult};
use crate::configs::collect_json_files;
use crate::configs::loader::strip_bom;
use crate::index::FileFailure;

/// Field rewritten with the current Unix time
pub const VERSION_FIELD: &str = "Version";

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReformatReport {
    pub rewritten: usize,
    pub skipped: Vec<FileFailure>,
}

/// Reformat every JSON file under `roots`
pub fn reformat_configs(roots: &[PathBuf], indented: bool) -> IndexResult<ReformatReport> {
    let version = to_unix_time(Utc::now());
    let mut report = ReformatReport::default();

    for root in roots {
        for path in collect_json_files(root)? {
            match reformat_file(&path, indented, version) {
                Ok(()) => report.rewritten += 1,
                Err(e) => {
                    warn!("Skipping {:?}: {}", path, e);
                    report.skipped.push(FileFailure {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    info!(
        "Reformatted {} config files ({} skipped)",
        report.rewritten,
        report.skipped.len()
    );
    Ok(report)
}

/// Stamp `Version` and rewrite a single file. Key order is preserved.
pub fn reformat_file(path: &Path, indented: bool, version: i64) -> IndexResult<()> {
    let content = fs::read_to_string(path)?;
    let mut value: Value = serde_json::from_str(strip_bom(&content))?;

    let Some(object) = value.as_object_mut() else {
        return Err(IndexError::Load {
            path: path.to_path_buf(),
            message: "root is not a JSON object".to_string(),
        });
    };
    object.insert(VERSION_FIELD.to_string(), Value::String(version.to_string()));

    let output = if indented {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    fs::write(path, output)?;
    Ok(())
}
