//! Config Loader
//!
//! Scans config directories for JSON files, sniffs their type tag, and
//! deserializes the ones the catalog knows about.

use std::fs;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use super::catalog::{ConfigTypeDescriptor, TypeCatalog};
use super::sniff::{sniff_type, SNIFF_LEN};
use super::types::ConfigRecord;
use crate::common::{IndexError, IndexResult};

/// What happened to a single file during a load
#[derive(Debug)]
pub enum FileOutcome {
    Loaded {
        type_name: String,
        record: ConfigRecord,
    },
    /// No `"Type"` tag in the leading window
    Untyped,
    /// Declared type is not in the catalog
    UnknownType(String),
    /// The document deserialized to `null`
    Empty,
    Failed(IndexError),
}

/// Collect all `.json` files under a directory tree (recursive, sorted)
pub fn collect_json_files(dir: &Path) -> IndexResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !dir.is_dir() {
        return Err(IndexError::DirectoryNotFound(dir.to_path_buf()));
    }
    collect_recursive(dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_recursive(dir: &Path, out: &mut Vec<PathBuf>) -> IndexResult<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_recursive(&path, out)?;
        } else if path.extension().and_then(|s| s.to_str()) == Some("json") {
            out.push(path);
        }
    }
    Ok(())
}

/// Remove whitespace outside of double-quoted strings.
///
/// String literals, escaped quotes included, are copied through untouched.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for ch in text.chars() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
        } else if ch == '"' {
            in_string = true;
            out.push(ch);
        } else if !ch.is_whitespace() {
            out.push(ch);
        }
    }

    out
}

/// Normalize and deserialize one document; `Ok(None)` for `null`
pub fn load_config(
    text: &str,
    descriptor: &ConfigTypeDescriptor,
) -> IndexResult<Option<ConfigRecord>> {
    let normalized = normalize_whitespace(text);
    Ok(descriptor.load(&normalized)?)
}

/// Sniff, resolve and load a single file. Never fails; every problem is
/// reported through [`FileOutcome`].
pub async fn load_config_file(path: &Path, catalog: &TypeCatalog) -> FileOutcome {
    let head = match read_head(path).await {
        Ok(head) => head,
        Err(e) => {
            warn!("Failed to read {:?}: {}", path, e);
            return FileOutcome::Failed(e.into());
        }
    };

    let Some(type_name) = sniff_type(&head) else {
        debug!("No type tag in {:?}", path);
        return FileOutcome::Untyped;
    };

    let Some(descriptor) = catalog.get(type_name) else {
        debug!("Unknown config type '{}' in {:?}", type_name, path);
        return FileOutcome::UnknownType(type_name.to_string());
    };

    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to read {:?}: {}", path, e);
            return FileOutcome::Failed(e.into());
        }
    };

    match load_config(strip_bom(&text), descriptor) {
        Ok(Some(record)) => FileOutcome::Loaded {
            type_name: descriptor.name().to_string(),
            record,
        },
        Ok(None) => {
            debug!("Config {:?} is null", path);
            FileOutcome::Empty
        }
        Err(e) => {
            warn!("Failed to load config {:?}: {}", path, e);
            FileOutcome::Failed(IndexError::Load {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
    }
}

/// Text without a leading UTF-8 byte order mark
pub(crate) fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{FEFF}').unwrap_or(text)
}

async fn read_head(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = tokio::fs::File::open(path).await?;
    let mut head = Vec::with_capacity(SNIFF_LEN);
    file.take(SNIFF_LEN as u64).read_to_end(&mut head).await?;
    Ok(head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::types::NodesConfig;
    use tempfile::TempDir;

    fn catalog() -> TypeCatalog {
        let mut catalog = TypeCatalog::new();
        catalog.register_type::<NodesConfig>("ItemsConfig");
        catalog
    }

    #[test]
    fn test_normalize_keeps_quoted_whitespace() {
        let text = "{\n  \"Id\" : \"A  B\\\" C\",\n\t\"Children\": [ ]\n}";
        assert_eq!(
            normalize_whitespace(text),
            "{\"Id\":\"A  B\\\" C\",\"Children\":[]}"
        );
    }

    #[test]
    fn test_normalized_matches_minified() {
        let pretty = "{\n  \"Type\": \"ItemsConfig\",\n  \"Id\": \"Big  Sword\",\n  \"Children\": null\n}";
        let minified = r#"{"Type":"ItemsConfig","Id":"Big  Sword","Children":null}"#;
        let descriptor = ConfigTypeDescriptor::of::<NodesConfig>("ItemsConfig");

        let a = load_config(pretty, &descriptor).unwrap().unwrap();
        let b = load_config(minified, &descriptor).unwrap().unwrap();
        let a = a.as_any().downcast_ref::<NodesConfig>().unwrap();
        let b = b.as_any().downcast_ref::<NodesConfig>().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.id, "Big  Sword");
    }

    #[test]
    fn test_deep_tree_stops_at_parser_limit() {
        let descriptor = ConfigTypeDescriptor::of::<NodesConfig>("ItemsConfig");
        let nested = |levels: usize| {
            let mut node = r#"{"Id":"leaf"}"#.to_string();
            for _ in 0..levels {
                node = format!(r#"{{"Id":"n","Children":[{}]}}"#, node);
            }
            format!(r#"{{"Type":"ItemsConfig","Id":"root","Children":[{}]}}"#, node)
        };

        assert!(load_config(&nested(40), &descriptor).is_ok());
        assert!(load_config(&nested(100), &descriptor).is_err());
    }

    #[test]
    fn test_collect_json_files_recursive() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("nested/deeper")).unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::fs::write(dir.path().join("nested/deeper/b.json"), "{}").unwrap();
        std::fs::write(dir.path().join("nested/notes.txt"), "").unwrap();

        let files = collect_json_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().unwrap() == "json"));
    }

    #[test]
    fn test_collect_missing_dir() {
        let dir = TempDir::new().unwrap();
        let err = collect_json_files(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, IndexError::DirectoryNotFound(_)));
    }

    #[tokio::test]
    async fn test_load_file_outcomes() {
        let dir = TempDir::new().unwrap();
        let catalog = catalog();

        let valid = dir.path().join("valid.json");
        std::fs::write(&valid, r#"{"Type":"ItemsConfig","Id":"A"}"#).unwrap();
        assert!(matches!(
            load_config_file(&valid, &catalog).await,
            FileOutcome::Loaded { ref type_name, .. } if type_name == "ItemsConfig"
        ));

        let untyped = dir.path().join("untyped.json");
        std::fs::write(&untyped, r#"{"Id":"A"}"#).unwrap();
        assert!(matches!(
            load_config_file(&untyped, &catalog).await,
            FileOutcome::Untyped
        ));

        let unknown = dir.path().join("unknown.json");
        std::fs::write(&unknown, r#"{"Type":"Other","Id":"A"}"#).unwrap();
        assert!(matches!(
            load_config_file(&unknown, &catalog).await,
            FileOutcome::UnknownType(ref name) if name == "Other"
        ));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, r#"{"Type":"ItemsConfig","Id":"#).unwrap();
        assert!(matches!(
            load_config_file(&broken, &catalog).await,
            FileOutcome::Failed(IndexError::Load { .. })
        ));

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            load_config_file(&missing, &catalog).await,
            FileOutcome::Failed(IndexError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_load_file_with_byte_order_mark() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bom.json");
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(br#"{"Type":"ItemsConfig","Id":"A","Children":[{"Id":"B"}]}"#);
        std::fs::write(&path, bytes).unwrap();

        match load_config_file(&path, &catalog()).await {
            FileOutcome::Loaded { type_name, record } => {
                assert_eq!(type_name, "ItemsConfig");
                let config = record.as_any().downcast_ref::<NodesConfig>().unwrap();
                assert_eq!(config.id, "A");
            }
            other => panic!("expected a loaded record, got {:?}", other),
        }
    }

    #[test]
    fn test_strip_bom_only_leading() {
        assert_eq!(strip_bom("\u{FEFF}{}"), "{}");
        assert_eq!(strip_bom("{\"Id\":\"\u{FEFF}\"}"), "{\"Id\":\"\u{FEFF}\"}");
    }
}
