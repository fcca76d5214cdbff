//! Common Error Types
//!
//! Unified error handling for discovery, loading and indexing.

use std::path::PathBuf;

/// Errors surfaced by the config index
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No settings are available, or they list no config roots
    #[error("Settings not found: {0}")]
    SettingsMissing(String),

    #[error("Config path is empty. Check the ConfigsPaths entry in {0:?}")]
    EmptyConfigPath(PathBuf),

    #[error("Config directory not found: {0:?}")]
    DirectoryNotFound(PathBuf),

    /// A node tree nests deeper than the walk allows, most likely a cycle
    #[error("Node tree '{root}' exceeds maximum depth {limit}")]
    NodeDepthExceeded { root: String, limit: usize },

    #[error("Failed to load {path:?}: {message}")]
    Load { path: PathBuf, message: String },
}

impl IndexError {
    /// True for errors raised before any file is read
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            IndexError::SettingsMissing(_)
                | IndexError::EmptyConfigPath(_)
                | IndexError::DirectoryNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors() {
        assert!(IndexError::SettingsMissing("none".into()).is_configuration());
        assert!(IndexError::DirectoryNotFound(PathBuf::from("/missing")).is_configuration());
        assert!(!IndexError::NodeDepthExceeded {
            root: "A".into(),
            limit: 4
        }
        .is_configuration());
    }

    #[test]
    fn test_depth_message() {
        let err = IndexError::NodeDepthExceeded {
            root: "Root".into(),
            limit: 256,
        };
        assert_eq!(err.to_string(), "Node tree 'Root' exceeds maximum depth 256");
    }
}
