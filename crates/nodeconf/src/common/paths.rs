//! Path Utilities
//!
//! Default locations for nodeconf files.

use std::path::PathBuf;

/// Environment variable overriding the settings file location
pub const SETTINGS_ENV: &str = "NODECONF_SETTINGS";

/// Get the nodeconf base directory (`~/.nodeconf/`)
pub fn nodeconf_dir() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not determine home directory")?;
    Ok(home.join(".nodeconf"))
}

/// Get the settings file path
///
/// Honors `NODECONF_SETTINGS` when set, otherwise `~/.nodeconf/settings.json`.
pub fn default_settings_path() -> Result<PathBuf, String> {
    if let Some(explicit) = std::env::var_os(SETTINGS_ENV) {
        if !explicit.is_empty() {
            return Ok(PathBuf::from(explicit));
        }
    }
    Ok(nodeconf_dir()?.join("settings.json"))
}
