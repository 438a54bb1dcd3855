//! Configuration and cache directory paths
//!
//! Uses XDG directories via `dirs` crate.
//!
//! Platform-specific locations:
//! - Linux: `~/.config/actions-tree/`, `~/.cache/actions-tree/`
//! - macOS: `~/Library/Application Support/actions-tree/`, `~/Library/Caches/actions-tree/`
//! - Windows: `%APPDATA%\actions-tree\`, `%LOCALAPPDATA%\actions-tree\`

use anyhow::{Context, Result};
use std::path::PathBuf;

pub const APP_NAME: &str = "actions-tree";
const ACTIONS_FILE: &str = "actions.json";

/// Get the application config directory, creating it if needed
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    Ok(dir)
}

/// Get the application cache directory, creating it if needed
pub fn cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("Could not determine cache directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    Ok(dir)
}

/// Default location of the actions document
pub fn actions_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(ACTIONS_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_exists() {
        let dir = config_dir().unwrap();
        assert!(dir.exists());
        assert!(dir.ends_with(APP_NAME));
    }

    #[test]
    fn test_cache_dir_exists() {
        let dir = cache_dir().unwrap();
        assert!(dir.exists());
        assert!(dir.ends_with(APP_NAME));
    }

    #[test]
    fn test_actions_file_path() {
        let path = actions_file_path().unwrap();
        assert!(path.ends_with(ACTIONS_FILE));
        assert!(path.parent().unwrap().ends_with(APP_NAME));
    }
}
