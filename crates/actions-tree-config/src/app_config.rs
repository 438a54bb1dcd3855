//! Application configuration
//!
//! Configuration loaded from `.actions-tree.toml`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration loaded from .actions-tree.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// JSON document describing the action tree
    #[serde(default = "default_actions_file")]
    pub actions_file: PathBuf,

    /// Bind 1..9 to the first nine items of the top-level popup
    #[serde(default)]
    pub numbered_top_level: bool,

    /// Host action whose shortcuts close a popup
    #[serde(default = "default_escape_action")]
    pub escape_action: String,

    /// Key that re-reads the actions document
    #[serde(default = "default_reload_key")]
    pub reload_key: String,
}

fn default_actions_file() -> PathBuf {
    crate::paths::actions_file_path().unwrap_or_else(|e| {
        log::warn!("{:#}, looking for actions.json in the working directory", e);
        PathBuf::from("actions.json")
    })
}

fn default_escape_action() -> String {
    "EditorEscape".to_string()
}

fn default_reload_key() -> String {
    "ctrl+r".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            actions_file: default_actions_file(),
            numbered_top_level: false,
            escape_action: default_escape_action(),
            reload_key: default_reload_key(),
        }
    }
}

impl AppConfig {
    /// Load config from CWD first, then home directory, or use defaults
    pub fn load() -> Self {
        if let Some(content) = crate::load_config_file() {
            match Self::parse(&content) {
                Ok(config) => {
                    log::info!("Loaded app config from file");
                    return config;
                }
                Err(e) => {
                    log::warn!("{:#}", e);
                }
            }
        }

        log::debug!("Using default app config");
        Self::default()
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.actions_file.ends_with("actions.json"));
        assert!(!config.numbered_top_level);
        assert_eq!(config.escape_action, "EditorEscape");
        assert_eq!(config.reload_key, "ctrl+r");
    }

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            actions_file = "/tmp/my-actions.json"
            numbered_top_level = true
            escape_action = "Quit"
        "#;
        let config = AppConfig::parse(toml).unwrap();
        assert_eq!(config.actions_file, PathBuf::from("/tmp/my-actions.json"));
        assert!(config.numbered_top_level);
        assert_eq!(config.escape_action, "Quit");
        assert_eq!(config.reload_key, "ctrl+r");
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config = AppConfig::parse("numbered_top_level = true").unwrap();
        assert!(config.numbered_top_level);
        assert_eq!(config.escape_action, "EditorEscape");
        assert!(config.actions_file.ends_with("actions.json"));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let err = AppConfig::parse("numbered_top_level = \"yes\"").unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }
}
