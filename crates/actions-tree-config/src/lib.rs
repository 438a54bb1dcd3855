//! Configuration and file locations for actions-tree
//!
//! This crate provides:
//! - Config and cache directories
//! - Configuration file lookup (TOML)
//! - Application configuration (AppConfig)

pub mod app_config;
pub mod config_file;
pub mod paths;

pub use app_config::AppConfig;
pub use config_file::load_config_file;
