//! Configuration schema definitions
//!
//! Everything is optional in the TOML file; missing sections and fields fall
//! back to the layout of a stock Flutter Android project.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigSchema {
    #[serde(default)]
    pub signing: SigningSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

/// Where the signing properties live and how `storeFile` is resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningSection {
    /// Android project root (the directory holding `settings.gradle`)
    #[serde(default = "default_project_root")]
    pub project_root: String,

    /// Properties file name, relative to `project_root`
    #[serde(default = "default_properties_file")]
    pub properties_file: String,

    /// Application module directory, relative to `project_root`.
    /// A relative `storeFile` resolves against this directory.
    #[serde(default = "default_module_dir")]
    pub module_dir: String,

    /// Inspect the keystore file as part of release checks
    #[serde(default = "default_true")]
    pub require_keystore: bool,
}

impl Default for SigningSection {
    fn default() -> Self {
        Self {
            project_root: default_project_root(),
            properties_file: default_properties_file(),
            module_dir: default_module_dir(),
            require_keystore: default_true(),
        }
    }
}

impl SigningSection {
    /// Project root with `~` and environment variables expanded
    pub fn expanded_project_root(&self) -> PathBuf {
        let expanded = shellexpand::full(&self.project_root)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| self.project_root.clone());
        PathBuf::from(expanded)
    }
}

fn default_project_root() -> String {
    ".".to_string()
}

fn default_properties_file() -> String {
    "key.properties".to_string()
}

fn default_module_dir() -> String {
    "app".to_string()
}

fn default_true() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Default `tracing` filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
