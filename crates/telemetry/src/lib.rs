//! Structured logging for Linkis tools
//!
//! Installs a `tracing` subscriber that writes compact (or JSON) lines to
//! stderr so stdout stays clean for command output and `--json` reports.
//! `RUST_LOG` always wins over the configured level.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Global session ID for correlating logs
static SESSION_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// Initialize with custom configuration
pub fn init_with_config(config: TelemetryConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| anyhow::anyhow!("Invalid log filter {:?}: {}", config.log_level, e))?;

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.show_target)
        .with_file(config.show_file)
        .with_line_number(config.show_line_number);

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        tracing::subscriber::set_global_default(registry.with(layer.json()))
    } else {
        tracing::subscriber::set_global_default(registry.with(layer.compact()))
    };
    result.map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::debug!(
        session_id = %session_id(),
        version = env!("CARGO_PKG_VERSION"),
        "Logging initialized"
    );

    Ok(())
}

/// Get the current session ID
pub fn session_id() -> &'static str {
    &SESSION_ID
}

/// Map CLI verbosity flags onto a filter level, falling back to `configured`
pub fn level_for_verbosity(verbose: u8, quiet: bool, configured: &str) -> String {
    if quiet {
        return "error".to_string();
    }
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub show_target: bool,
    pub show_file: bool,
    pub show_line_number: bool,
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            show_target: false,
            show_file: false,
            show_line_number: false,
            json: false,
        }
    }
}

impl TelemetryConfig {
    /// Use the given filter level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id() {
        let id = session_id();
        assert!(!id.is_empty());
        assert!(Uuid::parse_str(id).is_ok());
        assert_eq!(id, session_id());
    }

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for_verbosity(0, false, "warn"), "warn");
        assert_eq!(level_for_verbosity(1, false, "warn"), "debug");
        assert_eq!(level_for_verbosity(3, false, "warn"), "trace");
        assert_eq!(level_for_verbosity(2, true, "warn"), "error");
    }

    #[test]
    fn test_config_with_level() {
        let config = TelemetryConfig::default().with_level("info");
        assert_eq!(config.log_level, "info");
        assert!(!config.json);
    }
}
