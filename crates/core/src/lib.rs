//! Core utilities for Linkis development tools
//!
//! This crate provides shared functionality used by the platform tools:
//!
//! - **Error handling**: Errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based tool configuration with defaults
//! - **Process execution**: Running external tools such as the Gradle wrapper
//! - **Health checks**: Verify tool dependencies and environment
//!
//! # Example
//!
//! ```rust,no_run
//! use linkis_core::{config::Config, health::HealthChecker};
//!
//! let config = Config::load(None).expect("invalid configuration");
//! println!("key.properties lives in {}", config.schema.signing.project_root);
//!
//! let report = HealthChecker::new().with_android_checks().run();
//! if !report.is_healthy() {
//!     eprintln!("Environment issues detected!");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod health;
pub mod process;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::health::{CheckResult, HealthCheck, HealthChecker, HealthReport, HealthStatus};
}
