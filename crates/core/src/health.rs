//! Health checks for tool dependencies and environment
//!
//! A [`HealthChecker`] runs a list of [`HealthCheck`]s and folds their
//! results into a [`HealthReport`]. Platform crates add their own checks
//! (for example signing readiness) by implementing the trait.

use crate::process::{command_exists, run_command};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Health check status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All checks passed
    Healthy,
    /// Some optional checks failed
    Degraded,
    /// Required checks failed
    Unhealthy,
}

impl HealthStatus {
    /// Returns true if status is healthy
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    /// Returns true if status is healthy or degraded (still operational)
    #[must_use]
    pub fn is_operational(&self) -> bool {
        matches!(self, HealthStatus::Healthy | HealthStatus::Degraded)
    }
}

/// Individual health check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Name of the check
    pub name: String,
    /// Status of the check
    pub status: HealthStatus,
    /// Optional message with details
    pub message: Option<String>,
    /// Duration of the check in milliseconds
    pub duration_ms: u64,
    /// Additional details as key-value pairs
    pub details: BTreeMap<String, String>,
}

impl CheckResult {
    fn with_status(name: impl Into<String>, status: HealthStatus, message: Option<String>) -> Self {
        Self {
            name: name.into(),
            status,
            message,
            duration_ms: 0,
            details: BTreeMap::new(),
        }
    }

    /// Create a healthy check result
    pub fn healthy(name: impl Into<String>) -> Self {
        Self::with_status(name, HealthStatus::Healthy, None)
    }

    /// Create an unhealthy check result with a message
    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(name, HealthStatus::Unhealthy, Some(message.into()))
    }

    /// Create a degraded check result with a message
    pub fn degraded(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(name, HealthStatus::Degraded, Some(message.into()))
    }

    /// Add a detail key-value pair
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Overall health report containing all check results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// Overall status based on all checks
    pub status: HealthStatus,
    /// Individual check results
    pub checks: Vec<CheckResult>,
    /// Total duration of all checks in milliseconds
    pub total_duration_ms: u64,
    /// Timestamp when the report was generated
    pub timestamp: String,
    /// Version of the tool
    pub version: String,
}

impl HealthReport {
    /// Create a new health report from check results
    #[must_use]
    pub fn new(checks: Vec<CheckResult>, duration: Duration) -> Self {
        let status = if checks.iter().all(|c| c.status == HealthStatus::Healthy) {
            HealthStatus::Healthy
        } else if checks.iter().any(|c| c.status == HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Degraded
        };

        Self {
            status,
            checks,
            total_duration_ms: duration.as_millis() as u64,
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Returns true if overall status is healthy
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }

    /// Get all checks that failed (not healthy)
    #[must_use]
    pub fn failed_checks(&self) -> Vec<&CheckResult> {
        self.checks
            .iter()
            .filter(|c| !c.status.is_healthy())
            .collect()
    }
}

/// Health checker with configurable checks
#[derive(Default)]
pub struct HealthChecker {
    checks: Vec<Box<dyn HealthCheck>>,
}

impl HealthChecker {
    /// Create a new health checker with no checks
    #[must_use]
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Add a health check
    #[must_use]
    pub fn add_check(mut self, check: impl HealthCheck + 'static) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Add the JDK and Android SDK checks needed for signed builds
    #[must_use]
    pub fn with_android_checks(self) -> Self {
        self.add_check(CommandCheck::new("java", Some("-version")))
            .add_check(CommandCheck::optional("keytool", Some("-help")))
            .add_check(EnvVarCheck::optional("ANDROID_HOME"))
    }

    /// Run all health checks
    #[must_use]
    pub fn run(&self) -> HealthReport {
        let start = Instant::now();
        let mut results = Vec::with_capacity(self.checks.len());

        for check in &self.checks {
            let check_start = Instant::now();
            let mut result = check.check();
            result.duration_ms = check_start.elapsed().as_millis() as u64;
            tracing::debug!(check = %result.name, status = ?result.status, "Health check finished");
            results.push(result);
        }

        HealthReport::new(results, start.elapsed())
    }
}

/// Trait for implementing health checks
pub trait HealthCheck: Send + Sync {
    /// Perform the health check and return a result
    fn check(&self) -> CheckResult;
}

/// Check if a command is available
pub struct CommandCheck {
    command: String,
    version_arg: Option<String>,
    required: bool,
}

impl CommandCheck {
    /// Create a required command check
    pub fn new(command: impl Into<String>, version_arg: Option<&str>) -> Self {
        Self {
            command: command.into(),
            version_arg: version_arg.map(String::from),
            required: true,
        }
    }

    /// Create an optional command check (degraded if missing, not unhealthy)
    pub fn optional(command: impl Into<String>, version_arg: Option<&str>) -> Self {
        Self {
            required: false,
            ..Self::new(command, version_arg)
        }
    }
}

impl HealthCheck for CommandCheck {
    fn check(&self) -> CheckResult {
        if !command_exists(&self.command) {
            return if self.required {
                CheckResult::unhealthy(&self.command, format!("{} is not installed", self.command))
            } else {
                CheckResult::degraded(
                    &self.command,
                    format!("{} is not installed (optional)", self.command),
                )
            };
        }

        let Some(ref arg) = self.version_arg else {
            return CheckResult::healthy(&self.command);
        };

        // `java -version` reports on stderr
        match run_command(&self.command, &[arg.as_str()]) {
            Ok(output) => {
                let combined = output.combined_output();
                let version = combined.lines().next().unwrap_or("").trim().to_string();
                if version.is_empty() {
                    CheckResult::healthy(&self.command)
                } else {
                    CheckResult::healthy(&self.command).with_detail("version", version)
                }
            }
            Err(_) => CheckResult::healthy(&self.command),
        }
    }
}

/// Check if an environment variable is set
pub struct EnvVarCheck {
    var_name: String,
    required: bool,
}

impl EnvVarCheck {
    /// Create a required environment variable check
    pub fn new(var_name: impl Into<String>) -> Self {
        Self {
            var_name: var_name.into(),
            required: true,
        }
    }

    /// Create an optional environment variable check
    pub fn optional(var_name: impl Into<String>) -> Self {
        Self {
            var_name: var_name.into(),
            required: false,
        }
    }
}

impl HealthCheck for EnvVarCheck {
    fn check(&self) -> CheckResult {
        match std::env::var(&self.var_name) {
            Ok(value) => {
                let shown = if value.chars().count() > 50 {
                    format!("{}...", value.chars().take(50).collect::<String>())
                } else {
                    value
                };
                CheckResult::healthy(&self.var_name).with_detail("value", shown)
            }
            Err(_) if self.required => {
                CheckResult::unhealthy(&self.var_name, format!("{} is not set", self.var_name))
            }
            Err(_) => CheckResult::degraded(
                &self.var_name,
                format!("{} is not set (optional)", self.var_name),
            ),
        }
    }
}
