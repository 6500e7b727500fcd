//! Structured errors with codes, context and recovery suggestions
//!
//! Every library crate in the workspace reports failures through [`Error`]:
//! - An [`ErrorCode`] for programmatic handling and CLI exit codes
//! - Optional context describing what was being attempted
//! - Optional recovery suggestion shown to the developer
//! - A serialisable [`ErrorReport`] for `--json` output

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // General errors (1xxx)
    Internal = 1001,

    // IO errors (2xxx)
    IoError = 2000,
    FileNotFound = 2001,
    PermissionDenied = 2002,
    FileExists = 2005,

    // Configuration errors (3xxx)
    ConfigNotFound = 3001,
    ConfigParseError = 3002,

    // Process errors (5xxx)
    ProcessError = 5000,
    CommandNotFound = 5001,

    // Validation errors (6xxx)
    ValidationError = 6000,

    // Build errors (8xxx)
    GradleError = 8002,

    // Signing errors (9xxx)
    SigningIncomplete = 9001,
    KeystoreNotFound = 9002,
    KeystoreInvalid = 9003,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            1 => "General",
            2 => "IO",
            3 => "Configuration",
            5 => "Process",
            6 => "Validation",
            8 => "Build",
            9 => "Signing",
            _ => "Unknown",
        }
    }

    /// CLI exit code for errors of this kind
    pub fn exit_code(&self) -> i32 {
        match self.code() / 1000 {
            3 => exit_codes::CONFIG_ERROR,
            6 => exit_codes::VALIDATION_ERROR,
            9 => exit_codes::SIGNING_ERROR,
            _ if *self == ErrorCode::CommandNotFound => exit_codes::COMMAND_NOT_FOUND,
            _ => exit_codes::FAILURE,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {}", ctx)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// CLI exit code for this error
    pub fn exit_code(&self) -> i32 {
        self.code.exit_code()
    }

    /// Convert to a serializable report
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code,
            code_str: self.code.to_string(),
            category: self.code.category().to_string(),
            message: self.message.clone(),
            context: self.context.clone(),
            suggestion: self.suggestion.clone(),
            source: self.source.as_ref().map(|e| e.to_string()),
        }
    }

    // Convenience constructors

    pub fn file_exists(path: impl AsRef<Path>) -> Self {
        Self::new(
            ErrorCode::FileExists,
            format!("File already exists: {}", path.as_ref().display()),
        )
        .with_suggestion("Pass --force to overwrite it")
    }

    pub fn config_not_found(path: impl AsRef<Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create a .linkis-android.toml file or drop --config to use defaults")
    }

    pub fn config_parse(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ConfigParseError,
            format!("Failed to parse {}: {}", path.as_ref().display(), message.into()),
        )
    }

    pub fn process(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProcessError, message)
    }

    pub fn command_not_found(cmd: &str) -> Self {
        Self::new(
            ErrorCode::CommandNotFound,
            format!("Command not found: {}", cmd),
        )
        .with_suggestion(format!("Install {} and ensure it's in your PATH", cmd))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn gradle(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::GradleError, message)
    }

    pub fn keystore_not_found(path: impl AsRef<Path>) -> Self {
        Self::new(
            ErrorCode::KeystoreNotFound,
            format!("Keystore not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Check storeFile in key.properties; relative paths resolve against the app module")
    }

    pub fn keystore_invalid(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::KeystoreInvalid,
            format!("Invalid keystore {}: {}", path.as_ref().display(), reason.into()),
        )
    }
}

/// Serializable error report for logging and `--json` output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub code_str: String,
    pub category: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes for CLI commands
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const VALIDATION_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const SIGNING_ERROR: i32 = 6;
    pub const COMMAND_NOT_FOUND: i32 = 127;
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            std::io::ErrorKind::AlreadyExists => ErrorCode::FileExists,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorCode::Internal, format!("JSON error: {}", err)).with_source(err)
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::FileNotFound.to_string(), "E2001");
        assert_eq!(ErrorCode::SigningIncomplete.to_string(), "E9001");
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::IoError.category(), "IO");
        assert_eq!(ErrorCode::ConfigParseError.category(), "Configuration");
        assert_eq!(ErrorCode::KeystoreInvalid.category(), "Signing");
    }

    #[test]
    fn test_error_code_exit_code() {
        assert_eq!(ErrorCode::ConfigParseError.exit_code(), exit_codes::CONFIG_ERROR);
        assert_eq!(ErrorCode::SigningIncomplete.exit_code(), exit_codes::SIGNING_ERROR);
        assert_eq!(ErrorCode::CommandNotFound.exit_code(), exit_codes::COMMAND_NOT_FOUND);
        assert_eq!(ErrorCode::GradleError.exit_code(), exit_codes::FAILURE);
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::keystore_not_found("/path/to/release.jks")
            .with_context("While preparing release signing");

        assert_eq!(err.code, ErrorCode::KeystoreNotFound);
        assert!(err.context.is_some());
        assert!(err.suggestion.is_some());
        assert!(err.to_string().contains("release.jks"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: Error = io.into();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        assert!(err.source.is_some());
    }

    #[test]
    fn test_result_ext_context() {
        let result: Result<()> = Err(Error::gradle("boom"));
        let err = result.context("During build").unwrap_err();
        assert_eq!(err.context.as_deref(), Some("During build"));

        let io: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = io.context("Reading key.properties").unwrap_err();
        assert_eq!(err.code, ErrorCode::FileNotFound);
        assert_eq!(err.context.as_deref(), Some("Reading key.properties"));
    }

    #[test]
    fn test_error_report_serialization() {
        let err = Error::new(ErrorCode::SigningIncomplete, "Missing keyAlias")
            .with_context("Release build");

        let report = err.to_report();
        let json = serde_json::to_string(&report).unwrap();

        assert!(json.contains("E9001"));
        assert!(json.contains("Signing"));
        assert!(!json.contains("\"source\""));
    }
}
