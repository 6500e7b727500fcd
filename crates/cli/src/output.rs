//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output.

use linkis_core::Error;
use owo_colors::{OwoColorize, Stream};

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".if_supports_color(Stream::Stdout, |t| t.green()), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".if_supports_color(Stream::Stderr, |t| t.red()), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".if_supports_color(Stream::Stderr, |t| t.yellow()), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".if_supports_color(Stream::Stdout, |t| t.blue()), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.if_supports_color(Stream::Stdout, |t| t.bold()));
        println!("{}", "─".repeat(message.chars().count()));
    }

    /// Print an aligned `label: value` line
    pub fn field(label: &str, value: &str) {
        let label = format!("{:<16}", format!("{}:", label));
        println!("  {} {}", label.if_supports_color(Stream::Stdout, |t| t.dimmed()), value);
    }

    /// Print a library error with its code, context and suggestion
    pub fn report(error: &Error) {
        let code = error.code.to_string();
        eprintln!(
            "{} {} {}",
            "✗".if_supports_color(Stream::Stderr, |t| t.red()),
            code.if_supports_color(Stream::Stderr, |t| t.dimmed()),
            error.message
        );
        if let Some(context) = &error.context {
            eprintln!("  {} {}", "context:".if_supports_color(Stream::Stderr, |t| t.dimmed()), context);
        }
        if let Some(suggestion) = &error.suggestion {
            eprintln!("  {} {}", "hint:".if_supports_color(Stream::Stderr, |t| t.cyan()), suggestion);
        }
    }
}

/// Mask a secret for display, keeping only its length visible
pub fn mask_secret(secret: &str) -> String {
    match secret.chars().count() {
        0 => "(empty)".to_string(),
        n => format!("{} ({} chars)", "*".repeat(n.min(8)), n),
    }
}

/// Render an optional value, marking absence explicitly
pub fn display_optional(value: Option<&str>) -> String {
    value.map_or_else(|| "(not set)".to_string(), str::to_string)
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{}m {:.0}s", mins, remaining_secs)
    }
}

/// Format a file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_mask_secret_hides_content() {
        let masked = mask_secret("hunter2");
        assert!(!masked.contains("hunter2"));
        assert_eq!(masked, "******* (7 chars)");
    }

    #[test]
    fn test_mask_secret_caps_stars() {
        assert_eq!(mask_secret("a-very-long-password"), "******** (20 chars)");
    }

    #[test]
    fn test_mask_secret_empty() {
        assert_eq!(mask_secret(""), "(empty)");
    }

    #[test]
    fn test_display_optional() {
        assert_eq!(display_optional(Some("upload")), "upload");
        assert_eq!(display_optional(Some("")), "");
        assert_eq!(display_optional(None), "(not set)");
    }

    #[test]
    fn test_format_duration_ms() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    }

    #[test]
    fn test_format_duration_mins() {
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
    }
}
