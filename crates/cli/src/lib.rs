//! CLI utilities for Linkis development tools
//!
//! Provides shared CLI functionality:
//! - Status messages and error rendering
//! - Secret masking for display
//! - Spinners for long-running external tools

#![warn(missing_docs)]

pub mod output;
pub mod progress;
