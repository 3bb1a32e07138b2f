// Copyright (c) 2025-2026 the ctxpack contributors
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Invalid priority pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    #[error("Root directory does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Validation error: {message}\nSuggestion: {suggestion}")]
    ValidationError { message: String, suggestion: String },

    #[error("Clipboard error: {0}")]
    Clipboard(String),
}

impl PackError {
    pub fn invalid_max_tokens(value: usize) -> Self {
        PackError::ValidationError {
            message: format!("Invalid token budget: {}", value),
            suggestion: "The token budget must be greater than zero; omit --max-tokens to disable trimming"
                .to_string(),
        }
    }

    pub fn invalid_coefficient(name: &str, value: f64) -> Self {
        PackError::ValidationError {
            message: format!("Invalid token coefficient {}: {}", name, value),
            suggestion: "Token coefficients must be finite and greater than zero".to_string(),
        }
    }

    pub fn root_not_directory(path: &std::path::Path) -> Self {
        PackError::ValidationError {
            message: format!("Root is not a directory: {}", path.display()),
            suggestion: "Pass a project directory with --root".to_string(),
        }
    }

    /// Whether this error is a permission failure on the file system.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, PackError::FileSystem(e) if e.kind() == std::io::ErrorKind::PermissionDenied)
    }
}

/// Render an error for the terminal.
///
/// Validation errors put the suggestion on its own line; verbose mode adds
/// the full `source()` chain.
pub fn format_error(error: &PackError, verbose: bool) -> String {
    let mut out = String::new();

    match error {
        PackError::ValidationError {
            message,
            suggestion,
        } => {
            out.push_str(&format!("\n\u{26a0} Error: {}\n", message));
            out.push_str(&format!("\nSuggestion: {}", suggestion));
        }
        other => {
            out.push_str(&format!("\n\u{26a0} Error: {}", other));
        }
    }

    if verbose {
        let mut source = std::error::Error::source(error);
        if source.is_some() {
            out.push_str("\n\nCaused by:");
        }
        while let Some(cause) = source {
            out.push_str(&format!("\n\u{2514}\u{2500} {}", cause));
            source = cause.source();
        }
    }

    out
}
