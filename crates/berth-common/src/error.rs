//! Unified error type for the berth workspace.
//!
//! Every library crate returns [`BerthError`]; the CLI wraps it in
//! `anyhow` at the command layer.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum BerthError {
    /// A required field was missing or empty. Raised before any side effect.
    #[error("{message}")]
    Validation {
        /// Human-readable description, e.g. `Name required`.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// A resource with the same key already exists.
    #[error("{kind} already exists: {id}")]
    Conflict {
        /// Type of the conflicting resource.
        kind: &'static str,
        /// Identifier that is already taken.
        id: String,
    },

    /// An invocation of the container runtime failed.
    #[error("{message}")]
    Runtime {
        /// Summary of the failed operation.
        message: String,
        /// Captured diagnostic text (stderr, then stdout) of the invocation.
        diagnostics: String,
    },

    /// A dispatcher command failed.
    #[error("{command}: {message}")]
    Dispatch {
        /// Command name that was dispatched.
        command: String,
        /// Failure reported by the handler.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path (or program) where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl BerthError {
    /// Builds a [`BerthError::Validation`] from any message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Builds a [`BerthError::NotFound`] for a container name.
    pub fn container_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "container",
            id: name.into(),
        }
    }

    /// Builds a [`BerthError::Dispatch`] for the given command.
    pub fn dispatch(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Dispatch {
            command: command.into(),
            message: message.into(),
        }
    }

    /// HTTP status a façade should answer with for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Validation { .. } | Self::Conflict { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Runtime { .. }
            | Self::Dispatch { .. }
            | Self::Io { .. }
            | Self::Config { .. }
            | Self::Serialization { .. } => 500,
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, BerthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_displays_bare_message() {
        assert_eq!(BerthError::validation("Name required").to_string(), "Name required");
    }

    #[test]
    fn not_found_names_the_container() {
        let err = BerthError::container_not_found("test");
        assert_eq!(err.to_string(), "container not found: test");
        assert_eq!(err.http_status(), 404);
    }

    #[test]
    fn status_mapping_covers_runtime_and_dispatch() {
        let runtime = BerthError::Runtime {
            message: "failed to start web".into(),
            diagnostics: "boom".into(),
        };
        assert_eq!(runtime.http_status(), 500);
        assert_eq!(BerthError::dispatch("px.update", "down").http_status(), 500);
        assert_eq!(BerthError::validation("x").http_status(), 400);
    }
}
