//! Error types for extreg
//!
//! This module defines all error types used throughout the extension
//! registry. Uses `thiserror` for ergonomic error handling with automatic
//! `Display` and `Error` trait implementations.

use thiserror::Error;

/// The primary error type for registry operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// An extension does not expose every operation a required interface
    /// demands. Raised at registration time; the category is left unchanged.
    #[error("extension '{extension}' does not implement required interface '{interface}'")]
    Validation {
        /// Identifier of the rejected extension.
        extension: String,
        /// Name of the interface it failed.
        interface: String,
    },

    /// A default extension was requested before one was selected, or the
    /// selected default was removed by a later interface upgrade.
    #[error("no default extension selected for category '{category}'")]
    NoDefault { category: String },

    /// An extension constructor failed. The underlying error is surfaced
    /// verbatim; the registry never retries or falls back on its own.
    #[error("extension construction failed: {0}")]
    Construction(anyhow::Error),

    /// An operation name outside the extension's supported surface.
    #[error("unsupported operation '{0}'")]
    UnsupportedOp(String),

    /// Configuration-related errors (invalid category or interface names,
    /// malformed wiring specs, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized `Result` type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
