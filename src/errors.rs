//! Typed error hierarchy for the review orchestrator.
//!
//! Two top-level enums cover the two fatal failure sources:
//! - `PropertyError`: build property loading and resolution
//! - `ReviewError`: check registry lookups and check execution
//!
//! A check that *runs* and reports a non-zero status is not an error; it is
//! recorded in the build result instead.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the layered build property store.
#[derive(Debug, Error)]
pub enum PropertyError {
    #[error("Required build property '{key}' is not set (looked in: {searched})")]
    Unresolved { key: String, searched: String },

    #[error("Failed to read property file at {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed property override '{0}': expected key=value")]
    MalformedOverride(String),

    #[error("Circular reference while expanding property '{key}'")]
    Cycle { key: String },
}

/// Errors from the check registry and check execution.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Check '{name}' is not registered")]
    UnknownCheck { name: String },

    #[error("Check '{name}' is registered more than once")]
    DuplicateCheck { name: String },

    #[error("Check '{name}' has no command specified")]
    MissingCommand { name: String },

    #[error("Failed to spawn check '{name}': {source}")]
    SpawnFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write report output: {0}")]
    OutputFailed(#[source] std::io::Error),
}
