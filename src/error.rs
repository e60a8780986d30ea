//! Error types for the distribution policy engine

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for policy operations
pub type Result<T> = std::result::Result<T, PolicyError>;

/// Recoverable errors reported by registry and policy operations.
///
/// None of these terminate a session. Routine negative decisions such as a
/// grant rejected by the parent are outcomes, not errors (see
/// [`GrantOutcome`](crate::engine::GrantOutcome)).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// Named distributor is not registered
    #[error("distributor '{name}' not found")]
    NotFound { name: String },

    /// A distributor with this name is already registered
    #[error("distributor '{name}' already exists")]
    AlreadyExists { name: String },

    /// Distributor name is empty after trimming
    #[error("invalid distributor name '{name}'")]
    InvalidName { name: String },

    /// Location text is malformed or names a place missing from the catalog
    #[error("location '{input}' is not valid: {reason}")]
    InvalidLocation { input: String, reason: String },

    /// Child still holds include or exclude entries
    #[error("distributor '{name}' has existing permissions; wipe them before linking")]
    NonEmptyPermissions { name: String },

    /// Distributor is still referenced as a parent
    #[error("distributor '{name}' is a parent of '{child}'; remove or unlink its children first")]
    HasChildren { name: String, child: String },

    /// Linking would close a loop in the hierarchy
    #[error("linking '{child}' under '{parent}' would create a cycle: {}", .chain.join(" < "))]
    CycleDetected {
        child: String,
        parent: String,
        chain: Vec<String>,
    },
}

impl PolicyError {
    pub(crate) fn not_found(name: &str) -> Self {
        PolicyError::NotFound {
            name: name.to_string(),
        }
    }

    pub(crate) fn invalid_location(input: &str, reason: impl Into<String>) -> Self {
        PolicyError::InvalidLocation {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while loading the reference location catalog.
///
/// Catalog load failure is the one fatal condition at startup.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to open catalog {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog data: {0}")]
    Csv(#[from] csv::Error),

    #[error("catalog row {row} has no column {column}")]
    MissingColumn { row: usize, column: usize },

    #[error("catalog row {row} has an empty value in column {column}")]
    EmptyField { row: usize, column: usize },
}
