//! Catalog error types with clear, actionable messages

use std::path::PathBuf;
use thiserror::Error;

/// Catalog specific errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// One or more schema checks failed for a record
    #[error("Record failed validation with {} error(s):\n  - {}", errors.len(), errors.join("\n  - "))]
    SchemaViolation { errors: Vec<String> },

    /// A record with the same id is already in the catalog
    #[error("Server with ID '{id}' already exists")]
    DuplicateIdentifier { id: String },

    /// A submission is missing fields it needs before a record can be built
    #[error("Submission is incomplete. Missing required field(s): {}", missing.join(", "))]
    Incomplete { missing: Vec<&'static str> },

    /// Failed to read the catalog file
    #[error("Failed to read catalog from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog content is not a JSON array of records
    #[error("Failed to parse catalog {path} (expected a JSON array of records)")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to write the catalog file
    #[error("Failed to write catalog to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The remote catalog answered with a non-success status
    #[error("Failed to fetch catalog: HTTP {status} from {url}")]
    Fetch { url: String, status: u16 },
}

impl CatalogError {
    /// Validation messages carried by a schema violation, empty for every other variant
    pub fn messages(&self) -> &[String] {
        match self {
            CatalogError::SchemaViolation { errors } => errors,
            _ => &[],
        }
    }
}
