//! Network MCP Hub catalog - server records and the operations on them
//!
//! This module provides functionality for validating, searching,
//! sorting and submitting entries of the server catalog.
//!
//! # Overview
//!
//! The catalog system allows users to:
//! - Validate records against the schema before they are published
//! - Search and filter records by text, category, language, complexity and tags
//! - Sort results by name, stars, freshness or complexity
//! - Turn a submission form into a record, a JSON file and an issue
//!
//! # Architecture
//!
//! ```text
//! servers.json (checked in / published)
//!     │
//!     ├── store     ← add with validation + duplicate check, validate all
//!     └── remote    ← HTTP fetch, memoized per URL
//!            │
//!            ▼
//!     query::filter → sort::sort → presentation
//!
//!     submission::ServerSubmission → ServerRecord → JSON file / issue URL
//! ```

mod query;
mod record;
mod remote;
mod sort;
mod store;
mod submission;
mod summary;
mod validate;

pub use query::{filter, CatalogQuery};
pub use record::{
    parse_facet, Category, ClosedSet, Complexity, Language, ServerRecord, ALL_SENTINEL,
};
pub use remote::{parse_catalog, RemoteCatalog, SharedRecords};
pub use sort::{sort, SortKey, SortOrder, SortState};
pub use store::{CatalogFile, RecordReport, ValidationReport, DEFAULT_CATALOG_PATH};
pub use submission::{
    file_name, issue_body, issue_title, issue_url, slugify, to_json, ServerSubmission,
    DEFAULT_SUBMISSION_REPOSITORY,
};
pub use summary::CatalogSummary;
pub use validate::{
    is_valid_date, is_valid_id, is_valid_url, validate, validate_record, REQUIRED_FIELDS,
};

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod tests;
