//! The persisted catalog document (`servers.json`)
//!
//! A pretty-printed JSON array of records with a trailing newline, kept
//! sorted by category then name. Records are held untyped so that a file
//! containing invalid entries can still be loaded and reported on.

use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::record::ServerRecord;
use super::validate::validate;
use crate::error::CatalogError;

/// Default location of the catalog inside the site sources
pub const DEFAULT_CATALOG_PATH: &str = "public/data/servers.json";

/// Validation problems of one record in the file
#[derive(Debug, Clone, PartialEq)]
pub struct RecordReport {
    /// Position in the file
    pub index: usize,
    /// Record name, or "Unknown" when it has none
    pub name: String,
    pub errors: Vec<String>,
}

/// Outcome of validating every record in the file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub total: usize,
    pub invalid: Vec<RecordReport>,
    /// Ids that appear more than once, with every index they appear at
    pub duplicate_ids: Vec<(String, Vec<usize>)>,
}

impl ValidationReport {
    pub fn error_count(&self) -> usize {
        self.invalid.iter().map(|r| r.errors.len()).sum::<usize>() + self.duplicate_ids.len()
    }

    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }
}

/// A catalog file loaded into memory
#[derive(Debug, Clone)]
pub struct CatalogFile {
    path: PathBuf,
    entries: Vec<Value>,
}

impl CatalogFile {
    /// Load the catalog at `path`
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let path = path.into();

        let content = std::fs::read_to_string(&path).map_err(|source| CatalogError::Read {
            path: path.clone(),
            source,
        })?;

        let entries: Vec<Value> =
            serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), records = entries.len(), "Loaded catalog");
        Ok(Self { path, entries })
    }

    /// Load the catalog at `path`, or start an empty one if the file does not exist
    pub fn load_or_empty(path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self {
                path,
                entries: Vec::new(),
            });
        }
        Self::load(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw entries in file order
    pub fn entries(&self) -> &[Value] {
        &self.entries
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.get("id").and_then(Value::as_str) == Some(id))
    }

    /// Typed records, failing on the first entry that does not deserialize
    pub fn records(&self) -> Result<Vec<ServerRecord>, CatalogError> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                serde_json::from_value(entry.clone()).map_err(|e| CatalogError::SchemaViolation {
                    errors: vec![format!("Record at index {index}: {e}")],
                })
            })
            .collect()
    }

    /// Validate `candidate` and append it, keeping the file order convention
    ///
    /// Nothing is changed when the candidate fails validation or its id is
    /// already taken. Call [`CatalogFile::save`] to persist.
    pub fn add(&mut self, candidate: Value) -> Result<ServerRecord, CatalogError> {
        let errors = validate(&candidate);
        if !errors.is_empty() {
            return Err(CatalogError::SchemaViolation { errors });
        }

        let record: ServerRecord = serde_json::from_value(candidate.clone()).map_err(|e| {
            CatalogError::SchemaViolation {
                errors: vec![e.to_string()],
            }
        })?;

        if self.contains_id(&record.id) {
            return Err(CatalogError::DuplicateIdentifier { id: record.id });
        }

        self.entries.push(candidate);
        self.sort_entries();

        tracing::debug!(id = %record.id, total = self.entries.len(), "Added record to catalog");
        Ok(record)
    }

    /// Validate every record and look for repeated ids
    pub fn validate_all(&self) -> ValidationReport {
        let invalid = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let errors = validate(entry);
                if errors.is_empty() {
                    return None;
                }
                let name = entry
                    .get("name")
                    .and_then(Value::as_str)
                    .filter(|n| !n.is_empty())
                    .unwrap_or("Unknown")
                    .to_string();
                Some(RecordReport {
                    index,
                    name,
                    errors,
                })
            })
            .collect();

        let mut seen: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for (index, entry) in self.entries.iter().enumerate() {
            if let Some(id) = entry.get("id").and_then(Value::as_str) {
                let slots = seen.entry(id).or_default();
                if slots.is_empty() {
                    order.push(id);
                }
                slots.push(index);
            }
        }

        let duplicate_ids = order
            .into_iter()
            .filter_map(|id| {
                let indices = &seen[id];
                (indices.len() > 1).then(|| (id.to_string(), indices.clone()))
            })
            .collect();

        ValidationReport {
            total: self.entries.len(),
            invalid,
            duplicate_ids,
        }
    }

    /// Write the catalog back, pretty-printed with a trailing newline
    pub fn save(&self) -> Result<(), CatalogError> {
        let mut content =
            serde_json::to_string_pretty(&self.entries).map_err(|source| CatalogError::Parse {
                path: self.path.clone(),
                source,
            })?;
        content.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| CatalogError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        std::fs::write(&self.path, content).map_err(|source| CatalogError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), "Saved catalog");
        Ok(())
    }

    // Category, then name; entries missing either sort first
    fn sort_entries(&mut self) {
        let key = |entry: &Value, field: &str| {
            entry
                .get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_lowercase()
        };

        self.entries.sort_by(|a, b| {
            key(a, "category")
                .cmp(&key(b, "category"))
                .then_with(|| key(a, "name").cmp(&key(b, "name")))
        });
    }
}
