//! Ordering of record lists by a chosen key and direction

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::record::ServerRecord;

/// Key to sort records by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortKey {
    #[default]
    Name,
    Stars,
    LastUpdated,
    Complexity,
    /// Any key this build does not know. Every pair compares equal, so the
    /// input order is returned unchanged.
    Unordered,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Stars => "stars",
            SortKey::LastUpdated => "lastUpdated",
            SortKey::Complexity => "complexity",
            SortKey::Unordered => "unordered",
        }
    }

    /// Parse a key, mapping anything unknown to [`SortKey::Unordered`]
    pub fn parse_lenient(value: &str) -> Self {
        match value {
            "name" => SortKey::Name,
            "stars" => SortKey::Stars,
            "lastUpdated" | "last-updated" | "updated" => SortKey::LastUpdated,
            "complexity" => SortKey::Complexity,
            other => {
                tracing::warn!(
                    sort_key = other,
                    "Unrecognized sort key, leaving records in input order"
                );
                SortKey::Unordered
            }
        }
    }

    /// Compare two records on this key, ascending
    pub fn compare(&self, a: &ServerRecord, b: &ServerRecord) -> Ordering {
        match self {
            SortKey::Name => compare_names(&a.name, &b.name),
            SortKey::Stars => a.star_count().cmp(&b.star_count()),
            // Unparseable dates sort before every real date
            SortKey::LastUpdated => a.last_updated_date().cmp(&b.last_updated_date()),
            SortKey::Complexity => a.complexity.rank().cmp(&b.complexity.rank()),
            SortKey::Unordered => Ordering::Equal,
        }
    }
}

impl From<String> for SortKey {
    fn from(value: String) -> Self {
        SortKey::parse_lenient(&value)
    }
}

impl From<SortKey> for String {
    fn from(key: SortKey) -> Self {
        key.as_str().to_string()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SortKey::parse_lenient(s))
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn flipped(&self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    /// Apply the direction to an ascending comparison
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("Invalid sort order: {other}. Must be one of: asc, desc")),
        }
    }
}

/// Current sort selection of a listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortState {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }

    /// Select `key`: re-selecting the current key flips the direction,
    /// a different key starts ascending.
    pub fn toggle(&mut self, key: SortKey) {
        if self.key == key {
            self.order = self.order.flipped();
        } else {
            self.key = key;
            self.order = SortOrder::Asc;
        }
    }

    pub fn apply<R: Borrow<ServerRecord> + Clone>(&self, records: &[R]) -> Vec<R> {
        sort(records, self.key, self.order)
    }
}

/// Return a sorted copy of `records`
///
/// The sort is stable in both directions: descending reverses each
/// comparison rather than the result, so records with equal keys keep
/// their input order.
pub fn sort<R: Borrow<ServerRecord> + Clone>(records: &[R], key: SortKey, order: SortOrder) -> Vec<R> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| order.apply(key.compare(a.borrow(), b.borrow())));
    sorted
}

// Case-insensitive first, then by code point so that the order is total
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
