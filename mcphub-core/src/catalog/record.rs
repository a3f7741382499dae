//! Server record schema (one entry of `servers.json`)
//!
//! The enum-valued fields are closed sets. Trusted code constructs them
//! directly; untrusted JSON goes through [`super::validate_record`] first.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Value accepted by filters to mean "do not filter on this facet"
pub const ALL_SENTINEL: &str = "all";

/// A closed set of string values backing one record field
pub trait ClosedSet: Sized + Copy + 'static {
    /// JSON field name, used in validation messages
    const FIELD: &'static str;

    /// Every member, in display order
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;

    /// Look up a member by its exact wire value
    fn lookup(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == value)
    }

    /// Comma-separated list of valid wire values
    fn valid_values() -> String {
        Self::ALL
            .iter()
            .map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn parse_closed<T: ClosedSet>(value: &str) -> Result<T, String> {
    T::lookup(value).ok_or_else(|| {
        format!(
            "Invalid {}: {}. Must be one of: {}",
            T::FIELD,
            value,
            T::valid_values()
        )
    })
}

/// Server category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Database,
    Filesystem,
    WebApi,
    Productivity,
    Development,
    Network,
    Firewall,
    Router,
    Nccm,
    Switches,
    Other,
}

impl ClosedSet for Category {
    const FIELD: &'static str = "category";
    const ALL: &'static [Self] = &[
        Category::Database,
        Category::Filesystem,
        Category::WebApi,
        Category::Productivity,
        Category::Development,
        Category::Network,
        Category::Firewall,
        Category::Router,
        Category::Nccm,
        Category::Switches,
        Category::Other,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Category::Database => "database",
            Category::Filesystem => "filesystem",
            Category::WebApi => "web-api",
            Category::Productivity => "productivity",
            Category::Development => "development",
            Category::Network => "network",
            Category::Firewall => "firewall",
            Category::Router => "router",
            Category::Nccm => "nccm",
            Category::Switches => "switches",
            Category::Other => "other",
        }
    }
}

/// Implementation language of a server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Typescript,
    Javascript,
    Go,
    Rust,
    Other,
}

impl ClosedSet for Language {
    const FIELD: &'static str = "language";
    const ALL: &'static [Self] = &[
        Language::Python,
        Language::Typescript,
        Language::Javascript,
        Language::Go,
        Language::Rust,
        Language::Other,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Typescript => "typescript",
            Language::Javascript => "javascript",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Other => "other",
        }
    }
}

/// Setup difficulty. Ordered beginner < intermediate < advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Beginner,
    Intermediate,
    Advanced,
}

impl Complexity {
    /// Fixed rank used for sorting (1..=3)
    pub fn rank(&self) -> u8 {
        match self {
            Complexity::Beginner => 1,
            Complexity::Intermediate => 2,
            Complexity::Advanced => 3,
        }
    }
}

impl ClosedSet for Complexity {
    const FIELD: &'static str = "complexity";
    const ALL: &'static [Self] = &[
        Complexity::Beginner,
        Complexity::Intermediate,
        Complexity::Advanced,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Complexity::Beginner => "beginner",
            Complexity::Intermediate => "intermediate",
            Complexity::Advanced => "advanced",
        }
    }
}

macro_rules! impl_str_traits {
    ($($ty:ty),*) => {$(
        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_closed(s)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    )*};
}

impl_str_traits!(Category, Language, Complexity);

/// Parse a filter facet, where the `all` sentinel (or an empty value) means no filter
pub fn parse_facet<T: ClosedSet + FromStr<Err = String>>(value: &str) -> Result<Option<T>, String> {
    let value = value.trim();
    if value.is_empty() || value == ALL_SENTINEL {
        return Ok(None);
    }
    value.parse().map(Some)
}

/// A catalog entry describing one integration server
///
/// Field order matches the published JSON layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerRecord {
    /// Unique slug (lowercase letters, digits, hyphens)
    pub id: String,

    pub name: String,

    pub description: String,

    pub author: String,

    /// Source repository URL
    pub repository: String,

    /// Documentation URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    pub category: Category,

    pub language: Language,

    pub complexity: Complexity,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_command: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_example: Option<String>,

    #[serde(default)]
    pub features: Vec<String>,

    /// Freshness date, `YYYY-MM-DD`
    pub last_updated: String,

    /// Advisory popularity counter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stars: Option<u64>,
}

impl ServerRecord {
    /// Stars with the missing value treated as zero
    pub fn star_count(&self) -> u64 {
        self.stars.unwrap_or(0)
    }

    /// Parsed `lastUpdated`, if it is a valid calendar date
    pub fn last_updated_date(&self) -> Option<chrono::NaiveDate> {
        chrono::NaiveDate::parse_from_str(&self.last_updated, "%Y-%m-%d").ok()
    }

    /// First `n` features, in display order
    pub fn leading_features(&self, n: usize) -> &[String] {
        &self.features[..self.features.len().min(n)]
    }

    /// Tags as a comma-separated string
    pub fn tags_display(&self) -> String {
        self.tags.join(", ")
    }

    /// Truncate description to first line
    pub fn short_description(&self) -> &str {
        self.description
            .lines()
            .next()
            .unwrap_or(&self.description)
            .trim()
    }
}
