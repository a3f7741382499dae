//! Search and facet filtering over an in-memory list of records

use serde::{Deserialize, Serialize};

use super::record::{Category, Complexity, Language, ServerRecord};

/// A search query: free text plus structured facet filters
///
/// `None` (or an empty string/list) means the predicate is inactive. The
/// `all` facet sentinel maps to `None` when parsed, see [`super::parse_facet`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    /// Matched against name, description, author and tags
    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub category: Option<Category>,

    #[serde(default)]
    pub language: Option<Language>,

    #[serde(default)]
    pub complexity: Option<Complexity>,

    /// A record passes if any of these is a substring of any of its tags
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CatalogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = Some(complexity);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// `true` when no predicate is active
    pub fn is_empty(&self) -> bool {
        self.active_text().is_none()
            && self.category.is_none()
            && self.language.is_none()
            && self.complexity.is_none()
            && self.tags.is_empty()
    }

    /// Check a single record against every active predicate
    pub fn matches(&self, record: &ServerRecord) -> bool {
        if let Some(text) = self.active_text() {
            let needle = text.to_lowercase();
            let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);

            let matches_text = contains(&record.name)
                || contains(&record.description)
                || contains(&record.author)
                || record.tags.iter().any(|tag| contains(tag));

            if !matches_text {
                return false;
            }
        }

        if self.category.is_some_and(|c| c != record.category) {
            return false;
        }

        if self.language.is_some_and(|l| l != record.language) {
            return false;
        }

        if self.complexity.is_some_and(|c| c != record.complexity) {
            return false;
        }

        if !self.tags.is_empty() {
            let has_matching_tag = self.tags.iter().any(|wanted| {
                let wanted = wanted.to_lowercase();
                record
                    .tags
                    .iter()
                    .any(|tag| tag.to_lowercase().contains(&wanted))
            });

            if !has_matching_tag {
                return false;
            }
        }

        true
    }

    fn active_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }
}

/// Records matching `query`, in their original relative order
pub fn filter<'a>(records: &'a [ServerRecord], query: &CatalogQuery) -> Vec<&'a ServerRecord> {
    let matched: Vec<&ServerRecord> = records.iter().filter(|r| query.matches(r)).collect();

    tracing::debug!(
        total = records.len(),
        matched = matched.len(),
        "Filtered catalog records"
    );

    matched
}
