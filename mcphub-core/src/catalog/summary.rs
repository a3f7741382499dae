//! Headline numbers for a list of records

use serde::Serialize;

use super::record::{Category, Language, ServerRecord};
use super::sort::SortKey;

/// Collection overview: counts and the freshest entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSummary<'a> {
    pub total: usize,
    /// Distinct categories in first-seen order
    pub categories: Vec<Category>,
    /// Distinct languages in first-seen order
    pub languages: Vec<Language>,
    /// Most recently updated record; the earliest one wins a tie
    pub latest: Option<&'a ServerRecord>,
}

impl<'a> CatalogSummary<'a> {
    pub fn of(records: &'a [ServerRecord]) -> Self {
        let mut categories = Vec::new();
        let mut languages = Vec::new();

        for record in records {
            if !categories.contains(&record.category) {
                categories.push(record.category);
            }
            if !languages.contains(&record.language) {
                languages.push(record.language);
            }
        }

        let latest = records.iter().reduce(|best, candidate| {
            if SortKey::LastUpdated.compare(candidate, best).is_gt() {
                candidate
            } else {
                best
            }
        });

        Self {
            total: records.len(),
            categories,
            languages,
            latest,
        }
    }
}
