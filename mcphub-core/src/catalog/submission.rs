//! Building new catalog records from submission form input
//!
//! A [`ServerSubmission`] holds what a contributor typed. Once it is
//! complete it can be turned into a [`ServerRecord`] and rendered either as
//! a JSON file for download or as the body of a pre-filled issue.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use super::record::{Category, Complexity, Language, ServerRecord};
use crate::error::CatalogError;

/// Repository new submissions are filed against by default
pub const DEFAULT_SUBMISSION_REPOSITORY: &str = "https://github.com/seefor/network-mcp-hub";

/// Partial record entered by a contributor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSubmission {
    pub name: String,
    pub description: String,
    pub author: String,
    pub repository: String,
    pub documentation: Option<String>,
    pub tags: Vec<String>,
    pub category: Option<Category>,
    pub language: Option<Language>,
    pub complexity: Option<Complexity>,
    pub install_command: Option<String>,
    pub config_example: Option<String>,
    pub features: Vec<String>,
}

impl ServerSubmission {
    /// Required fields that are still empty, in form order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        for (field, value) in [
            ("name", &self.name),
            ("description", &self.description),
            ("author", &self.author),
            ("repository", &self.repository),
        ] {
            if value.is_empty() {
                missing.push(field);
            }
        }

        if self.category.is_none() {
            missing.push("category");
        }
        if self.language.is_none() {
            missing.push("language");
        }
        if self.complexity.is_none() {
            missing.push("complexity");
        }

        missing
    }

    /// Gate for interactive flows: every required field has a value
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Add a tag unless it is blank or already present
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Build a record stamped with today's (UTC) date
    pub fn build(&self) -> Result<ServerRecord, CatalogError> {
        self.build_on(chrono::Utc::now().date_naive())
    }

    /// Build a record stamped with `today`
    ///
    /// Text fields are copied as entered and are not validated here; run
    /// [`super::validate_record`] on the result before persisting it. Only
    /// the enum fields are required, since a record cannot exist without them.
    pub fn build_on(&self, today: NaiveDate) -> Result<ServerRecord, CatalogError> {
        let (Some(category), Some(language), Some(complexity)) =
            (self.category, self.language, self.complexity)
        else {
            let missing = self
                .missing_fields()
                .into_iter()
                .filter(|f| matches!(*f, "category" | "language" | "complexity"))
                .collect();
            return Err(CatalogError::Incomplete { missing });
        };

        Ok(ServerRecord {
            id: slugify(&self.name),
            name: self.name.clone(),
            description: self.description.clone(),
            author: self.author.clone(),
            repository: self.repository.clone(),
            documentation: non_blank(&self.documentation),
            tags: self.tags.clone(),
            category,
            language,
            complexity,
            install_command: non_blank(&self.install_command),
            config_example: non_blank(&self.config_example),
            features: self
                .features
                .iter()
                .filter(|f| !f.trim().is_empty())
                .cloned()
                .collect(),
            last_updated: today.format("%Y-%m-%d").to_string(),
            stars: Some(0),
        })
    }
}

/// Derive a record id from a display name
///
/// Lowercases, turns every run of characters outside `[a-z0-9]` into a
/// single hyphen, and strips hyphens from both ends.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// File name used when the record is downloaded
pub fn file_name(record: &ServerRecord) -> String {
    format!("{}.json", record.id)
}

/// Record as a pretty-printed JSON document
pub fn to_json(record: &ServerRecord) -> Result<String> {
    serde_json::to_string_pretty(record).context("Failed to serialize server record")
}

/// Title of the submission issue
pub fn issue_title(record: &ServerRecord) -> String {
    format!("Add Server: {}", record.name)
}

/// Markdown body of the submission issue, with the JSON document appended
pub fn issue_body(record: &ServerRecord) -> Result<String> {
    let json = to_json(record)?;
    let mut body = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(body, "## New MCP Server Submission\n");
    let _ = writeln!(body, "**Server Name:** {}", record.name);
    let _ = writeln!(body, "**Author:** {}", record.author);
    let _ = writeln!(body, "**Repository:** {}", record.repository);
    let _ = writeln!(body, "**Category:** {}", record.category);
    let _ = writeln!(body, "**Language:** {}", record.language);
    let _ = writeln!(body, "**Complexity:** {}", record.complexity);

    let _ = writeln!(body, "\n**Description:**\n{}", record.description);

    let _ = writeln!(body, "\n**Features:**");
    for feature in &record.features {
        let _ = writeln!(body, "- {feature}");
    }

    // Both sections are always present; an absent value leaves the fence empty
    let command = record.install_command.as_deref().unwrap_or_default();
    let _ = writeln!(body, "\n**Installation Command:**\n```\n{command}\n```");

    let config = record.config_example.as_deref().unwrap_or_default();
    let _ = writeln!(body, "\n**Configuration Example:**\n```json\n{config}\n```");

    let _ = writeln!(body, "\n**Tags:** {}", record.tags_display());
    let _ = writeln!(body, "\n**Server JSON Data:**\n```json\n{json}\n```");
    let _ = write!(
        body,
        "\n---\n*This submission was created using the Network MCP Hub submission form.*"
    );

    Ok(body)
}

/// Pre-filled "new issue" URL on `repository` for this record
pub fn issue_url(repository: &str, record: &ServerRecord) -> Result<url::Url> {
    let base = format!("{}/issues/new", repository.trim_end_matches('/'));
    let mut url = url::Url::parse(&base)
        .with_context(|| format!("Invalid submission repository URL: {repository}"))?;

    url.query_pairs_mut()
        .append_pair("title", &issue_title(record))
        .append_pair("body", &issue_body(record)?);

    Ok(url)
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}
