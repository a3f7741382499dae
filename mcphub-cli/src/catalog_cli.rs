//! Catalog maintenance and browsing commands
//!
//! `add` and `validate` operate on the local catalog file and exit with a
//! non-zero status on any validation failure. `search`, `show` and `stats`
//! read either the local file or the published catalog.

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use mcphub_core::catalog::{
    filter, parse_facet, CatalogFile, CatalogQuery, CatalogSummary, Category, Complexity,
    Language, RemoteCatalog, ServerRecord, SortKey, SortOrder,
};
use mcphub_core::CatalogError;

use crate::Settings;

/// Features shown by `show` before the rest is elided
const SHOWN_FEATURES: usize = 3;

#[derive(Subcommand, Debug)]
pub enum CatalogSubcommand {
    /// Add a new server from a JSON file (validated, duplicate ids rejected)
    Add {
        /// Path to the server JSON file
        file: PathBuf,
    },

    /// Validate every server in the catalog
    Validate {
        /// Output the report as JSON
        #[clap(long)]
        json: bool,
    },

    /// Search and filter servers
    Search {
        /// Search text (matches name, description, author, tags)
        query: Option<String>,

        /// Filter by category ("all" for any)
        #[clap(long)]
        category: Option<String>,

        /// Filter by language ("all" for any)
        #[clap(long)]
        language: Option<String>,

        /// Filter by complexity ("all" for any)
        #[clap(long)]
        complexity: Option<String>,

        /// Filter by tag (repeatable, any tag may match)
        #[clap(long = "tag")]
        tags: Vec<String>,

        /// Sort key: name, stars, lastUpdated, complexity
        #[clap(long, default_value = "name")]
        sort: SortKey,

        /// Sort order: asc or desc
        #[clap(long, default_value = "asc")]
        order: SortOrder,

        /// Output results as JSON
        #[clap(long)]
        json: bool,

        /// Search the published catalog instead of the local file
        #[clap(long)]
        remote: bool,

        /// Published catalog URL (overrides the configured one)
        #[clap(long)]
        url: Option<String>,

        /// Force refresh of the published catalog (bypass cache)
        #[clap(long)]
        refresh: bool,
    },

    /// Show detailed information about a server
    Show {
        /// Server id
        id: String,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Summarize the catalog
    Stats {
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },
}

impl CatalogSubcommand {
    pub async fn execute(self, settings: &Settings) -> Result<()> {
        let catalog_path = settings.config.catalog_path.as_path();

        match self {
            CatalogSubcommand::Add { file } => execute_add(catalog_path, &file),
            CatalogSubcommand::Validate { json } => execute_validate(catalog_path, json),
            CatalogSubcommand::Search {
                query,
                category,
                language,
                complexity,
                tags,
                sort,
                order,
                json,
                remote,
                url,
                refresh,
            } => {
                let query = build_query(query, category, language, complexity, tags)?;
                let records = if remote {
                    fetch_remote(settings, url, refresh).await?
                } else {
                    load_records(catalog_path)?
                };
                execute_search(&records, &query, sort, order, json)
            }
            CatalogSubcommand::Show { id, json } => {
                execute_show(&load_records(catalog_path)?, &id, json)
            }
            CatalogSubcommand::Stats { json } => execute_stats(&load_records(catalog_path)?, json),
        }
    }
}

fn build_query(
    text: Option<String>,
    category: Option<String>,
    language: Option<String>,
    complexity: Option<String>,
    tags: Vec<String>,
) -> Result<CatalogQuery> {
    let facet = |value: Option<String>| value.unwrap_or_default();

    Ok(CatalogQuery {
        text,
        category: parse_facet::<Category>(&facet(category)).map_err(anyhow::Error::msg)?,
        language: parse_facet::<Language>(&facet(language)).map_err(anyhow::Error::msg)?,
        complexity: parse_facet::<Complexity>(&facet(complexity)).map_err(anyhow::Error::msg)?,
        tags: tags.into_iter().filter(|t| !t.trim().is_empty()).collect(),
    })
}

fn load_records(path: &Path) -> Result<Vec<ServerRecord>> {
    let catalog = CatalogFile::load(path)?;
    catalog
        .records()
        .with_context(|| format!("Catalog {} contains invalid records. Run 'mcphub validate'", path.display()))
}

async fn fetch_remote(
    settings: &Settings,
    url: Option<String>,
    force_refresh: bool,
) -> Result<Vec<ServerRecord>> {
    let url = url
        .or_else(|| settings.config.catalog_url.clone())
        .context("No catalog URL configured. Pass --url or set catalog_url in the config file")?;

    if force_refresh {
        eprintln!("Fetching catalog (refreshing cache)...");
    } else {
        eprintln!("Fetching catalog...");
    }

    let mut remote = RemoteCatalog::new(settings.config.cache_ttl());
    if let Some(dir) = settings.config.resolved_cache_dir() {
        remote = remote.with_cache_dir(dir);
    }
    let records = remote.fetch(&url, force_refresh).await?;
    Ok(records.as_ref().clone())
}

fn execute_add(catalog_path: &Path, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Error reading JSON file: {}", file.display()))?;
    let candidate: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Error parsing JSON file: {}", file.display()))?;

    let mut catalog = CatalogFile::load_or_empty(catalog_path)?;

    let record = match catalog.add(candidate) {
        Ok(record) => record,
        Err(CatalogError::SchemaViolation { errors }) => {
            eprintln!("Validation failed:");
            for error in &errors {
                eprintln!("  - {error}");
            }
            std::process::exit(1);
        }
        Err(e @ CatalogError::DuplicateIdentifier { .. }) => {
            eprintln!("ERROR: {e}");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    catalog.save()?;

    println!("Successfully added server: {}", record.name);
    println!("   ID: {}", record.id);
    println!("   Category: {}", record.category);
    println!("   Language: {}", record.language);

    Ok(())
}

fn execute_validate(catalog_path: &Path, json_output: bool) -> Result<()> {
    let catalog = CatalogFile::load(catalog_path)?;
    let report = catalog.validate_all();

    if json_output {
        let output = serde_json::json!({
            "total": report.total,
            "errorCount": report.error_count(),
            "invalid": report.invalid.iter().map(|r| serde_json::json!({
                "index": r.index,
                "name": r.name,
                "errors": r.errors,
            })).collect::<Vec<_>>(),
            "duplicateIds": report.duplicate_ids.iter().map(|(id, indices)| serde_json::json!({
                "id": id,
                "indices": indices,
            })).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for record in &report.invalid {
            eprintln!("Server \"{}\" (index {}):", record.name, record.index);
            for error in &record.errors {
                eprintln!("  - {error}");
            }
            eprintln!();
        }

        for (id, indices) in &report.duplicate_ids {
            let positions: Vec<String> = indices.iter().map(|i| i.to_string()).collect();
            eprintln!(
                "Duplicate ID '{id}' at indices {}",
                positions.join(", ")
            );
        }

        if report.is_valid() {
            println!("All {} servers are valid!", report.total);
        } else {
            eprintln!(
                "Found {} validation errors across {} servers",
                report.error_count(),
                report.total
            );
        }
    }

    if !report.is_valid() {
        std::process::exit(1);
    }

    Ok(())
}

/// Table row for search results
#[derive(Tabled)]
struct SearchResultRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Language")]
    language: String,
    #[tabled(rename = "Complexity")]
    complexity: String,
    #[tabled(rename = "Stars")]
    stars: u64,
    #[tabled(rename = "Updated")]
    updated: String,
}

fn execute_search(
    records: &[ServerRecord],
    query: &CatalogQuery,
    sort: SortKey,
    order: SortOrder,
    json_output: bool,
) -> Result<()> {
    let matched = filter(records, query);
    let results = mcphub_core::catalog::sort(&matched, sort, order);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No servers found.");
        return Ok(());
    }

    println!("Found {} server(s):\n", results.len());

    let table_rows: Vec<SearchResultRow> = results
        .iter()
        .map(|record| SearchResultRow {
            name: truncate(&record.name, 40),
            id: record.id.clone(),
            category: record.category.to_string(),
            language: record.language.to_string(),
            complexity: record.complexity.to_string(),
            stars: record.star_count(),
            updated: record.last_updated.clone(),
        })
        .collect();

    let table = Table::new(&table_rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();

    println!("{table}");
    Ok(())
}

fn execute_show(records: &[ServerRecord], id: &str, json_output: bool) -> Result<()> {
    let record = records
        .iter()
        .find(|r| r.id == id)
        .with_context(|| format!("Server '{id}' not found in catalog"))?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    println!();
    println!("Server:     {}", record.name);
    println!("ID:         {}", record.id);
    println!("Author:     {}", record.author);
    println!("Category:   {}", record.category);
    println!("Language:   {}", record.language);
    println!("Complexity: {}", record.complexity);
    println!("Stars:      {}", record.star_count());
    println!("Updated:    {}", record.last_updated);
    println!("Repository: {}", record.repository);
    if let Some(docs) = &record.documentation {
        println!("Docs:       {docs}");
    }
    if !record.tags.is_empty() {
        println!("Tags:       {}", record.tags_display());
    }

    println!();
    println!("Description:");
    for line in record.description.lines() {
        println!("  {line}");
    }

    if !record.features.is_empty() {
        println!();
        println!("Features:");
        for feature in record.leading_features(SHOWN_FEATURES) {
            println!("  - {}", feature.trim());
        }
        if record.features.len() > SHOWN_FEATURES {
            println!("  ... and {} more", record.features.len() - SHOWN_FEATURES);
        }
    }

    if let Some(command) = record.install_command.as_deref().filter(|c| !c.is_empty()) {
        println!();
        println!("Installation:");
        println!("  {command}");
    }

    if let Some(config) = record.config_example.as_deref().filter(|c| !c.is_empty()) {
        println!();
        println!("Configuration:");
        for line in config.lines() {
            println!("  {line}");
        }
    }

    Ok(())
}

fn execute_stats(records: &[ServerRecord], json_output: bool) -> Result<()> {
    let summary = CatalogSummary::of(records);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let join = |values: Vec<String>| values.join(", ");

    println!("Servers:    {}", summary.total);
    println!(
        "Categories: {} ({})",
        summary.categories.len(),
        join(summary.categories.iter().map(|c| c.to_string()).collect())
    );
    println!(
        "Languages:  {} ({})",
        summary.languages.len(),
        join(summary.languages.iter().map(|l| l.to_string()).collect())
    );
    if let Some(latest) = summary.latest {
        println!("Latest:     {} ({})", latest.name, latest.last_updated);
    }

    Ok(())
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() > max_chars {
        let head: String = value.chars().take(max_chars - 3).collect();
        format!("{head}...")
    } else {
        value.to_string()
    }
}
