//! `mcphub submit`: turn form input into a catalog entry and an issue link

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use mcphub_core::catalog::{
    file_name, issue_body, issue_url, to_json, validate_record, CatalogFile, Category,
    Complexity, Language, ServerSubmission,
};

use crate::Settings;

#[derive(Args, Debug, Default)]
pub struct SubmitArgs {
    /// Read the form from a JSON file (flags override its fields)
    #[clap(long = "from")]
    from: Option<PathBuf>,

    #[clap(long)]
    name: Option<String>,

    #[clap(long)]
    description: Option<String>,

    #[clap(long)]
    author: Option<String>,

    /// Source repository URL
    #[clap(long)]
    repository: Option<String>,

    /// Documentation URL
    #[clap(long)]
    documentation: Option<String>,

    #[clap(long)]
    category: Option<Category>,

    #[clap(long)]
    language: Option<Language>,

    #[clap(long)]
    complexity: Option<Complexity>,

    /// Tag (repeatable, duplicates ignored)
    #[clap(long = "tag")]
    tags: Vec<String>,

    /// Feature line (repeatable)
    #[clap(long = "feature")]
    features: Vec<String>,

    #[clap(long)]
    install_command: Option<String>,

    #[clap(long)]
    config_example: Option<String>,

    /// Directory the generated `<id>.json` is written to
    #[clap(long, default_value = ".")]
    output: PathBuf,

    /// Print the issue body instead of the issue link
    #[clap(long)]
    print_body: bool,

    /// Repository to file the issue against (overrides the config)
    #[clap(long)]
    issue_repository: Option<String>,
}

impl SubmitArgs {
    pub async fn execute(self, settings: &Settings) -> Result<()> {
        let submission = self.collect()?;

        let missing = submission.missing_fields();
        if !missing.is_empty() {
            eprintln!("Please fill in all required fields: {}", missing.join(", "));
            std::process::exit(1);
        }

        let record = submission.build()?;

        let errors = validate_record(&record);
        if !errors.is_empty() {
            eprintln!("Validation failed:");
            for error in &errors {
                eprintln!("  - {error}");
            }
            std::process::exit(1);
        }

        warn_if_listed(&settings.config.catalog_path, &record.id);

        let json = to_json(&record)?;
        let path = write_entry(&self.output, &file_name(&record), &json)?;
        println!("Wrote {}", path.display());

        let repository = self
            .issue_repository
            .as_deref()
            .unwrap_or(&settings.config.submission_repository);

        if self.print_body {
            println!();
            println!("{}", issue_body(&record)?);
        } else {
            println!();
            println!("Open this link to submit the server for review:");
            println!("{}", issue_url(repository, &record)?);
        }

        Ok(())
    }

    /// Start from the `--from` file, then apply every flag that was given
    fn collect(&self) -> Result<ServerSubmission> {
        let mut submission = match &self.from {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read submission: {}", path.display()))?;
                serde_json::from_str::<ServerSubmission>(&content)
                    .with_context(|| format!("Failed to parse submission: {}", path.display()))?
            }
            None => ServerSubmission::default(),
        };

        let required = [
            (&mut submission.name, &self.name),
            (&mut submission.description, &self.description),
            (&mut submission.author, &self.author),
            (&mut submission.repository, &self.repository),
        ];
        for (field, value) in required {
            if let Some(value) = value {
                *field = value.clone();
            }
        }

        let optional = [
            (&mut submission.documentation, &self.documentation),
            (&mut submission.install_command, &self.install_command),
            (&mut submission.config_example, &self.config_example),
        ];
        for (field, value) in optional {
            if value.is_some() {
                *field = value.clone();
            }
        }

        if self.category.is_some() {
            submission.category = self.category;
        }
        if self.language.is_some() {
            submission.language = self.language;
        }
        if self.complexity.is_some() {
            submission.complexity = self.complexity;
        }

        for tag in &self.tags {
            submission.add_tag(tag);
        }
        if !self.features.is_empty() {
            submission.features = self.features.clone();
        }

        Ok(submission)
    }
}

/// Submissions are reviewed by hand, so a collision only warrants a warning
fn warn_if_listed(catalog_path: &Path, id: &str) {
    match CatalogFile::load(catalog_path) {
        Ok(catalog) if catalog.contains_id(id) => {
            tracing::warn!(id, catalog = %catalog_path.display(), "A server with this ID is already listed");
        }
        Ok(_) => {}
        Err(e) => tracing::debug!(error = %e, "Local catalog not available for duplicate check"),
    }
}

fn write_entry(dir: &Path, name: &str, json: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    let path = dir.join(name);
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
