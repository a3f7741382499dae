//! Record fixtures shared by the catalog unit tests

use super::record::{Category, Complexity, Language, ServerRecord};

pub fn record(id: &str, name: &str, category: Category, complexity: Complexity) -> ServerRecord {
    ServerRecord {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{name} server"),
        author: "tester".to_string(),
        repository: format!("https://github.com/tester/{id}"),
        documentation: None,
        tags: Vec::new(),
        category,
        language: Language::Python,
        complexity,
        install_command: None,
        config_example: None,
        features: vec!["Does one thing well".to_string()],
        last_updated: "2025-01-01".to_string(),
        stars: Some(0),
    }
}
