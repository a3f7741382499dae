//! Integration tests for the catalog module

#[cfg(test)]
mod integration_tests {
    use crate::catalog::{
        filter, sort, validate, CatalogQuery, Category, Complexity, ServerRecord,
        ServerSubmission, SortKey, SortOrder,
    };
    use serde_json::json;

    fn records() -> Vec<ServerRecord> {
        let raw = json!([
            {
                "id": "zeta",
                "name": "Zeta",
                "description": "Time-series store",
                "author": "z-team",
                "repository": "https://github.com/z-team/zeta",
                "tags": ["timeseries"],
                "category": "database",
                "language": "rust",
                "complexity": "beginner",
                "features": ["Ingest"],
                "lastUpdated": "2025-01-01",
                "stars": 5
            },
            {
                "id": "alpha",
                "name": "Alpha",
                "description": "Graph queries",
                "author": "a-team",
                "repository": "https://github.com/a-team/alpha",
                "tags": ["graph"],
                "category": "database",
                "language": "go",
                "complexity": "advanced",
                "features": ["Cypher"],
                "lastUpdated": "2025-06-01",
                "stars": 10
            }
        ]);
        serde_json::from_value(raw).unwrap()
    }

    /// Filter by category then sort by stars, descending
    #[test]
    fn test_filter_then_sort_pipeline() {
        let records = records();

        let filtered = filter(&records, &CatalogQuery::new().with_category(Category::Database));
        assert_eq!(filtered.len(), 2);

        let sorted = sort(&filtered, SortKey::Stars, SortOrder::Desc);
        let names: Vec<&str> = sorted.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn test_text_search_matches_name_prefix() {
        let records = records();
        let result = filter(&records, &CatalogQuery::new().with_text("zet"));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Zeta");
    }

    #[test]
    fn test_complexity_sort_is_by_rank() {
        let records = records();
        let sorted = sort(&records, SortKey::Complexity, SortOrder::Asc);
        assert_eq!(sorted[0].complexity, Complexity::Beginner);
        assert_eq!(sorted[1].complexity, Complexity::Advanced);
    }

    /// A submission, once built, passes the same validation as the catalog file
    #[test]
    fn test_submission_output_passes_validation() {
        let submission: ServerSubmission = serde_json::from_value(json!({
            "name": "Juniper Junos MCP",
            "description": "Run show commands on Junos devices",
            "author": "netops",
            "repository": "https://github.com/netops/junos-mcp",
            "category": "router",
            "language": "python",
            "complexity": "intermediate",
            "tags": ["juniper"],
            "features": ["show commands", ""]
        }))
        .unwrap();
        assert!(submission.is_complete());

        let record = submission.build().unwrap();
        assert_eq!(record.id, "juniper-junos-mcp");

        let document: serde_json::Value =
            serde_json::from_str(&crate::catalog::to_json(&record).unwrap()).unwrap();
        assert!(validate(&document).is_empty());
    }
}
