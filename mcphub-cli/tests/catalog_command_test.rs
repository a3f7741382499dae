//! End-to-end tests for the catalog maintenance commands

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Run mcphub against a catalog inside `dir`, ignoring any user config
fn run_mcphub(dir: &Path, args: &[&str]) -> std::process::Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_mcphub"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(["--config", "no-such-config.yaml", "--catalog", "servers.json"])
        .args(args)
        .output()
        .expect("Failed to run mcphub")
}

fn server(id: &str, name: &str, category: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{name} for network automation"),
        "author": "netops",
        "repository": format!("https://github.com/netops/{id}"),
        "tags": ["automation"],
        "category": category,
        "language": "python",
        "complexity": "intermediate",
        "features": ["Collects device state"],
        "lastUpdated": "2025-03-14",
        "stars": 12
    })
}

fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn catalog_path(dir: &TempDir) -> PathBuf {
    dir.path().join("servers.json")
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_add_to_missing_catalog_creates_sorted_file() {
    let temp_dir = TempDir::new().unwrap();
    write_json(&temp_dir.path().join("b.json"), &server("paloalto-mcp", "Palo Alto MCP", "firewall"));
    write_json(&temp_dir.path().join("a.json"), &server("aci-mcp", "ACI MCP", "network"));

    let output = run_mcphub(temp_dir.path(), &["add", "b.json"]);
    assert!(output.status.success(), "add failed: {}", stdout(&output));
    assert!(stdout(&output).contains("Successfully added server: Palo Alto MCP"));

    let output = run_mcphub(temp_dir.path(), &["add", "a.json"]);
    assert!(output.status.success(), "add failed: {}", stdout(&output));

    let content = fs::read_to_string(catalog_path(&temp_dir)).unwrap();
    assert!(content.ends_with("]\n"));

    let saved: Vec<Value> = serde_json::from_str(&content).unwrap();
    let ids: Vec<&str> = saved.iter().map(|s| s["id"].as_str().unwrap()).collect();
    // firewall sorts before network
    assert_eq!(ids, vec!["paloalto-mcp", "aci-mcp"]);
}

#[test]
fn test_add_rejects_duplicate_id() {
    let temp_dir = TempDir::new().unwrap();
    write_json(&catalog_path(&temp_dir), &json!([server("aci-mcp", "ACI MCP", "network")]));
    write_json(&temp_dir.path().join("dup.json"), &server("aci-mcp", "ACI MCP Again", "network"));

    let output = run_mcphub(temp_dir.path(), &["add", "dup.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Server with ID 'aci-mcp' already exists"));

    let saved: Vec<Value> =
        serde_json::from_str(&fs::read_to_string(catalog_path(&temp_dir)).unwrap()).unwrap();
    assert_eq!(saved.len(), 1);
}

#[test]
fn test_add_reports_every_violation() {
    let temp_dir = TempDir::new().unwrap();
    let mut candidate = server("Bad ID", "Bad", "network");
    candidate["author"] = json!("");
    candidate["lastUpdated"] = json!("03/14/2025");
    write_json(&temp_dir.path().join("bad.json"), &candidate);

    let output = run_mcphub(temp_dir.path(), &["add", "bad.json"]);
    assert_eq!(output.status.code(), Some(1));

    let text = stderr(&output);
    assert!(text.contains("Validation failed:"));
    assert!(text.contains("Missing required field: author"));
    assert!(text.contains("Invalid date format: 03/14/2025. Expected YYYY-MM-DD"));
    assert!(text.contains("Invalid ID format: Bad ID"));
    assert!(!catalog_path(&temp_dir).exists());
}

#[test]
fn test_validate_labels_unnamed_records() {
    let temp_dir = TempDir::new().unwrap();
    let mut unnamed = server("nameless", "", "router");
    unnamed.as_object_mut().unwrap().remove("name");
    write_json(
        &catalog_path(&temp_dir),
        &json!([server("aci-mcp", "ACI MCP", "network"), unnamed]),
    );

    let output = run_mcphub(temp_dir.path(), &["validate"]);
    assert_eq!(output.status.code(), Some(1));

    let text = stderr(&output);
    assert!(text.contains("Server \"Unknown\" (index 1):"));
    assert!(text.contains("Missing required field: name"));
    assert!(text.contains("Found 1 validation errors across 2 servers"));
    assert!(!stdout(&output).contains("Missing required field"));
}

#[test]
fn test_validate_clean_catalog() {
    let temp_dir = TempDir::new().unwrap();
    write_json(
        &catalog_path(&temp_dir),
        &json!([server("aci-mcp", "ACI MCP", "network"), server("junos-mcp", "Junos MCP", "router")]),
    );

    let output = run_mcphub(temp_dir.path(), &["validate"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("All 2 servers are valid!"));
}

#[test]
fn test_search_json_filters_and_sorts() {
    let temp_dir = TempDir::new().unwrap();
    let mut popular = server("nautobot-mcp", "Nautobot MCP", "network");
    popular["stars"] = json!(250);
    write_json(
        &catalog_path(&temp_dir),
        &json!([
            server("aci-mcp", "ACI MCP", "network"),
            server("junos-mcp", "Junos MCP", "router"),
            popular
        ]),
    );

    let output = run_mcphub(
        temp_dir.path(),
        &["search", "--category", "network", "--sort", "stars", "--order", "desc", "--json"],
    );
    assert!(output.status.success());

    let results: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = results.iter().map(|s| s["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["nautobot-mcp", "aci-mcp"]);
}

#[test]
fn test_search_rejects_unknown_category() {
    let temp_dir = TempDir::new().unwrap();
    write_json(&catalog_path(&temp_dir), &json!([]));

    let output = run_mcphub(temp_dir.path(), &["search", "--category", "spaceships"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid category: spaceships"));
}

#[test]
fn test_validate_json_keeps_stdout_parseable() {
    let temp_dir = TempDir::new().unwrap();
    let mut broken = server("broken", "Broken", "router");
    broken["repository"] = json!("not a url");
    write_json(&catalog_path(&temp_dir), &json!([broken]));

    let output = run_mcphub(temp_dir.path(), &["validate", "--json"]);
    assert_eq!(output.status.code(), Some(1));

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["errorCount"], 1);
    assert_eq!(report["invalid"][0]["errors"][0], "Invalid repository URL: not a url");
}

/// Cache file name used for a catalog URL
fn cache_file_for(dir: &Path, url: &str) -> PathBuf {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    url.hash(&mut hasher);
    dir.join(format!("catalog_{:016x}.json", hasher.finish()))
}

#[test]
fn test_remote_search_uses_persisted_cache_until_refresh() {
    let temp_dir = TempDir::new().unwrap();
    let cache_dir = temp_dir.path().join("cache");
    fs::create_dir_all(&cache_dir).unwrap();

    let url = "http://catalog.invalid/data/servers.json";
    fs::write(
        temp_dir.path().join("config.yaml"),
        format!("catalog_url: {url}\ncache_dir: {}\n", cache_dir.display()),
    )
    .unwrap();

    let now_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64;
    write_json(
        &cache_file_for(&cache_dir, url),
        &json!({
            "url": url,
            "cachedAtMs": now_ms,
            "records": [server("aci-mcp", "ACI MCP", "network")]
        }),
    );

    let run = |extra: &[&str]| {
        std::process::Command::new(env!("CARGO_BIN_EXE_mcphub"))
            .current_dir(temp_dir.path())
            .env_remove("RUST_LOG")
            .args(["--config", "config.yaml", "search", "--remote", "--json"])
            .args(extra)
            .output()
            .expect("Failed to run mcphub")
    };

    let output = run(&[]);
    assert!(output.status.success(), "cached search failed: {}", stderr(&output));
    let results: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], "aci-mcp");

    // The host does not resolve, so bypassing the cache has to fail
    let output = run(&["--refresh"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("refreshing cache"));
}
