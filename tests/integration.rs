use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn doctags_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("doctags");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let files_dir = root.join("files");
    fs::create_dir_all(&files_dir).unwrap();

    fs::write(
        files_dir.join("groups.json"),
        r#"[
  {"id": "g1", "name": "Family", "tags": ["Alice", "Bob"]},
  {"id": "g2", "group_name": "Topics", "tags": ["Tax", "Insurance"], "is_required": false}
]"#,
    )
    .unwrap();

    fs::write(
        files_dir.join("docs.json"),
        r#"[
  {"id": "d1", "title": "Invoice #1", "organization": "Acme", "tags": ["Alice", "Tax"],
   "document_type": "invoice", "processing_status": "processed", "created_at": "2024-01-05"},
  {"id": "d2", "title": "Contract A", "tags": ["Bob"],
   "documentType": "contract", "processingStatus": "processed", "created_date": "2024-02-01"},
  {"id": "d3", "title": "Home insurance", "tags": ["Alice", "Insurance", "Urgent"],
   "ai_suggested_tags": ["Bob", "Renewal"], "processing_status": "error", "created_at": "2023-12-24"}
]"#,
    )
    .unwrap();

    fs::write(
        files_dir.join("untagged.json"),
        r#"[
  {"id": "d4", "title": "Receipt", "tags": ["Alice"]},
  {"id": "d5", "title": "Loose scan", "tags": ["Urgent"]}
]"#,
    )
    .unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/doctags.sqlite"

[search]
final_limit = 20
"#,
        root.display()
    );

    let config_path = config_dir.join("doctags.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn files(config_path: &Path, name: &str) -> String {
    config_path
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("files")
        .join(name)
        .to_str()
        .unwrap()
        .to_string()
}

fn run_doctags(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = doctags_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("DOCTAGS_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run doctags binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

/// Init, load the taxonomy, and import the main fixture.
fn seeded_env() -> (TempDir, PathBuf) {
    let (tmp, config_path) = setup_test_env();
    let (_, stderr, ok) = run_doctags(&config_path, &["init"]);
    assert!(ok, "init failed: {}", stderr);
    let groups = files(&config_path, "groups.json");
    let (_, stderr, ok) = run_doctags(&config_path, &["taxonomy", "import", &groups]);
    assert!(ok, "taxonomy import failed: {}", stderr);
    let docs = files(&config_path, "docs.json");
    let (stdout, stderr, ok) = run_doctags(&config_path, &["import", &docs]);
    assert!(ok, "import failed: stdout={}, stderr={}", stdout, stderr);
    (tmp, config_path)
}

#[test]
fn test_init_creates_database() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_doctags(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_doctags(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_doctags(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_taxonomy_import_and_list() {
    let (_tmp, config_path) = seeded_env();

    let (stdout, _, success) = run_doctags(&config_path, &["taxonomy", "list"]);
    assert!(success);
    assert!(stdout.contains("Family [required]"));
    assert!(stdout.contains("Topics [optional]"));
    assert!(stdout.contains("Alice, Bob"));
}

#[test]
fn test_import_reports_count() {
    let (_tmp, config_path) = setup_test_env();
    run_doctags(&config_path, &["init"]);
    let docs = files(&config_path, "docs.json");

    let (stdout, stderr, success) = run_doctags(&config_path, &["import", &docs]);
    assert!(success, "import failed: {}", stderr);
    assert!(stdout.contains("imported documents: 3"));
}

#[test]
fn test_import_rejects_whole_batch_missing_required() {
    let (_tmp, config_path) = seeded_env();
    let batch = files(&config_path, "untagged.json");

    let (_, stderr, success) = run_doctags(&config_path, &["import", &batch]);
    assert!(!success, "batch with an untagged document must fail");
    assert!(stderr.contains("Loose scan"));
    assert!(stderr.contains("Family"));

    // d4 was valid but must not have been written either.
    let (_, _, found) = run_doctags(&config_path, &["get", "d4"]);
    assert!(!found);
}

#[test]
fn test_import_detects_duplicates() {
    let (_tmp, config_path) = seeded_env();
    let docs = files(&config_path, "docs.json");

    let (_, stderr, success) = run_doctags(&config_path, &["import", &docs]);
    assert!(!success);
    assert!(stderr.contains("duplicate"));

    let (stdout, _, success) =
        run_doctags(&config_path, &["import", &docs, "--allow-duplicates"]);
    assert!(success);
    assert!(stdout.contains("imported documents: 3"));
}

#[test]
fn test_validate_exit_status() {
    let (_tmp, config_path) = seeded_env();

    let (stdout, _, success) = run_doctags(
        &config_path,
        &["validate", &files(&config_path, "untagged.json")],
    );
    assert!(!success);
    assert!(stdout.contains("ok    Receipt"));
    assert!(stdout.contains("FAIL  Loose scan (missing: Family)"));

    let (_, _, success) =
        run_doctags(&config_path, &["validate", &files(&config_path, "docs.json")]);
    assert!(success);
}

#[test]
fn test_search_text_scores_title() {
    let (_tmp, config_path) = seeded_env();

    let (stdout, stderr, success) = run_doctags(&config_path, &["search", "invoice"]);
    assert!(success, "search failed: {}", stderr);
    assert!(stdout.contains("1. [8] Invoice #1"));
    assert!(!stdout.contains("Contract A"));
}

#[test]
fn test_search_required_and_optional_tags() {
    let (_tmp, config_path) = seeded_env();

    let (stdout, _, success) = run_doctags(&config_path, &["search", "--tag", "Family=Alice"]);
    assert!(success);
    assert!(stdout.contains("Invoice #1"));
    assert!(stdout.contains("Home insurance"));
    assert!(!stdout.contains("Contract A"));

    let (stdout, _, _) = run_doctags(
        &config_path,
        &["search", "--any", "Tax", "--any", "Insurance", "--sort", "title", "--order", "asc"],
    );
    let home = stdout.find("Home insurance").unwrap();
    let invoice = stdout.find("Invoice #1").unwrap();
    assert!(home < invoice);
}

#[test]
fn test_search_json_sorted_by_date() {
    let (_tmp, config_path) = seeded_env();

    let (stdout, _, success) = run_doctags(&config_path, &["search", "--sort", "date", "--json"]);
    assert!(success);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let ids: Vec<&str> = value["hits"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["document"]["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["d2", "d1", "d3"]);
    assert_eq!(value["stats"]["total"], 3);
}

#[test]
fn test_get_shows_buckets() {
    let (_tmp, config_path) = seeded_env();

    let (stdout, _, success) = run_doctags(&config_path, &["get", "d3"]);
    assert!(success);
    assert!(stdout.contains("Family"));
    assert!(stdout.contains("suggested: Bob"));
    assert!(stdout.contains("suggested: Renewal"));
    assert!(stdout.contains("Urgent"));
    assert!(stdout.contains("required tags: ok"));
}

#[test]
fn test_get_nonexistent() {
    let (_tmp, config_path) = seeded_env();

    let (_, stderr, success) = run_doctags(&config_path, &["get", "nope"]);
    assert!(!success);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_retag_is_gated() {
    let (_tmp, config_path) = seeded_env();

    // Deselecting Bob would leave Family empty.
    let (_, stderr, success) =
        run_doctags(&config_path, &["retag", "d2", "--select", "Family=Bob"]);
    assert!(!success);
    assert!(stderr.contains("Family"));

    let (stdout, stderr, success) = run_doctags(
        &config_path,
        &["retag", "d2", "--select", "Family=Alice", "--add", "Signed"],
    );
    assert!(success, "retag failed: {}", stderr);
    assert!(stdout.contains("tags: Alice, Signed"));
}

#[test]
fn test_tags_suggest_and_browse() {
    let (_tmp, config_path) = seeded_env();

    let (stdout, _, success) = run_doctags(&config_path, &["tags", "suggest", "al"]);
    assert!(success);
    assert_eq!(stdout.trim(), "Alice");

    let (stdout, _, success) =
        run_doctags(&config_path, &["tags", "browse", "--exclude", "Alice"]);
    assert!(success);
    assert!(!stdout.contains("Alice"));
    assert!(stdout.contains("Urgent"));

    let (stdout, _, success) = run_doctags(&config_path, &["tags", "list"]);
    assert!(success);
    assert!(stdout.contains("Alice"));
}

#[test]
fn test_taxonomy_edits() {
    let (_tmp, config_path) = seeded_env();

    let (_, _, success) = run_doctags(&config_path, &["taxonomy", "add-tag", "Family", "Carol"]);
    assert!(success);
    let (_, _, success) =
        run_doctags(&config_path, &["taxonomy", "set-required", "Topics", "true"]);
    assert!(success);
    let (_, stderr, success) = run_doctags(&config_path, &["taxonomy", "rename", "Nope", "X"]);
    assert!(!success);
    assert!(stderr.contains("not found"));

    let (stdout, _, _) = run_doctags(&config_path, &["taxonomy", "list"]);
    assert!(stdout.contains("Alice, Bob, Carol"));
    assert!(stdout.contains("Topics [required]"));
}

#[test]
fn test_saved_search_round_trip() {
    let (_tmp, config_path) = seeded_env();

    let (_, stderr, success) = run_doctags(
        &config_path,
        &["saved", "save", "alice docs", "--tag", "Family=Alice"],
    );
    assert!(success, "save failed: {}", stderr);

    let (stdout, _, success) = run_doctags(&config_path, &["saved", "list"]);
    assert!(success);
    assert!(stdout.contains("alice docs"));

    let (stdout, _, success) = run_doctags(&config_path, &["saved", "run", "alice docs"]);
    assert!(success);
    assert!(stdout.contains("Invoice #1"));
    assert!(!stdout.contains("Contract A"));

    let (_, _, success) = run_doctags(&config_path, &["saved", "delete", "alice docs"]);
    assert!(success);
    let (stdout, _, _) = run_doctags(&config_path, &["saved", "list"]);
    assert!(stdout.contains("No saved searches."));
}

#[test]
fn test_stats_counts() {
    let (_tmp, config_path) = seeded_env();

    let (stdout, _, success) = run_doctags(&config_path, &["stats"]);
    assert!(success);
    assert!(stdout.contains("Documents:   3"));
    assert!(stdout.contains("Processed:   2"));
    assert!(stdout.contains("Error:       1"));

    let (stdout, _, success) = run_doctags(&config_path, &["stats", "--type", "invoice"]);
    assert!(success);
    assert!(stdout.contains("Documents:   1"));
}

#[test]
fn test_export_writes_json() {
    let (tmp, config_path) = seeded_env();
    let out = tmp.path().join("out").join("export.json");

    let (_, stderr, success) =
        run_doctags(&config_path, &["export", "--output", out.to_str().unwrap()]);
    assert!(success, "export failed: {}", stderr);

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(value["documents"].as_array().unwrap().len(), 3);
    assert_eq!(value["tag_groups"].as_array().unwrap().len(), 2);
}

#[test]
fn test_invalid_config() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("bad.toml");
    fs::write(&config_path, "[db]\npath = \"x.sqlite\"\n[search]\ndefault_order = \"up\"\n").unwrap();

    let (_, stderr, success) = run_doctags(&config_path, &["init"]);
    assert!(!success);
    assert!(stderr.contains("default_order"));
}
