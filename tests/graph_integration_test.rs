//! Integration tests for the schema-erd binary.

use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn get_binary_path() -> String {
    std::env::var("CARGO_BIN_EXE_schema-erd")
        .unwrap_or_else(|_| "target/debug/schema-erd".to_string())
}

fn create_test_schema(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("shop.yaml");
    fs::write(
        &path,
        r#"
entities:
  - name: Country
    fields:
      - { name: country_id, type: integer, primary_key: true }
      - { name: name, type: string }
    relations:
      - { name: brands, target: Brand, many: true }
  - name: Brand
    fields:
      - { name: brand_id, type: integer, primary_key: true }
      - { name: name, type: string }
      - { name: headquarters_country_id, type: integer, foreign_key: Country.country_id }
    relations:
      - { name: country, target: Country, back_populates: brands }
  - name: Category
    fields:
      - { name: category_id, type: integer, primary_key: true }
      - { name: parent_id, type: integer, nullable: true, foreign_key: Category.category_id }
"#,
    )
    .unwrap();
    path
}

#[test]
fn test_graph_textual_formats_from_catalog() {
    let dir = TempDir::new().unwrap();

    let output = Command::new(get_binary_path())
        .current_dir(dir.path())
        .args([
            "graph",
            "--out-dir",
            "erd",
            "--format",
            "dot,mermaid,json,html",
        ])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let base = dir.path().join("erd").join("sustainable_ecommerce_erd");
    for ext in ["dot", "mmd", "json", "html"] {
        assert!(base.with_extension(ext).exists(), "missing .{}", ext);
    }

    let dot = fs::read_to_string(base.with_extension("dot")).unwrap();
    assert!(dot.contains("digraph ERD"));
    assert!(dot.contains("ProductCategory:parent_category_id -> ProductCategory:category_id"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(base.with_extension("json")).unwrap()).unwrap();
    assert_eq!(json["stats"]["entity_count"], 17);
    assert_eq!(json["stats"]["relationship_count"], 20);
    assert_eq!(json["stats"]["association_count"], 4);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERD: 17 entities, 107 fields, 20 relationships"));
}

#[test]
fn test_graph_schema_document_to_stdout() {
    let dir = TempDir::new().unwrap();
    let schema = create_test_schema(&dir);

    let output = Command::new(get_binary_path())
        .args([
            "graph",
            "--schema",
            schema.to_str().unwrap(),
            "--format",
            "mermaid",
            "--stdout",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("erDiagram"));
    assert!(stdout.contains("Brand }o--|| Country : \"country\""));
    assert!(stdout.contains("Category }o--|| Category : \"parent_id\""));
}

#[test]
fn test_graph_stdout_rejects_binary_format() {
    let output = Command::new(get_binary_path())
        .args(["graph", "--format", "png", "--stdout"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot be printed to stdout"));
}

#[test]
fn test_graph_focus_table() {
    let output = Command::new(get_binary_path())
        .args([
            "graph",
            "--format",
            "dot",
            "--stdout",
            "--table",
            "Brand",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Brand:headquarters_country_id -> Country:country_id"));
    assert!(stdout.contains("Product:brand_id -> Brand:brand_id"));
    assert!(!stdout.contains("  User [label="));
}

#[test]
fn test_graph_cycles_only() {
    let output = Command::new(get_binary_path())
        .args(["graph", "--format", "json", "--stdout", "--cycles-only"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["stats"]["entity_count"], 1);
    assert_eq!(json["entities"][0]["name"], "ProductCategory");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Cycles detected (1)"));
}

#[test]
fn test_graph_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("erd.yaml");
    fs::write(
        &config,
        "basename: shop\nformats: [json]\nexclude: [\"Performance*\", \"DatabaseAuditLog\"]\n",
    )
    .unwrap();

    let status = Command::new(get_binary_path())
        .args([
            "graph",
            "--config",
            config.to_str().unwrap(),
            "--out-dir",
            dir.path().to_str().unwrap(),
        ])
        .status()
        .unwrap();

    assert!(status.success());
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("shop.json")).unwrap()).unwrap();
    assert_eq!(json["stats"]["entity_count"], 15);
}

#[test]
fn test_graph_unknown_entity_fails() {
    let dir = TempDir::new().unwrap();
    let schema = dir.path().join("broken.yaml");
    fs::write(
        &schema,
        "entities:\n  - name: Brand\n    fields:\n      - { name: brand_id, type: integer, primary_key: true }\n      - { name: country_id, type: integer, foreign_key: Country.country_id }\n",
    )
    .unwrap();

    let output = Command::new(get_binary_path())
        .args([
            "graph",
            "--schema",
            schema.to_str().unwrap(),
            "--out-dir",
            dir.path().to_str().unwrap(),
            "--format",
            "dot",
        ])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown entity 'Country' (referenced by Brand.country_id)"));
    // No partial diagram is written
    assert!(!dir.path().join("sustainable_ecommerce_erd.dot").exists());
}

#[test]
fn test_list_json() {
    let output = Command::new(get_binary_path())
        .args(["list", "--json", "--dependency-order"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entities = json["entities"].as_array().unwrap();
    assert_eq!(entities.len(), 17);
    assert_eq!(entities[0]["name"], "User");

    let category = entities
        .iter()
        .find(|e| e["name"] == "ProductCategory")
        .unwrap();
    assert_eq!(category["self_referential"], true);
}

#[test]
fn test_check_catalog() {
    let output = Command::new(get_binary_path())
        .args(["check", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["valid"], true);
    assert_eq!(json["relationships"], 20);
    assert_eq!(json["bidirectional"], 18);
    assert_eq!(json["self_references"][0], "ProductCategory");
}

#[test]
fn test_check_inconsistent_back_reference() {
    let dir = TempDir::new().unwrap();
    let schema = dir.path().join("bad.yaml");
    fs::write(
        &schema,
        r#"
entities:
  - name: Country
    fields:
      - { name: country_id, type: integer, primary_key: true }
    relations:
      - { name: brands, target: Country, many: true }
  - name: Brand
    fields:
      - { name: brand_id, type: integer, primary_key: true }
      - { name: country_id, type: integer, foreign_key: Country.country_id }
    relations:
      - { name: country, target: Country, back_populates: brands }
"#,
    )
    .unwrap();

    let output = Command::new(get_binary_path())
        .args(["check", "--schema", schema.to_str().unwrap(), "--json"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["valid"], false);
    assert!(json["error"].as_str().unwrap().contains("Country.brands"));
}

#[test]
fn test_schema_command_lists_outputs() {
    let output = Command::new(get_binary_path())
        .args(["schema", "--list"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["check", "graph", "list"]);
}

#[test]
fn test_completions() {
    let output = Command::new(get_binary_path())
        .args(["completions", "bash"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("schema-erd"));
}
