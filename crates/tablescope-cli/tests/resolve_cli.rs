use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

const CATALOG: &str = r#"{
    "defaultSchema": "dbo",
    "tables": [
        { "schema": "dbo", "name": "Customers", "columns": [{ "name": "Id", "isPrimaryKey": true }] },
        { "schema": "dbo", "name": "Order" },
        { "schema": "sales", "name": "Users" },
        { "schema": "hr", "name": "Users" }
    ],
    "procedures": [{ "schema": "dbo", "name": "GetCustomers" }],
    "foreignKeys": [{
        "detail": { "schema": "dbo", "name": "Order" },
        "columns": ["CustomerId"],
        "master": { "schema": "dbo", "name": "Customers" },
        "masterColumns": ["Id"]
    }]
}"#;

fn write_catalog(dir: &Path) -> String {
    let path = dir.join("catalog.json");
    std::fs::write(&path, CATALOG).expect("write catalog");
    path.to_str().expect("catalog path").to_string()
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tablescope"))
        .args(args)
        .output()
        .expect("failed to execute tablescope CLI")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("invalid JSON output: {e}\nOutput was: {stdout}"))
}

#[test]
fn resolves_names_as_json() {
    let dir = tempdir().expect("temp dir");
    let catalog = write_catalog(dir.path());

    let output = run_cli(&["-C", &catalog, "-f", "json", "customer", "orders", "sales.Order"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let json = stdout_json(&output);
    assert_eq!(json["defaultSchema"], "dbo");
    let names: Vec<&str> = json["resolutions"]
        .as_array()
        .expect("resolutions")
        .iter()
        .map(|r| r["resolved"]["name"].as_str().expect("resolved name"))
        .collect();
    assert_eq!(names, vec!["Customers", "Order", "Order"]);
}

#[test]
fn ambiguous_name_exits_with_failure() {
    let dir = tempdir().expect("temp dir");
    let catalog = write_catalog(dir.path());

    let output = run_cli(&["-C", &catalog, "-f", "json", "users"]);
    assert_eq!(output.status.code(), Some(1));

    let json = stdout_json(&output);
    assert!(json["resolutions"][0].get("resolved").is_none());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Table 'users' not found"));
}

#[test]
fn pinned_schema_disambiguates() {
    let dir = tempdir().expect("temp dir");
    let catalog = write_catalog(dir.path());

    let output = run_cli(&["-C", &catalog, "-s", "hr", "-f", "json", "-c", "user"]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["defaultSchema"], "hr");
    assert_eq!(json["resolutions"][0]["resolved"]["schema"], "hr");
}

#[test]
fn resolves_procedures() {
    let dir = tempdir().expect("temp dir");
    let catalog = write_catalog(dir.path());

    let output = run_cli(&["-C", &catalog, "-f", "json", "--procedure", "getcustomers"]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["resolutions"][0]["resolved"]["kind"], "procedure");
    assert_eq!(json["resolutions"][0]["resolved"]["quoted"], "\"dbo\".\"GetCustomers\"");
}

#[test]
fn classifies_relation() {
    let dir = tempdir().expect("temp dir");
    let catalog = write_catalog(dir.path());

    let output = run_cli(&["-C", &catalog, "-f", "json", "--relation", "orders", "customer"]);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["relation"]["relation"], "manyToOne");

    let output = run_cli(&["-C", &catalog, "-f", "json", "--relation", "customer", "order"]);
    assert_eq!(stdout_json(&output)["relation"]["relation"], "oneToMany");
}

#[test]
fn table_output_lists_resolutions() {
    let dir = tempdir().expect("temp dir");
    let catalog = write_catalog(dir.path());

    let output = run_cli(&["-C", &catalog, "customer"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("dbo.Customers"));
    assert!(stdout.contains("1/1 resolved"));
}

#[test]
fn missing_catalog_is_a_config_error() {
    let output = run_cli(&["customer"]);
    assert_eq!(output.status.code(), Some(66));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no catalog given"));
}

#[test]
fn malformed_catalog_is_a_config_error() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, "{ \"tables\": 3 }").expect("write catalog");

    let output = run_cli(&["-C", path.to_str().expect("catalog path"), "customer"]);
    assert_eq!(output.status.code(), Some(66));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid catalog document"));
}
