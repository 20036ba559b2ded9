//! Integration tests for the cdg CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use common::{document_xml, receipt_template, valid_request, write_template};

/// Helper to get a cdg command isolated from the user's environment
fn cdg(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cdg").unwrap();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("PORT")
        .env_remove("CDG_TEMPLATES_DIR")
        .env_remove("CDG_DEFAULT_TEMPLATE")
        .env_remove("CDG_MAX_UPLOAD_BYTES")
        .env_remove("CDG_ALLOWED_ORIGINS")
        .env_remove("CDG_LOG_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

/// Temp dir holding a `templates/` dir and a valid `request.json`
fn setup_workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let templates = tmp.path().join("templates");
    fs::create_dir(&templates).unwrap();
    write_template(&templates, "recibo_predial.docx", &receipt_template());
    write_request(tmp.path(), "request.json", &valid_request());
    tmp
}

fn write_request(dir: &Path, name: &str, value: &serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
    path
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    cdg(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("templates"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    cdg(tmp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cdg"));
}

#[test]
fn test_unknown_command_fails() {
    let tmp = TempDir::new().unwrap();
    cdg(tmp.path()).arg("frobnicate").assert().failure();
}

// ============================================================================
// Validate Command Tests
// ============================================================================

#[test]
fn test_validate_valid_file() {
    let tmp = setup_workspace();
    cdg(tmp.path())
        .current_dir(tmp.path())
        .args(["validate", "request.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"))
        .stdout(predicate::str::contains("1 property record"));
}

#[test]
fn test_validate_reports_violations() {
    let tmp = setup_workspace();
    let mut request = valid_request();
    request["predio"][0]["folio"] = serde_json::json!(-1);
    request["predio"][0]["clave_catastral"] = serde_json::json!("ABC");
    write_request(tmp.path(), "bad.json", &request);

    cdg(tmp.path())
        .current_dir(tmp.path())
        .args(["validate", "bad.json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("2 error(s)"))
        .stdout(predicate::str::contains("predio.0.folio"))
        .stdout(predicate::str::contains("RangeViolation"))
        .stdout(predicate::str::contains("predio.0.clave_catastral"))
        .stdout(predicate::str::contains("PatternViolation"));
}

#[test]
fn test_validate_json_format() {
    let tmp = setup_workspace();
    let mut request = valid_request();
    request["predio"][0].as_object_mut().unwrap().remove("folio");
    write_request(tmp.path(), "bad.json", &request);

    let output = cdg(tmp.path())
        .current_dir(tmp.path())
        .args(["validate", "bad.json", "--format", "json"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["valid"], false);
    assert_eq!(report["violations"][0]["path"], "predio.0.folio");
    assert_eq!(report["violations"][0]["kind"], "MissingField");
}

#[test]
fn test_validate_malformed_json() {
    let tmp = setup_workspace();
    fs::write(tmp.path().join("broken.json"), "{\"archivo\": }").unwrap();

    cdg(tmp.path())
        .current_dir(tmp.path())
        .args(["validate", "broken.json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("MalformedInput"));
}

#[test]
fn test_validate_missing_file() {
    let tmp = TempDir::new().unwrap();
    cdg(tmp.path())
        .current_dir(tmp.path())
        .args(["validate", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_validate_print_schema() {
    let tmp = TempDir::new().unwrap();
    cdg(tmp.path())
        .args(["validate", "--print-schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("clave_catastral"))
        .stdout(predicate::str::contains("exclusiveMinimum"));
}

// ============================================================================
// Render Command Tests
// ============================================================================

#[test]
fn test_render_writes_normalized_name() {
    let tmp = setup_workspace();
    cdg(tmp.path())
        .current_dir(tmp.path())
        .args(["render", "request.json", "--templates-dir", "templates"])
        .assert()
        .success()
        .stdout(predicate::str::contains("recibo.docx"));

    let output = fs::read(tmp.path().join("recibo.docx")).unwrap();
    let xml = document_xml(&output);
    assert!(xml.contains("Folio 7: Juan Pérez"));
    assert!(xml.contains("Suma $1,830.25"));
}

#[test]
fn test_render_output_flag() {
    let tmp = setup_workspace();
    let out = tmp.path().join("salida.docx");

    cdg(tmp.path())
        .current_dir(tmp.path())
        .args(["render", "request.json", "--templates-dir", "templates", "--output"])
        .arg(&out)
        .assert()
        .success();

    assert!(out.exists());
    assert!(!tmp.path().join("recibo.docx").exists());
}

#[test]
fn test_render_template_from_env() {
    let tmp = setup_workspace();
    let templates = tmp.path().join("templates");
    write_template(
        &templates,
        "constancia.docx",
        &common::docx_with_paragraphs(&["Constancia {{ predio.0.folio }}"]),
    );

    cdg(tmp.path())
        .current_dir(tmp.path())
        .env("CDG_TEMPLATES_DIR", &templates)
        .args(["render", "request.json", "--template", "constancia"])
        .assert()
        .success();

    let xml = document_xml(&fs::read(tmp.path().join("recibo.docx")).unwrap());
    assert!(xml.contains("Constancia 7"));
}

#[test]
fn test_render_missing_template_fails() {
    let tmp = setup_workspace();
    cdg(tmp.path())
        .current_dir(tmp.path())
        .args(["render", "request.json", "--templates-dir", "templates", "--template", "otra"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Template not found: otra.docx"));

    assert!(!tmp.path().join("recibo.docx").exists());
}

#[test]
fn test_render_invalid_request_writes_nothing() {
    let tmp = setup_workspace();
    let mut request = valid_request();
    request["predio"] = serde_json::json!([]);
    write_request(tmp.path(), "empty.json", &request);

    cdg(tmp.path())
        .current_dir(tmp.path())
        .args(["render", "empty.json", "--templates-dir", "templates"])
        .assert()
        .failure();

    assert!(!tmp.path().join("recibo.docx").exists());
}

#[test]
fn test_render_bundled_template() {
    let tmp = setup_workspace();
    let bundled = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");

    cdg(tmp.path())
        .current_dir(tmp.path())
        .args(["render", "request.json", "--templates-dir"])
        .arg(&bundled)
        .assert()
        .success();

    let xml = document_xml(&fs::read(tmp.path().join("recibo.docx")).unwrap());
    assert!(xml.contains("Juan Pérez"));
    assert!(xml.contains("123-45-678-90-12-AB1"));
    assert!(xml.contains("$150,000.00"));
    assert!(xml.contains("120.50 m²"));
    assert!(!xml.contains("{{"));
    assert!(!xml.contains("{%"));
}

// ============================================================================
// Templates Command and Configuration Tests
// ============================================================================

#[test]
fn test_templates_lists_directory() {
    let tmp = setup_workspace();
    cdg(tmp.path())
        .current_dir(tmp.path())
        .args(["templates", "--templates-dir", "templates"])
        .assert()
        .success()
        .stdout(predicate::str::contains("recibo_predial.docx"))
        .stdout(predicate::str::contains("yes"));
}

#[test]
fn test_templates_json_format() {
    let tmp = setup_workspace();
    let output = cdg(tmp.path())
        .current_dir(tmp.path())
        .args(["templates", "--templates-dir", "templates", "--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let listing: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listing["default"], "recibo_predial.docx");
    assert_eq!(listing["templates"], serde_json::json!(["recibo_predial.docx"]));
}

#[test]
fn test_config_file_sets_templates_dir() {
    let tmp = setup_workspace();
    let config = tmp.path().join("cdg.yaml");
    fs::write(
        &config,
        format!(
            "templates_dir: {}\ndefault_template: otra.docx\n",
            tmp.path().join("templates").display()
        ),
    )
    .unwrap();

    let output = cdg(tmp.path())
        .args(["templates", "--format", "json", "--config"])
        .arg(&config)
        .output()
        .unwrap();

    assert!(output.status.success());
    let listing: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listing["default"], "otra.docx");
    assert_eq!(listing["templates"], serde_json::json!(["recibo_predial.docx"]));
}

#[test]
fn test_invalid_config_is_rejected() {
    let tmp = setup_workspace();
    let config = tmp.path().join("cdg.yaml");
    fs::write(&config, "max_upload_bytes: 0\n").unwrap();

    cdg(tmp.path())
        .current_dir(tmp.path())
        .args(["templates", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_upload_bytes"));
}

#[test]
fn test_unknown_config_key_is_rejected() {
    let tmp = setup_workspace();
    let config = tmp.path().join("cdg.yaml");
    fs::write(&config, "puerto: 80\n").unwrap();

    cdg(tmp.path())
        .current_dir(tmp.path())
        .args(["templates", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config file"));
}
