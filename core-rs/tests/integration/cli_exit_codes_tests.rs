//! Integration tests for the crm-import binary
//!
//! Each test runs the binary in its own temporary directory and checks the
//! exit status together with what it printed.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_crm-import");

fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(BIN)
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run crm-import")
}

fn write_settings(dir: &Path, identity: &str, input_file: &str, base_url: &str) {
    let yaml = format!(
        "authentication:\n  key_identity: '{}'\n  key_credential: 'secret'\nrdf:\n  input_file: '{}'\ndebug:\n  verbose: false\napi:\n  base_url: '{}'\n  timeout_secs: 2\n",
        identity, input_file, base_url
    );
    fs::write(dir.join("config.yaml"), yaml).unwrap();
}

const DOCUMENT: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#">
  <rdf:Description rdf:about="http://example.org/object/1">
    <rdfs:label>Item One</rdfs:label>
  </rdf:Description>
</rdf:RDF>
"#;

#[test]
fn test_missing_settings_writes_template() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_in(temp_dir.path(), &[]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Created config.yaml file."), "stdout: {}", stdout);

    let template = fs::read_to_string(temp_dir.path().join("config.yaml")).unwrap();
    assert!(template.contains("key_identity"));
    assert!(template.contains("input_file"));
    assert!(template.contains("verbose: true"));
}

#[test]
fn test_bootstrap_points_at_legacy_ini() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("config.ini"),
        "[Authentication]\nkey_identity = abc\nkey_credential = def\n",
    )
    .unwrap();

    let output = run_in(temp_dir.path(), &[]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Found config.ini"), "stdout: {}", stdout);
    assert!(stdout.contains("[Authentication]"));
    assert!(temp_dir.path().join("config.yaml").is_file());
}

#[test]
fn test_help_mentions_ini_settings() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_in(temp_dir.path(), &["--help"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("config.ini"));
}

#[test]
fn test_custom_settings_path_is_bootstrapped() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_in(temp_dir.path(), &["--config", "settings.yaml"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(temp_dir.path().join("settings.yaml").is_file());
    assert!(!temp_dir.path().join("config.yaml").exists());
}

#[test]
fn test_template_run_reports_missing_keys() {
    let temp_dir = TempDir::new().unwrap();

    // first run writes the template, second run reads it back unfilled
    run_in(temp_dir.path(), &[]);
    let output = run_in(temp_dir.path(), &[]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Authentication variables must be set"), "stderr: {}", stderr);
}

#[test]
fn test_missing_input_file() {
    let temp_dir = TempDir::new().unwrap();
    write_settings(temp_dir.path(), "id", "absent.rdf", "http://127.0.0.1:9/api");

    let output = run_in(temp_dir.path(), &[]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("input_file does not exist."), "stderr: {}", stderr);
}

#[test]
fn test_unparseable_settings() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("config.yaml"), "authentication: [unclosed").unwrap();

    let output = run_in(temp_dir.path(), &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn test_unreachable_catalog_aborts() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("objects.rdf"), DOCUMENT).unwrap();
    // nothing listens on the discard port
    write_settings(temp_dir.path(), "id", "objects.rdf", "http://127.0.0.1:9/api");

    let output = run_in(temp_dir.path(), &[]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Import aborted"), "stderr: {}", stderr);
}

#[test]
fn test_version_output() {
    let temp_dir = TempDir::new().unwrap();

    let output = run_in(temp_dir.path(), &["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("crm-import") && stdout.contains(env!("CARGO_PKG_VERSION")));
    assert!(!temp_dir.path().join("config.yaml").exists());
}
