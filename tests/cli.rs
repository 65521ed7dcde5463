//! Exit status and output formats of the `ftt` binary

use std::path::PathBuf;
use std::process::Command;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn ftt(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_ftt"))
        .args(args)
        .output()
        .expect("binary to run")
}

#[test]
fn test_json_output() {
    let path = fixture("smith-family.ftt");
    let output = ftt(&[path.to_str().unwrap()]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["headers"]["HEAD_TITLE"], "The Smith Family");
    assert_eq!(json["records"]["SMITH-1"]["definitionLine"], 8);
}

#[test]
fn test_summary_output() {
    let path = fixture("smith-family.ftt");
    let output = ftt(&[path.to_str().unwrap(), "--format", "summary"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("records: 5 individual(s), 1 source(s), 1 event(s)"));
    assert!(stdout.contains("warning[WARN_VOCAB_NONSTANDARD]"));
}

#[test]
fn test_yaml_output() {
    let path = fixture("smith-family.ftt");
    let output = ftt(&[path.to_str().unwrap(), "--format", "yaml"]);
    assert!(output.status.success());

    let yaml: serde_yaml::Value = serde_yaml::from_slice(&output.stdout).unwrap();
    assert_eq!(yaml["headers"]["HEAD_FORMAT"].as_str(), Some("FTT v0.1"));
}

#[test]
fn test_fatal_exit_status() {
    let path = fixture("ghost-child.ftt");
    let output = ftt(&[path.to_str().unwrap(), "--format", "summary"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("fatal[ERR_GHOST_CHILD]"));
}

#[test]
fn test_lenient_flag() {
    let path = fixture("duplicate-id.ftt");
    assert_eq!(ftt(&[path.to_str().unwrap()]).status.code(), Some(1));

    let output = ftt(&[path.to_str().unwrap(), "--lenient", "--format", "summary"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("error[ERR_ID_DUPLICATE_IGNORED]"));
}

#[test]
fn test_missing_file_exit_status() {
    let output = ftt(&["/definitely/not/here.ftt"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_missing_config_file_is_named() {
    let path = fixture("smith-family.ftt");
    let output = ftt(&[path.to_str().unwrap(), "--config", "/definitely/not/here.toml"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr)
        .contains("config file '/definitely/not/here.toml' does not exist"));
}

#[test]
fn test_config_file_is_layered() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("ftt.toml");
    std::fs::write(&config, "[output]\nformat = \"summary\"\n").unwrap();

    let path = fixture("smith-family.ftt");
    let output = ftt(&[path.to_str().unwrap(), "--config", config.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("records: "));
}
