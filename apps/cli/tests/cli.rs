use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn templates_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates")
}

fn blocks() -> Command {
    let mut cmd = Command::cargo_bin("blocks").unwrap();
    cmd.env_remove("BLOCKS_TEMPLATES_DIR");
    cmd
}

#[test]
fn no_arguments_prints_help() {
    blocks().assert().failure().stderr(predicate::str::contains("Usage"));
}

#[test]
fn version_as_text_and_json() {
    blocks().arg("version").assert().success().stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));

    let output = blocks().args(["version", "--json"]).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["builtAt"].is_string());
    assert!(json["platform"].as_str().unwrap().contains('/'));
}

#[test]
fn lists_bundled_templates() {
    blocks()
        .args(["scaffold", "list", "--templates-dir"])
        .arg(templates_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("axum-service"))
        .stdout(predicate::str::contains("ModulePath (required)"));
}

#[test]
fn empty_template_dir_lists_nothing() {
    let empty = TempDir::new().unwrap();
    blocks()
        .current_dir(empty.path())
        .args(["scaffold", "list", "--templates-dir"])
        .arg(empty.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("No templates found.")
                .or(predicate::str::contains("Available templates")),
        );
}

#[test]
fn scaffolds_axum_service() {
    let work = TempDir::new().unwrap();
    let out = work.path().join("order-service");

    blocks()
        .current_dir(work.path())
        .args(["scaffold", "new", "order-service", "-t", "axum-service", "-m", "github.com/acme/orders"])
        .args(["--var", "Port=9090", "--templates-dir"])
        .arg(templates_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("Project 'order-service' created"));

    let cargo = fs::read_to_string(out.join("Cargo.toml")).unwrap();
    assert!(cargo.contains("name = \"order-service\""));
    assert!(cargo.contains("https://github.com/acme/orders"));

    let main = fs::read_to_string(out.join("src/main.rs")).unwrap();
    assert!(main.contains("const PORT: u16 = 9090;"));
    assert!(!main.contains("{{"));

    assert!(out.join("README.md").is_file());
    assert!(out.join(".gitignore").is_file());
    assert!(!out.join("template.yaml").exists());
}

#[test]
fn refuses_non_empty_output_without_force() {
    let work = TempDir::new().unwrap();
    let out = work.path().join("taken");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("keep.txt"), "x").unwrap();

    let new = |force: bool| {
        let mut cmd = blocks();
        cmd.args(["scaffold", "new", "taken", "-t", "axum-service", "-o"])
            .arg(&out)
            .arg("--templates-dir")
            .arg(templates_dir());
        if force {
            cmd.arg("--force");
        }
        cmd
    };

    new(false).assert().failure().stderr(predicate::str::contains("--force"));
    assert!(out.join("keep.txt").exists());

    new(true).assert().success();
    assert!(!out.join("keep.txt").exists());
    assert!(out.join("Cargo.toml").exists());
}

#[test]
fn unknown_template_is_reported() {
    let work = TempDir::new().unwrap();
    blocks()
        .current_dir(work.path())
        .args(["scaffold", "new", "x", "-t", "no-such-template"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Template not found"));
}

#[test]
fn malformed_var_is_rejected() {
    blocks()
        .args(["scaffold", "new", "x", "-t", "axum-service", "--var", "oops"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));
}
