//! Tests for the forge binary.
//!
//! These tests exercise the compiled binary using assert_cmd.

use assert_cmd::Command;
use forge_extension::Extension;
use forge_test_utils::{ArchiveBuilder, TestWorkspace};
use predicates::prelude::*;

fn forge_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("forge"))
}

fn widgets() -> ArchiveBuilder {
    ArchiveBuilder::new()
        .role("widget", "com.acme.Widget")
        .type_def("widget", "mywidget", "com.acme.WidgetImpl")
}

#[test]
fn test_help_output() {
    forge_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("deploy"));
}

#[test]
fn test_inspect_text() {
    let ws = TestWorkspace::new();
    let archive = ws.library("widgets.pkg", &widgets());

    forge_cmd()
        .arg("inspect")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("com.acme.Widget"))
        .stdout(predicate::str::contains("mywidget"));
}

#[test]
fn test_inspect_json() {
    let ws = TestWorkspace::new();
    let archive = ws.library(
        "widgets.pkg",
        &widgets().provides(Extension::new("com.acme.widgets")),
    );

    let output = forge_cmd()
        .arg("inspect")
        .arg(&archive)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["available"][0]["name"], "com.acme.widgets");
    assert_eq!(report["roles"][0]["shorthand"], "widget");
    assert_eq!(report["types"][0]["kind"], "type");
    assert_eq!(report["types"][0]["name"], "mywidget");
}

#[test]
fn test_inspect_missing_archive_fails() {
    let ws = TestWorkspace::new();

    forge_cmd()
        .arg("inspect")
        .arg(ws.root().join("absent.pkg"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_deploy_json() {
    let ws = TestWorkspace::new();
    let archive = ws.library("widgets.pkg", &widgets());

    let output = forge_cmd()
        .arg("deploy")
        .arg(&archive)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let types = report["types"].as_array().unwrap();
    assert!(types.iter().any(|t| t["name"] == "mywidget"
        && t["class_name"] == "com.acme.WidgetImpl"));
}

#[test]
fn test_deploy_with_ext_path() {
    let ws = TestWorkspace::new();
    ws.extension(
        "base.pkg",
        &ArchiveBuilder::new().provides(Extension::new("com.acme.base")),
    );
    let archive = ws.library(
        "widgets.pkg",
        &widgets().requires(Extension::new("com.acme.base")),
    );

    forge_cmd()
        .arg("deploy")
        .arg(&archive)
        .arg("--ext-path")
        .arg(ws.ext_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("mywidget"));
}

#[test]
fn test_deploy_with_config_file() {
    let ws = TestWorkspace::new();
    ws.extension(
        "base.pkg",
        &ArchiveBuilder::new().provides(Extension::new("com.acme.base")),
    );
    let archive = ws.library(
        "widgets.pkg",
        &widgets().requires(Extension::new("com.acme.base")),
    );
    let config = ws.write_file("forge.toml", "[deployer]\next_path = [\"ext\"]\n");

    forge_cmd()
        .arg("deploy")
        .arg(&archive)
        .arg("--config")
        .arg(&config)
        .assert()
        .success();
}

#[test]
fn test_deploy_unsatisfied_extension_fails() {
    let ws = TestWorkspace::new();
    let archive = ws.library(
        "widgets.pkg",
        &widgets().requires(Extension::new("com.acme.missing")),
    );

    forge_cmd()
        .arg("deploy")
        .arg(&archive)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("com.acme.missing"));
}

#[test]
fn test_deploy_unknown_role_fails() {
    let ws = TestWorkspace::new();
    let archive = ws.library(
        "bogus.pkg",
        &ArchiveBuilder::new().type_def("bogus", "thing", "com.acme.Thing"),
    );

    forge_cmd()
        .arg("deploy")
        .arg(&archive)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown role"));
}
