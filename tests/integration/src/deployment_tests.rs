//! End-to-end deployment tests
//!
//! These tests exercise the complete flow: configuration file -> extension
//! discovery -> scope construction -> descriptor loading -> registration ->
//! instantiation.

use std::sync::Arc;

use forge_deployer::{Deployer, DeployerConfig, Error, TypeDeployer};
use forge_extension::{DeweyDecimal, Extension};
use forge_loader::{ClassCatalog, Delegation};
use forge_registry::{Registries, RoleRegistry, builtin_catalog};
use forge_test_utils::{ArchiveBuilder, TestWorkspace};
use pretty_assertions::assert_eq;

struct WidgetImpl;
struct Echo;

fn catalog() -> ClassCatalog {
    let mut catalog = builtin_catalog();
    catalog
        .register_role("com.acme.Widget")
        .register_class("com.acme.WidgetImpl", || WidgetImpl)
        .register_class("com.acme.Echo", || Echo);
    catalog
}

fn version(text: &str) -> DeweyDecimal {
    text.parse().unwrap()
}

/// Lays out `ext/base.pkg` providing `com.acme.base` 1.2 and
/// `lib/foo.pkg` depending on it, plus a `forge.toml` pointing at `ext/`.
fn setup_workspace() -> TestWorkspace {
    let ws = TestWorkspace::new();
    ws.extension(
        "base.pkg",
        &ArchiveBuilder::new()
            .provides(Extension::new("com.acme.base").with_specification_version(version("1.2")))
            .type_def("task", "echo", "com.acme.Echo"),
    );
    ws.library(
        "foo.pkg",
        &ArchiveBuilder::new()
            .requires(Extension::new("com.acme.base").with_specification_version(version("1.0")))
            .role("widget", "com.acme.Widget")
            .type_def("widget", "mywidget", "com.acme.WidgetImpl"),
    );
    ws.write_file("forge.toml", "[deployer]\next_path = [\"ext\"]\n");
    ws
}

fn deployer_for(ws: &TestWorkspace) -> Deployer {
    let config = DeployerConfig::from_path(&ws.root().join("forge.toml")).unwrap();
    Deployer::from_config(&config, catalog(), Registries::new()).unwrap()
}

#[test]
fn test_widget_library_end_to_end() {
    let ws = setup_workspace();
    let deployer = deployer_for(&ws);

    let deployment = deployer
        .create_deployer(&ws.lib_dir().join("foo.pkg"))
        .unwrap();
    deployment.deploy_all().unwrap();

    let instance = deployer.create_type("widget", "mywidget").unwrap();
    assert_eq!(instance.class_name(), "com.acme.WidgetImpl");
    assert!(instance.downcast::<WidgetImpl>().is_ok());
}

#[test]
fn test_dependency_precedes_archive_in_scope() {
    let ws = setup_workspace();
    let deployer = deployer_for(&ws);

    let deployment = deployer
        .create_deployer(&ws.lib_dir().join("foo.pkg"))
        .unwrap();
    let locations = deployment.scope().code_locations();
    let names: Vec<_> = locations
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["base.pkg", "foo.pkg"]);
}

#[test]
fn test_scope_deployer_sees_dependency_descriptors() {
    let ws = setup_workspace();
    let parent = deployer_for(&ws);
    let archive_deployment = parent
        .create_deployer(&ws.lib_dir().join("foo.pkg"))
        .unwrap();
    assert_eq!(archive_deployment.type_descriptors().len(), 1);

    // A child deployer keeps its own deployments, so the same scope is read
    // again, this time with every archive it can see.
    let child = parent.create_child_deployer(Registries::child_of(parent.registries()));
    let scope = Arc::clone(archive_deployment.scope());
    let scope_deployment = child.create_scope_deployer(scope).unwrap();
    assert_eq!(scope_deployment.type_descriptors().len(), 2);

    scope_deployment.deploy_all().unwrap();
    assert!(child.create_type("task", "echo").unwrap().is::<Echo>());
    assert!(parent.create_type("task", "echo").is_err());
}

#[test]
fn test_too_old_dependency_is_unsatisfied() {
    let ws = TestWorkspace::new();
    ws.extension(
        "base.pkg",
        &ArchiveBuilder::new()
            .provides(Extension::new("com.acme.base").with_specification_version(version("1.0"))),
    );
    let archive = ws.library(
        "foo.pkg",
        &ArchiveBuilder::new()
            .requires(Extension::new("com.acme.base").with_specification_version(version("2.0")))
            .requires(Extension::new("com.acme.other")),
    );
    let config = DeployerConfig {
        ext_path: vec![ws.ext_dir()],
        ..DeployerConfig::default()
    };
    let deployer = Deployer::from_config(&config, catalog(), Registries::new()).unwrap();

    let err = deployer.create_deployer(&archive).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("com.acme.base"), "{message}");
    assert!(message.contains("com.acme.other"), "{message}");
}

#[test]
fn test_child_registries_shadow_nothing_in_parent() {
    let ws = setup_workspace();
    let parent = deployer_for(&ws);
    parent
        .create_deployer(&ws.lib_dir().join("foo.pkg"))
        .unwrap()
        .deploy_all()
        .unwrap();

    let child = parent.create_child_deployer(Registries::child_of(parent.registries()));
    assert_eq!(
        child.registries().roles.resolve("widget").as_deref(),
        Some("com.acme.Widget")
    );
    let err = child
        .registries()
        .roles
        .register("com.other.Widget", "widget")
        .unwrap_err();
    assert!(err.to_string().contains("widget"));
    assert!(child.create_type("widget", "mywidget").is_ok());
}

#[test]
fn test_local_first_delegation_config() {
    let ws = setup_workspace();
    ws.write_file(
        "forge.toml",
        "[deployer]\next_path = [\"ext\"]\ndelegation = \"local-first\"\n",
    );
    let deployer = deployer_for(&ws);

    let deployment = deployer
        .create_deployer(&ws.lib_dir().join("foo.pkg"))
        .unwrap();
    assert_eq!(deployment.scope().delegation(), Delegation::LocalFirst);
    deployment.deploy_all().unwrap();
    assert!(deployer.create_type("widget", "mywidget").is_ok());
}

#[test]
fn test_role_registry_standalone() {
    let registry = forge_registry::DefaultRoleRegistry::new();
    assert!(registry.resolve("widget").is_none());
    registry.register("com.acme.Widget", "widget").unwrap();
    registry.register("com.acme.Widget", "widget").unwrap();
    assert!(registry.register("com.acme.Gadget", "widget").is_err());
}

#[test]
fn test_incompatible_descriptor_leaves_registries_untouched() {
    let ws = TestWorkspace::new();
    let archive = ws.library(
        "future.pkg",
        &ArchiveBuilder::new()
            .descriptor_version("2.0.0")
            .role("widget", "com.acme.Widget"),
    );
    let deployer = Deployer::from_config(&DeployerConfig::default(), catalog(), Registries::new())
        .unwrap();

    let err = deployer.create_deployer(&archive).unwrap_err();
    assert!(matches!(err, Error::IncompatibleVersion { .. }), "{err:?}");
    assert!(deployer.registries().roles.resolve("widget").is_none());
}
