//! Scope construction against installed optional packages.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use forge_extension::{DeweyDecimal, Extension};
use forge_loader::{ClassCatalog, Delegation, Error, LoadingScope, ScopeManager, scan_extension_dirs};
use forge_test_utils::{ArchiveBuilder, TestWorkspace};
use pretty_assertions::assert_eq;

fn manager_for(ws: &TestWorkspace) -> ScopeManager {
    let repository =
        scan_extension_dirs(&[ws.ext_dir()], &["pkg".to_string(), "zip".to_string()]).unwrap();
    ScopeManager::new(
        Arc::new(LoadingScope::root(ClassCatalog::new())),
        Arc::new(repository),
        Delegation::default(),
    )
}

fn canonical(path: &PathBuf) -> PathBuf {
    dunce::canonicalize(path).unwrap()
}

#[test]
fn test_archive_without_requirements_ends_with_itself() {
    let ws = TestWorkspace::new();
    let lib = ws.library("plain.pkg", &ArchiveBuilder::new());
    ws.extension("unused.pkg", &ArchiveBuilder::new().provides(Extension::new("unused")));

    let scope = manager_for(&ws).create_scope(&lib).unwrap();
    assert_eq!(scope.code_locations(), vec![canonical(&lib)]);
}

#[test]
fn test_transitive_dependencies_come_first() {
    let ws = TestWorkspace::new();
    let base = ws.extension(
        "base.pkg",
        &ArchiveBuilder::new().provides(Extension::new("base")),
    );
    let mid = ws.extension(
        "mid.pkg",
        &ArchiveBuilder::new()
            .provides(Extension::new("mid"))
            .requires(Extension::new("base")),
    );
    let lib = ws.library(
        "app.pkg",
        &ArchiveBuilder::new().requires(Extension::new("mid")),
    );

    let scope = manager_for(&ws).create_scope(&lib).unwrap();
    assert_eq!(
        scope.code_locations(),
        vec![canonical(&base), canonical(&mid), canonical(&lib)]
    );
}

#[test]
fn test_unsatisfied_extensions_are_all_reported() {
    let ws = TestWorkspace::new();
    let lib = ws.library(
        "app.pkg",
        &ArchiveBuilder::new()
            .requires(
                Extension::new("com.acme.xml")
                    .with_specification_version(DeweyDecimal::parse("2.0").unwrap())
                    .with_implementation_vendor_id("com.acme"),
            )
            .requires(Extension::new("com.acme.log")),
    );

    let err = manager_for(&ws).create_scope(&lib).unwrap_err();
    match &err {
        Error::UnsatisfiedExtensions { extensions } => {
            let names: Vec<&str> = extensions.iter().map(|e| e.name.as_str()).collect();
            assert_eq!(names, vec!["com.acme.xml", "com.acme.log"]);
        }
        other => panic!("expected unsatisfied extensions, got {other:?}"),
    }
    let message = err.to_string();
    assert!(message.contains("com.acme.xml (vendor com.acme, version 2.0)"));
    assert!(message.contains("com.acme.log"));
}

#[test]
fn test_too_old_package_does_not_satisfy() {
    let ws = TestWorkspace::new();
    ws.extension(
        "xml.pkg",
        &ArchiveBuilder::new().provides(
            Extension::new("xml").with_specification_version(DeweyDecimal::parse("1.0").unwrap()),
        ),
    );
    let lib = ws.library(
        "app.pkg",
        &ArchiveBuilder::new().requires(
            Extension::new("xml").with_specification_version(DeweyDecimal::parse("1.5").unwrap()),
        ),
    );

    assert!(matches!(
        manager_for(&ws).create_scope(&lib),
        Err(Error::UnsatisfiedExtensions { .. })
    ));
}

#[test]
fn test_missing_optional_extension_is_fine() {
    let ws = TestWorkspace::new();
    let lib = ws.library(
        "app.pkg",
        &ArchiveBuilder::new().optionally(Extension::new("turbo")),
    );
    let scope = manager_for(&ws).create_scope(&lib).unwrap();
    assert_eq!(scope.code_locations(), vec![canonical(&lib)]);
}

#[test]
fn test_neighbors_satisfy_each_other() {
    let ws = TestWorkspace::new();
    let api = ws.library(
        "api.pkg",
        &ArchiveBuilder::new().provides(Extension::new("api")),
    );
    let app = ws.library(
        "app.pkg",
        &ArchiveBuilder::new().requires(Extension::new("api")),
    );

    let manager = manager_for(&ws);
    assert!(manager.create_scope(&app).is_err());

    let scope = manager
        .create_scope_for_files(&[app.clone(), api.clone()])
        .unwrap();
    assert_eq!(scope.code_locations(), vec![canonical(&app), canonical(&api)]);
}

#[test]
fn test_dependency_cycle_fails() {
    let ws = TestWorkspace::new();
    ws.extension(
        "one.pkg",
        &ArchiveBuilder::new()
            .provides(Extension::new("one"))
            .requires(Extension::new("two")),
    );
    ws.extension(
        "two.pkg",
        &ArchiveBuilder::new()
            .provides(Extension::new("two"))
            .requires(Extension::new("one")),
    );
    let lib = ws.library(
        "app.pkg",
        &ArchiveBuilder::new().requires(Extension::new("one")),
    );

    let err = manager_for(&ws).create_scope(&lib).unwrap_err();
    assert!(err.to_string().contains("dependency cycle"), "{err}");
}

#[test]
fn test_concurrent_create_scope_returns_one_scope() {
    let ws = TestWorkspace::new();
    let lib = ws.library("foo.pkg", &ArchiveBuilder::new());
    let manager = Arc::new(manager_for(&ws));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let manager = Arc::clone(&manager);
            let lib = lib.clone();
            thread::spawn(move || manager.create_scope(&lib).unwrap())
        })
        .collect();
    let scopes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(scopes.iter().all(|s| Arc::ptr_eq(s, &scopes[0])));
}
