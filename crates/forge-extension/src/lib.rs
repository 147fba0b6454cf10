//! Optional-package model for Forge type libraries.
//!
//! Archives declare the extensions they provide and the extensions they need
//! in their manifest. This crate parses those declarations, decides whether
//! an available extension satisfies a requirement, and resolves the full set
//! of dependency archives a library needs before it can be loaded.

pub mod dependency;
pub mod error;
pub mod extension;
pub mod manifest;
pub mod repository;
pub mod version;

/// The archive entry holding the manifest.
pub const MANIFEST_ENTRY: &str = "META-INF/MANIFEST.MF";

pub use dependency::{DependencyScan, scan_dependencies};
pub use error::{Error, Result};
pub use extension::{Compatibility, Extension};
pub use manifest::{Attributes, Manifest};
pub use repository::{DefaultPackageRepository, OptionalPackage, PackageRepository};
pub use version::DeweyDecimal;
