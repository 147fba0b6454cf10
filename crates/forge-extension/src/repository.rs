//! Repositories of installed optional packages.

use std::path::PathBuf;

use crate::extension::Extension;
use crate::manifest::Manifest;
use crate::error::Result;

/// An installed archive together with the extensions its manifest declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalPackage {
    /// Location of the archive.
    pub file: PathBuf,
    /// Extensions the archive provides.
    pub available: Vec<Extension>,
    /// Extensions the archive requires.
    pub required: Vec<Extension>,
    /// Extensions the archive uses when present.
    pub optional: Vec<Extension>,
}

impl OptionalPackage {
    /// Build a package description from an archive's manifest.
    pub fn from_manifest(file: impl Into<PathBuf>, manifest: &Manifest) -> Result<Self> {
        Ok(Self {
            file: file.into(),
            available: manifest.available_extensions()?,
            required: manifest.required_extensions()?,
            optional: manifest.optional_extensions()?,
        })
    }

    /// The first available extension compatible with `required`, if any.
    pub fn provided(&self, required: &Extension) -> Option<&Extension> {
        self.available.iter().find(|e| e.is_compatible_with(required))
    }
}

/// A source of installed optional packages.
pub trait PackageRepository: Send + Sync {
    /// Every package providing an extension compatible with `required`, in
    /// discovery order.
    fn packages_providing(&self, required: &Extension) -> Vec<OptionalPackage>;
}

/// A repository holding its packages in memory.
#[derive(Debug, Clone, Default)]
pub struct DefaultPackageRepository {
    packages: Vec<OptionalPackage>,
}

impl DefaultPackageRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package. Packages are searched in insertion order.
    pub fn add_package(&mut self, package: OptionalPackage) {
        self.packages.push(package);
    }

    /// All packages in insertion order.
    pub fn packages(&self) -> &[OptionalPackage] {
        &self.packages
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl PackageRepository for DefaultPackageRepository {
    fn packages_providing(&self, required: &Extension) -> Vec<OptionalPackage> {
        self.packages
            .iter()
            .filter(|p| p.provided(required).is_some())
            .cloned()
            .collect()
    }
}
