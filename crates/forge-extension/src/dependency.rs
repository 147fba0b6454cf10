//! Transitive resolution of required extensions to dependency archives.
//!
//! Each requirement is first matched against the extensions available
//! locally. When nothing local satisfies it, the best package in the
//! repository is chosen (highest specification version, earliest discovered
//! on a tie) and that package's own requirements are resolved in turn against
//! the package's own extensions. Dependency archives are returned
//! dependency-first, each exactly once.
//!
//! # Example
//!
//! ```
//! use std::path::PathBuf;
//! use forge_extension::{DefaultPackageRepository, Extension, OptionalPackage, scan_dependencies};
//!
//! let mut repo = DefaultPackageRepository::new();
//! repo.add_package(OptionalPackage {
//!     file: PathBuf::from("/ext/xml.pkg"),
//!     available: vec![Extension::new("xml")],
//!     required: vec![],
//!     optional: vec![],
//! });
//!
//! let scan = scan_dependencies(
//!     &repo,
//!     &[PathBuf::from("/lib/app.pkg")],
//!     &[Extension::new("xml"), Extension::new("missing")],
//!     &[],
//!     &[],
//! )
//! .unwrap();
//! assert_eq!(scan.dependencies, vec![PathBuf::from("/ext/xml.pkg")]);
//! assert_eq!(scan.unsatisfied, vec![Extension::new("missing")]);
//! ```

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::extension::Extension;
use crate::repository::{OptionalPackage, PackageRepository};

/// Outcome of a dependency scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyScan {
    /// Archives that must be loaded alongside the roots, dependency-first.
    pub dependencies: Vec<PathBuf>,
    /// Required extensions nothing could satisfy, at any depth.
    pub unsatisfied: Vec<Extension>,
}

impl DependencyScan {
    /// Whether every required extension was satisfied.
    pub fn is_satisfied(&self) -> bool {
        self.unsatisfied.is_empty()
    }
}

/// Resolve the dependency archives for `roots`.
///
/// `required` and `optional` are the extensions declared by the roots;
/// `available` are the extensions the roots provide themselves. Missing
/// optional extensions are skipped. Reaching an archive that is already on
/// the resolution path (including a root) fails with
/// [`Error::DependencyCycle`].
pub fn scan_dependencies(
    repository: &dyn PackageRepository,
    roots: &[PathBuf],
    required: &[Extension],
    optional: &[Extension],
    available: &[Extension],
) -> Result<DependencyScan> {
    let mut scanner = Scanner {
        repository,
        path: roots.to_vec(),
        scan: DependencyScan::default(),
    };
    scanner.resolve(required, optional, available)?;
    Ok(scanner.scan)
}

struct Scanner<'a> {
    repository: &'a dyn PackageRepository,
    /// Archives currently being resolved, outermost first.
    path: Vec<PathBuf>,
    scan: DependencyScan,
}

impl Scanner<'_> {
    fn resolve(
        &mut self,
        required: &[Extension],
        optional: &[Extension],
        available: &[Extension],
    ) -> Result<()> {
        for extension in required {
            self.resolve_one(extension, available, true)?;
        }
        for extension in optional {
            self.resolve_one(extension, available, false)?;
        }
        Ok(())
    }

    fn resolve_one(
        &mut self,
        extension: &Extension,
        available: &[Extension],
        mandatory: bool,
    ) -> Result<()> {
        if available.iter().any(|a| a.is_compatible_with(extension)) {
            tracing::trace!("Extension {} satisfied locally", extension);
            return Ok(());
        }

        let Some(package) = self.best_candidate(extension) else {
            if mandatory {
                if !self.scan.unsatisfied.contains(extension) {
                    self.scan.unsatisfied.push(extension.clone());
                }
            } else {
                tracing::debug!("Optional extension {} not installed, skipping", extension);
            }
            return Ok(());
        };

        if self.path.contains(&package.file) {
            let mut chain = self.path.clone();
            chain.push(package.file);
            return Err(Error::DependencyCycle { chain });
        }
        if self.scan.dependencies.contains(&package.file) {
            return Ok(());
        }

        tracing::debug!(
            "Extension {} provided by {}",
            extension,
            package.file.display()
        );
        self.path.push(package.file.clone());
        self.resolve(&package.required, &package.optional, &package.available)?;
        self.path.pop();
        self.scan.dependencies.push(package.file);
        Ok(())
    }

    fn best_candidate(&self, extension: &Extension) -> Option<OptionalPackage> {
        let mut best: Option<OptionalPackage> = None;
        for candidate in self.repository.packages_providing(extension) {
            let better = match best {
                None => true,
                Some(ref current) => {
                    specification_version(&candidate, extension)
                        > specification_version(current, extension)
                }
            };
            if better {
                best = Some(candidate);
            }
        }
        best
    }
}

fn specification_version<'p>(
    package: &'p OptionalPackage,
    extension: &Extension,
) -> Option<&'p crate::version::DeweyDecimal> {
    package
        .provided(extension)
        .and_then(|e| e.specification_version.as_ref())
}
