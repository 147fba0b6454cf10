//! The Loading-Scope Manager.
//!
//! Builds one [`LoadingScope`] per archive (or archive set) and caches it by
//! canonical path. Before a scope is built, the extensions required by the
//! archive manifests are resolved against the installed optional packages;
//! the resulting dependency archives come first in the scope's search order.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use forge_extension::{PackageRepository, scan_dependencies};

use crate::archive::Archive;
use crate::cache::KeyedCache;
use crate::error::{Error, Result};
use crate::scope::{Delegation, LoadingScope};

pub struct ScopeManager {
    base: Arc<LoadingScope>,
    repository: Arc<dyn PackageRepository>,
    delegation: Delegation,
    archives: KeyedCache<PathBuf, Archive>,
    scopes: KeyedCache<Vec<PathBuf>, LoadingScope>,
}

impl ScopeManager {
    /// Create a manager whose scopes delegate to `base`.
    pub fn new(
        base: Arc<LoadingScope>,
        repository: Arc<dyn PackageRepository>,
        delegation: Delegation,
    ) -> Self {
        Self {
            base,
            repository,
            delegation,
            archives: KeyedCache::new(),
            scopes: KeyedCache::new(),
        }
    }

    /// The scope every archive scope delegates to.
    pub fn base(&self) -> &Arc<LoadingScope> {
        &self.base
    }

    /// The scope for a single archive.
    pub fn create_scope(&self, archive: &Path) -> Result<Arc<LoadingScope>> {
        self.create_scope_for_files(&[archive.to_path_buf()])
    }

    /// One scope over a set of archives that may satisfy each other's
    /// extension requirements.
    pub fn create_scope_for_files(&self, files: &[PathBuf]) -> Result<Arc<LoadingScope>> {
        let key = files
            .iter()
            .map(|f| canonical(f))
            .collect::<Result<Vec<_>>>()?;
        self.scopes
            .get_or_try_insert_with(key.clone(), || self.build_scope(&key))
    }

    fn build_scope(&self, files: &[PathBuf]) -> Result<LoadingScope> {
        let mut archives = Vec::with_capacity(files.len());
        let mut available = Vec::new();
        let mut required = Vec::new();
        let mut optional = Vec::new();

        for file in files {
            let archive = self.archive(file)?;
            let package = archive.package()?;
            available.extend(package.available);
            required.extend(package.required);
            optional.extend(package.optional);
            archives.push(archive);
        }

        let scan = scan_dependencies(
            self.repository.as_ref(),
            files,
            &required,
            &optional,
            &available,
        )?;
        if !scan.is_satisfied() {
            return Err(Error::UnsatisfiedExtensions {
                extensions: scan.unsatisfied,
            });
        }

        let mut locations = Vec::with_capacity(scan.dependencies.len() + archives.len());
        for dependency in &scan.dependencies {
            locations.push(self.archive(dependency)?);
        }
        locations.extend(archives);

        let scope = LoadingScope::new(locations, Some(&self.base), self.delegation);
        tracing::debug!(
            "Created {} over {} archive(s) ({} dependency)",
            scope.id(),
            scope.archives().len(),
            scan.dependencies.len()
        );
        Ok(scope)
    }

    fn archive(&self, path: &Path) -> Result<Arc<Archive>> {
        self.archives
            .get_or_try_insert_with(path.to_path_buf(), || Archive::open(path))
    }
}

fn canonical(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(Error::ArchiveNotFound {
            path: path.to_path_buf(),
        });
    }
    if path.is_dir() {
        return Err(Error::IsDirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(dunce::canonicalize(path)?)
}
