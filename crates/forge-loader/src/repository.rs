//! Discovery of installed optional packages.

use std::fs;
use std::path::PathBuf;

use forge_extension::DefaultPackageRepository;

use crate::archive::Archive;
use crate::error::Result;

/// Read every archive in `dirs` whose file extension is one of
/// `file_extensions` into a package repository.
///
/// Directories are not searched recursively. Archives are added sorted by
/// path within each directory, directories in the order given. A missing
/// directory is skipped with a warning; an unreadable archive is an error.
pub fn scan_extension_dirs(
    dirs: &[PathBuf],
    file_extensions: &[String],
) -> Result<DefaultPackageRepository> {
    let mut repository = DefaultPackageRepository::new();

    for dir in dirs {
        if !dir.is_dir() {
            tracing::warn!("Extension directory {} does not exist, skipping", dir.display());
            continue;
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let matches = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| file_extensions.iter().any(|f| f.eq_ignore_ascii_case(e)));
            if matches && path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        for file in files {
            let canonical = dunce::canonicalize(&file)?;
            let package = Archive::open(&canonical)?.package()?;
            tracing::debug!(
                "Found optional package {} providing {} extension(s)",
                canonical.display(),
                package.available.len()
            );
            repository.add_package(package);
        }
    }

    Ok(repository)
}
