//! [`TestWorkspace`]: a temporary directory laid out for deployment tests.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::archive::ArchiveBuilder;

/// A temporary directory with a `lib/` directory for type libraries and an
/// `ext/` directory for installed optional packages.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    /// Create the directory tree.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("lib")).unwrap();
        fs::create_dir_all(temp_dir.path().join("ext")).unwrap();
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.root().join("lib")
    }

    pub fn ext_dir(&self) -> PathBuf {
        self.root().join("ext")
    }

    /// Write a type library into `lib/`.
    pub fn library(&self, file_name: &str, archive: &ArchiveBuilder) -> PathBuf {
        archive.write(self.lib_dir().join(file_name))
    }

    /// Write an optional package into `ext/`.
    pub fn extension(&self, file_name: &str, archive: &ArchiveBuilder) -> PathBuf {
        archive.write(self.ext_dir().join(file_name))
    }

    /// Write a text file relative to the root.
    pub fn write_file(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }
}
