//! Read access to type-library archives.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use forge_extension::{MANIFEST_ENTRY, Manifest, OptionalPackage};
use parking_lot::Mutex;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{Error, Result};

const MAX_CAPACITY_HINT: u64 = 1 << 20;

/// An opened zip archive.
///
/// Entry names are read once on open; entry contents are read on demand.
pub struct Archive {
    path: PathBuf,
    entries: Vec<String>,
    zip: Mutex<ZipArchive<File>>,
}

impl Archive {
    /// Open the archive at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
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

        let file = File::open(path)?;
        let zip = ZipArchive::new(file).map_err(|source| Error::Archive {
            path: path.to_path_buf(),
            source,
        })?;
        let entries = zip.file_names().map(str::to_string).collect();

        tracing::trace!("Opened archive {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            entries,
            zip: Mutex::new(zip),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of every entry, in archive order.
    pub fn entry_names(&self) -> &[String] {
        &self.entries
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e == name)
    }

    /// Read an entry. A missing entry is `Ok(None)`.
    pub fn read_entry(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let mut zip = self.zip.lock();
        let mut file = match zip.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(source) => {
                return Err(Error::Archive {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let mut bytes = Vec::with_capacity(capacity_hint(file.size()));
        file.read_to_end(&mut bytes)?;
        Ok(Some(bytes))
    }

    /// The archive manifest. An archive without one has an empty manifest.
    pub fn manifest(&self) -> Result<Manifest> {
        match self.read_entry(MANIFEST_ENTRY)? {
            Some(bytes) => Manifest::from_bytes(&bytes).map_err(|source| Error::Manifest {
                path: self.path.clone(),
                source,
            }),
            None => Ok(Manifest::new()),
        }
    }

    /// The extensions this archive provides, requires and optionally uses.
    pub fn package(&self) -> Result<OptionalPackage> {
        let manifest = self.manifest()?;
        OptionalPackage::from_manifest(&self.path, &manifest).map_err(|source| Error::Manifest {
            path: self.path.clone(),
            source,
        })
    }
}

/// Preallocation for an entry of `declared` bytes. The header value is not
/// trusted beyond [`MAX_CAPACITY_HINT`]; larger entries grow while reading.
fn capacity_hint(declared: u64) -> usize {
    usize::try_from(declared.min(MAX_CAPACITY_HINT)).unwrap_or(0)
}

impl fmt::Debug for Archive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Archive")
            .field("path", &self.path)
            .field("entries", &self.entries.len())
            .finish()
    }
}
