use std::path::PathBuf;

use forge_extension::Extension;

/// Errors that can occur while loading archives and resolving types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("archive not found: {path}")]
    ArchiveNotFound { path: PathBuf },

    #[error("archive path is a directory: {path}")]
    IsDirectory { path: PathBuf },

    /// The file is not a readable zip archive.
    #[error("failed to read archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// The archive manifest is malformed.
    #[error("bad manifest in {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: forge_extension::Error,
    },

    /// Required extensions that no installed package provides.
    #[error("unsatisfied extensions: {}", format_extensions(.extensions))]
    UnsatisfiedExtensions { extensions: Vec<Extension> },

    #[error(transparent)]
    Extension(#[from] forge_extension::Error),

    /// No catalog on the scope chain knows the name.
    #[error("unknown type '{name}'")]
    UnknownType { name: String },

    /// The name is known but has no constructor.
    #[error("'{name}' is a role and cannot be instantiated")]
    NotInstantiable { name: String },

    #[error("unknown class '{name}'")]
    UnknownClass { name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_extensions(extensions: &[Extension]) -> String {
    extensions
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, Error>;
