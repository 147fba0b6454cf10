//! The deployment error type.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure a deployer reports.
///
/// Loader and registry failures (missing archives, unsatisfied extensions,
/// dependency cycles, role/type/converter conflicts) are wrapped unchanged.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Loader(#[from] forge_loader::Error),

    #[error(transparent)]
    Registry(#[from] forge_registry::Error),

    /// The descriptor could not be parsed.
    #[error("malformed descriptor {url}: {message}")]
    MalformedDescriptor { url: String, message: String },

    /// The descriptor's schema version is not supported.
    #[error("descriptor {url} has version {found}, which is incompatible with {expected}")]
    IncompatibleVersion {
        url: String,
        found: String,
        expected: String,
    },

    /// A definition lacks a required attribute.
    #[error("{definition} is missing the '{attribute}' attribute")]
    MissingAttribute {
        attribute: &'static str,
        definition: String,
    },

    /// A type names a role shorthand nothing registered.
    #[error("unknown role for name {name}: no role has shorthand '{shorthand}'")]
    UnknownRole { name: String, shorthand: String },

    /// A deployment outlived the deployer that created it.
    #[error("the deployer owning this deployment has been dropped")]
    DeployerDropped,

    #[error("configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("invalid configuration at {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
