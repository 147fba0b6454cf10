use std::path::PathBuf;

/// Errors that can occur in the optional-package model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid dotted-decimal version string.
    #[error("invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// Manifest text could not be parsed.
    #[error("malformed manifest at line {line}: {reason}")]
    ManifestParse { line: usize, reason: String },

    /// An extension list names an alias with no `<alias>-Extension-Name`.
    #[error("extension list entry '{alias}' has no {alias}-Extension-Name attribute")]
    MissingExtensionName { alias: String },

    /// A version attribute of an extension could not be parsed.
    #[error("bad {attribute} '{value}' for extension '{extension}': {reason}")]
    BadExtensionVersion {
        extension: String,
        attribute: String,
        value: String,
        reason: String,
    },

    /// Resolving dependencies led back to an archive already being resolved.
    #[error("dependency cycle detected: {}", format_chain(.chain))]
    DependencyCycle { chain: Vec<PathBuf> },
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = std::result::Result<T, Error>;
