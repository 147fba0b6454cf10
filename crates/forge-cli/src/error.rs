//! Error types for forge-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Deployer(#[from] forge_deployer::Error),

    #[error(transparent)]
    Loader(#[from] forge_loader::Error),

    #[error(transparent)]
    Extension(#[from] forge_extension::Error),

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to initialize logging: {message}")]
    Logging { message: String },
}
