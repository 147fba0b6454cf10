//! Deployer configuration.
//!
//! Read from the `[deployer]` table of a `forge.toml` file:
//!
//! ```toml
//! [deployer]
//! ext_path = ["ext", "/opt/forge/ext"]
//! archive_extensions = ["pkg", "zip"]
//! delegation = "parent-first"
//! ```
//!
//! Relative `ext_path` entries are resolved against the directory holding
//! the file.

use std::fs;
use std::path::{Path, PathBuf};

use forge_loader::Delegation;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployerConfig {
    /// Directories searched for optional packages.
    pub ext_path: Vec<PathBuf>,
    /// File extensions identifying archives in those directories.
    pub archive_extensions: Vec<String>,
    /// Search order of archive scopes.
    pub delegation: Delegation,
}

impl Default for DeployerConfig {
    fn default() -> Self {
        Self {
            ext_path: Vec::new(),
            archive_extensions: vec!["pkg".to_string(), "zip".to_string()],
            delegation: Delegation::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    deployer: DeployerConfig,
}

impl DeployerConfig {
    /// Parse the `[deployer]` table of a TOML document. A missing table
    /// gives the defaults.
    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        Ok(toml::from_str::<ConfigFile>(text)?.deployer)
    }

    /// Load configuration from a file.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path)?;
        let mut config = Self::from_toml(&text).map_err(|e| Error::InvalidConfig {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;

        if let Some(base) = path.parent() {
            config.ext_path = config
                .ext_path
                .into_iter()
                .map(|dir| if dir.is_relative() { base.join(dir) } else { dir })
                .collect();
        }
        Ok(config)
    }
}
