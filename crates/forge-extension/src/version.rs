//! Dotted-decimal versions used by extension declarations.
//!
//! Extension versions are sequences of non-negative integers separated by
//! dots (`1`, `1.2`, `1.2.3.4`). They are not semver: there is no fixed
//! number of components and no pre-release tag. Missing trailing components
//! compare as zero, so `1.2` equals `1.2.0`.
//!
//! # Examples
//!
//! ```
//! use forge_extension::DeweyDecimal;
//!
//! let available: DeweyDecimal = "1.3".parse().unwrap();
//! let required: DeweyDecimal = "1.2.9".parse().unwrap();
//! assert!(available >= required);
//! assert_eq!("1.2".parse::<DeweyDecimal>().unwrap(), "1.2.0".parse().unwrap());
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};

/// A dotted-decimal version number.
#[derive(Debug, Clone, Serialize)]
#[serde(into = "String")]
pub struct DeweyDecimal {
    components: Vec<u64>,
}

impl DeweyDecimal {
    /// Create a version from its components.
    ///
    /// An empty slice is treated as `0`.
    pub fn new(components: &[u64]) -> Self {
        let components = if components.is_empty() {
            vec![0]
        } else {
            components.to_vec()
        };
        Self { components }
    }

    /// Parse a version string such as `1.2.3`.
    pub fn parse(version: &str) -> Result<Self> {
        let trimmed = version.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidVersion {
                version: version.to_string(),
                reason: "empty version".to_string(),
            });
        }

        let mut components = Vec::new();
        for part in trimmed.split('.') {
            let value = part.parse::<u64>().map_err(|e| Error::InvalidVersion {
                version: version.to_string(),
                reason: format!("component '{part}': {e}"),
            })?;
            components.push(value);
        }

        Ok(Self { components })
    }

    /// The version components, most significant first.
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }
}

impl PartialEq for DeweyDecimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DeweyDecimal {}

impl PartialOrd for DeweyDecimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DeweyDecimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            match self.component(i).cmp(&other.component(i)) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl FromStr for DeweyDecimal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DeweyDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .components
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(".");
        f.write_str(&text)
    }
}

impl From<DeweyDecimal> for String {
    fn from(version: DeweyDecimal) -> Self {
        version.to_string()
    }
}
