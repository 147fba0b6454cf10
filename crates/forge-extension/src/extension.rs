//! Extension records and compatibility matching.

use std::fmt;

use serde::Serialize;

use crate::version::DeweyDecimal;

/// A named, versioned capability that an archive provides or requires.
///
/// Only the name is mandatory. On a requirement, every other field is a
/// constraint; on an available extension, every other field is a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extension {
    /// Extension name (e.g. `com.acme.widgets`).
    pub name: String,
    /// Version of the specification the extension implements.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specification_version: Option<DeweyDecimal>,
    /// Organisation owning the specification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specification_vendor: Option<String>,
    /// Version of the implementation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation_version: Option<DeweyDecimal>,
    /// Organisation providing the implementation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation_vendor: Option<String>,
    /// Stable identifier of the implementation vendor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation_vendor_id: Option<String>,
    /// Where the implementation can be downloaded from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation_url: Option<String>,
}

/// How an available extension relates to a required one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    /// The available extension satisfies the requirement.
    Compatible,
    /// The specification version is missing or too old.
    RequireSpecificationUpgrade,
    /// The implementation vendor differs.
    RequireVendorSwitch,
    /// The implementation version is missing or too old.
    RequireImplementationUpgrade,
    /// The extension names differ.
    Incompatible,
}

impl Extension {
    /// Create an extension with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            specification_version: None,
            specification_vendor: None,
            implementation_version: None,
            implementation_vendor: None,
            implementation_vendor_id: None,
            implementation_url: None,
        }
    }

    /// Set the specification version.
    pub fn with_specification_version(mut self, version: DeweyDecimal) -> Self {
        self.specification_version = Some(version);
        self
    }

    /// Set the specification vendor.
    pub fn with_specification_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.specification_vendor = Some(vendor.into());
        self
    }

    /// Set the implementation version.
    pub fn with_implementation_version(mut self, version: DeweyDecimal) -> Self {
        self.implementation_version = Some(version);
        self
    }

    /// Set the implementation vendor id.
    pub fn with_implementation_vendor_id(mut self, vendor_id: impl Into<String>) -> Self {
        self.implementation_vendor_id = Some(vendor_id.into());
        self
    }

    /// Compare this (available) extension against a `required` one.
    ///
    /// Checks run in order: name, specification version, vendor id,
    /// implementation version. The first failing check decides the result.
    pub fn compatibility_with(&self, required: &Extension) -> Compatibility {
        if self.name != required.name {
            return Compatibility::Incompatible;
        }

        if let Some(ref wanted) = required.specification_version {
            match self.specification_version {
                Some(ref have) if have >= wanted => {}
                _ => return Compatibility::RequireSpecificationUpgrade,
            }
        }

        if let Some(ref wanted) = required.implementation_vendor_id {
            if self.implementation_vendor_id.as_ref() != Some(wanted) {
                return Compatibility::RequireVendorSwitch;
            }
        }

        if let Some(ref wanted) = required.implementation_version {
            match self.implementation_version {
                Some(ref have) if have >= wanted => {}
                _ => return Compatibility::RequireImplementationUpgrade,
            }
        }

        Compatibility::Compatible
    }

    /// Whether this extension satisfies `required`.
    pub fn is_compatible_with(&self, required: &Extension) -> bool {
        self.compatibility_with(required) == Compatibility::Compatible
    }

    /// The vendor to report for this extension: vendor id, else vendor name.
    pub fn vendor(&self) -> Option<&str> {
        self.implementation_vendor_id
            .as_deref()
            .or(self.implementation_vendor.as_deref())
            .or(self.specification_vendor.as_deref())
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        let version = self
            .specification_version
            .as_ref()
            .or(self.implementation_version.as_ref());
        match (self.vendor(), version) {
            (Some(vendor), Some(version)) => write!(f, " (vendor {vendor}, version {version})"),
            (Some(vendor), None) => write!(f, " (vendor {vendor})"),
            (None, Some(version)) => write!(f, " (version {version})"),
            (None, None) => Ok(()),
        }
    }
}
