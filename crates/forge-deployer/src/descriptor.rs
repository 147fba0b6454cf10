//! Parsed descriptor contents.

use std::fmt;

use forge_registry::roles::CONVERTER;
use serde::Serialize;

use crate::configuration::Configuration;

/// A named type of some role. Fields are checked when the type is deployed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeDefinition {
    pub name: Option<String>,
    /// Role shorthand.
    pub role: Option<String>,
    pub class_name: Option<String>,
}

/// A converter between two types. Its name is its class name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConverterDefinition {
    pub class_name: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
}

/// One entry of a type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Definition {
    Type(TypeDefinition),
    Converter(ConverterDefinition),
}

impl Definition {
    pub fn name(&self) -> Option<&str> {
        match self {
            Definition::Type(t) => t.name.as_deref(),
            Definition::Converter(c) => c.class_name.as_deref(),
        }
    }

    /// Role shorthand. Converters always have the `converter` role.
    pub fn role(&self) -> Option<&str> {
        match self {
            Definition::Type(t) => t.role.as_deref(),
            Definition::Converter(_) => Some(CONVERTER),
        }
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            Definition::Type(t) => t.class_name.as_deref(),
            Definition::Converter(c) => c.class_name.as_deref(),
        }
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Definition::Type(_) => "type",
            Definition::Converter(_) => "converter",
        };
        match self.name() {
            Some(name) => write!(f, "{kind} '{name}'"),
            None => write!(f, "unnamed {kind}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleDefinition {
    /// Fully qualified role name.
    pub name: String,
    pub shorthand: String,
}

/// A service factory for a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDefinition {
    /// Role shorthand.
    pub role: String,
    pub factory: String,
    #[serde(skip)]
    pub config: Configuration,
}

/// A parsed descriptor: where it came from and its definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Descriptor<D> {
    url: String,
    definitions: Vec<D>,
}

impl<D> Descriptor<D> {
    pub fn new(url: impl Into<String>, definitions: Vec<D>) -> Self {
        Self {
            url: url.into(),
            definitions,
        }
    }

    /// Where the descriptor was read from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Definitions in document order.
    pub fn definitions(&self) -> &[D] {
        &self.definitions
    }
}

/// The roles an archive declares.
pub type RoleDescriptor = Descriptor<RoleDefinition>;
/// The types and converters an archive declares.
pub type TypeDescriptor = Descriptor<Definition>;
/// The service factories an archive declares.
pub type ServiceDescriptor = Descriptor<ServiceDefinition>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converter_name_and_role() {
        let definition = Definition::Converter(ConverterDefinition {
            class_name: Some("com.acme.StringToWidget".to_string()),
            source: Some("string".to_string()),
            destination: Some("com.acme.Widget".to_string()),
        });
        assert_eq!(definition.name(), Some("com.acme.StringToWidget"));
        assert_eq!(definition.role(), Some("converter"));
        assert_eq!(definition.to_string(), "converter 'com.acme.StringToWidget'");
    }

    #[test]
    fn test_unnamed_type_display() {
        let definition = Definition::Type(TypeDefinition::default());
        assert_eq!(definition.to_string(), "unnamed type");
        assert_eq!(definition.role(), None);
    }
}
