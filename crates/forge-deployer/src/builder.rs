//! Builders turning configuration trees into descriptors.
//!
//! Every descriptor carries a `version` attribute on its root. A descriptor
//! is accepted when its major version equals the major version of
//! [`COMPATIBLE_VERSION`]; `1.0` is read as `1.0.0`.

use semver::Version;

use crate::configuration::Configuration;
use crate::descriptor::{
    ConverterDefinition, Definition, RoleDefinition, RoleDescriptor, ServiceDefinition,
    ServiceDescriptor, TypeDefinition, TypeDescriptor,
};
use crate::error::{Error, Result};

/// The descriptor schema version these builders understand.
pub const COMPATIBLE_VERSION: Version = Version::new(1, 0, 0);

pub trait DescriptorBuilder {
    type Descriptor;

    /// Interpret `tree`, read from `url`.
    fn build(&self, tree: &Configuration, url: &str) -> Result<Self::Descriptor>;
}

/// Builds [`RoleDescriptor`]s from `role` children with `name` and
/// `shorthand` attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleDescriptorBuilder;

impl DescriptorBuilder for RoleDescriptorBuilder {
    type Descriptor = RoleDescriptor;

    fn build(&self, tree: &Configuration, url: &str) -> Result<RoleDescriptor> {
        check_version(tree, url)?;

        let mut definitions = Vec::new();
        for (index, role) in tree.children_named("role").enumerate() {
            let describe = || format!("role #{} in {url}", index + 1);
            let name = required(role, "name", describe)?;
            let shorthand = required(role, "shorthand", describe)?;
            definitions.push(RoleDefinition { name, shorthand });
        }
        Ok(RoleDescriptor::new(url, definitions))
    }
}

/// Builds [`TypeDescriptor`]s from the children of the `types` node.
///
/// A `converter` child becomes a converter definition; any other child
/// becomes a type whose role shorthand is the child's name.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeDescriptorBuilder;

impl DescriptorBuilder for TypeDescriptorBuilder {
    type Descriptor = TypeDescriptor;

    fn build(&self, tree: &Configuration, url: &str) -> Result<TypeDescriptor> {
        check_version(tree, url)?;

        let Some(types) = tree.child("types") else {
            return Ok(TypeDescriptor::new(url, Vec::new()));
        };

        let definitions = types
            .children()
            .iter()
            .map(|node| {
                let text = |key: &str| node.attribute(key).map(str::to_string);
                if node.name() == "converter" {
                    Definition::Converter(ConverterDefinition {
                        class_name: text("classname"),
                        source: text("source"),
                        destination: text("destination"),
                    })
                } else {
                    Definition::Type(TypeDefinition {
                        name: text("name"),
                        role: Some(node.name().to_string()),
                        class_name: text("classname"),
                    })
                }
            })
            .collect();
        Ok(TypeDescriptor::new(url, definitions))
    }
}

/// Builds [`ServiceDescriptor`]s from `service` children with `role` and
/// `factory` attributes and an optional `config` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceDescriptorBuilder;

impl DescriptorBuilder for ServiceDescriptorBuilder {
    type Descriptor = ServiceDescriptor;

    fn build(&self, tree: &Configuration, url: &str) -> Result<ServiceDescriptor> {
        check_version(tree, url)?;

        let mut definitions = Vec::new();
        for (index, service) in tree.children_named("service").enumerate() {
            let describe = || format!("service #{} in {url}", index + 1);
            let role = required(service, "role", describe)?;
            let factory = required(service, "factory", describe)?;
            let config = service
                .child("config")
                .cloned()
                .unwrap_or_else(|| Configuration::new("config", url));
            definitions.push(ServiceDefinition {
                role,
                factory,
                config,
            });
        }
        Ok(ServiceDescriptor::new(url, definitions))
    }
}

fn required(
    node: &Configuration,
    attribute: &'static str,
    describe: impl Fn() -> String,
) -> Result<String> {
    node.attribute(attribute)
        .map(str::to_string)
        .ok_or_else(|| Error::MissingAttribute {
            attribute,
            definition: describe(),
        })
}

fn check_version(tree: &Configuration, url: &str) -> Result<()> {
    let raw = tree
        .attribute("version")
        .ok_or_else(|| Error::MalformedDescriptor {
            url: url.to_string(),
            message: "missing 'version' attribute".to_string(),
        })?;
    let version = normalize_version(raw).map_err(|message| Error::MalformedDescriptor {
        url: url.to_string(),
        message,
    })?;

    if version.major != COMPATIBLE_VERSION.major {
        return Err(Error::IncompatibleVersion {
            url: url.to_string(),
            found: version.to_string(),
            expected: COMPATIBLE_VERSION.to_string(),
        });
    }
    Ok(())
}

/// Normalize a version string to semver by appending `.0` for a missing
/// patch component.
fn normalize_version(s: &str) -> std::result::Result<Version, String> {
    let s = s.trim();
    if let Ok(v) = Version::parse(s) {
        return Ok(v);
    }
    let with_patch = format!("{s}.0");
    Version::parse(&with_patch).map_err(|e| format!("invalid version '{s}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn tree(text: &str) -> Configuration {
        Configuration::from_toml("descriptor", text, "test.toml").unwrap()
    }

    #[rstest]
    #[case("1.0.0")]
    #[case("1.0.1")]
    #[case("1.4")]
    fn test_compatible_versions(#[case] version: &str) {
        let t = tree(&format!("version = \"{version}\"\n"));
        assert!(RoleDescriptorBuilder.build(&t, "test.toml").is_ok());
    }

    #[test]
    fn test_major_mismatch_is_incompatible() {
        let t = tree("version = \"2.0.0\"\n");
        let err = TypeDescriptorBuilder.build(&t, "test.toml").unwrap_err();
        match err {
            Error::IncompatibleVersion { found, expected, .. } => {
                assert_eq!(found, "2.0.0");
                assert_eq!(expected, "1.0.0");
            }
            other => panic!("expected incompatible version, got {other:?}"),
        }
    }

    #[rstest]
    #[case("")]
    #[case("version = \"one\"\n")]
    #[case("version = \"1\"\n")]
    fn test_missing_or_malformed_version(#[case] text: &str) {
        let err = ServiceDescriptorBuilder.build(&tree(text), "test.toml").unwrap_err();
        assert!(matches!(err, Error::MalformedDescriptor { .. }), "{err:?}");
    }

    #[test]
    fn test_role_builder() {
        let t = tree(
            "version = \"1.0.0\"\n[[role]]\nshorthand = \"widget\"\nname = \"com.acme.Widget\"\n[[role]]\nshorthand = \"gadget\"\nname = \"com.acme.Gadget\"\n",
        );
        let descriptor = RoleDescriptorBuilder.build(&t, "roles.toml").unwrap();
        assert_eq!(descriptor.url(), "roles.toml");
        assert_eq!(
            descriptor.definitions(),
            &[
                RoleDefinition {
                    name: "com.acme.Widget".to_string(),
                    shorthand: "widget".to_string(),
                },
                RoleDefinition {
                    name: "com.acme.Gadget".to_string(),
                    shorthand: "gadget".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_role_builder_requires_shorthand() {
        let t = tree("version = \"1.0.0\"\n[[role]]\nname = \"com.acme.Widget\"\n");
        let err = RoleDescriptorBuilder.build(&t, "roles.toml").unwrap_err();
        assert!(matches!(err, Error::MissingAttribute { attribute: "shorthand", .. }));
    }

    #[test]
    fn test_type_builder() {
        let t = tree(
            "version = \"1.0.0\"\n[[types.widget]]\nname = \"mywidget\"\nclassname = \"com.acme.WidgetImpl\"\n[[types.converter]]\nclassname = \"com.acme.StringToWidget\"\nsource = \"string\"\ndestination = \"com.acme.Widget\"\n",
        );
        let descriptor = TypeDescriptorBuilder.build(&t, "types.toml").unwrap();
        assert_eq!(
            descriptor.definitions(),
            &[
                Definition::Type(TypeDefinition {
                    name: Some("mywidget".to_string()),
                    role: Some("widget".to_string()),
                    class_name: Some("com.acme.WidgetImpl".to_string()),
                }),
                Definition::Converter(ConverterDefinition {
                    class_name: Some("com.acme.StringToWidget".to_string()),
                    source: Some("string".to_string()),
                    destination: Some("com.acme.Widget".to_string()),
                }),
            ]
        );
    }

    #[test]
    fn test_type_builder_without_types_is_empty() {
        let descriptor = TypeDescriptorBuilder
            .build(&tree("version = \"1.0.0\"\n"), "types.toml")
            .unwrap();
        assert!(descriptor.definitions().is_empty());
    }

    #[test]
    fn test_type_builder_keeps_incomplete_definitions() {
        let t = tree("version = \"1.0.0\"\n[[types.widget]]\nclassname = \"X\"\n");
        let descriptor = TypeDescriptorBuilder.build(&t, "types.toml").unwrap();
        assert_eq!(descriptor.definitions()[0].name(), None);
    }

    #[test]
    fn test_service_builder_with_config() {
        let t = tree(
            "version = \"1.0.0\"\n[[service]]\nrole = \"widget\"\nfactory = \"com.acme.WidgetServiceFactory\"\n[service.config]\npool = 4\n",
        );
        let descriptor = ServiceDescriptorBuilder.build(&t, "services.toml").unwrap();
        let service = &descriptor.definitions()[0];
        assert_eq!(service.role, "widget");
        assert_eq!(service.factory, "com.acme.WidgetServiceFactory");
        assert_eq!(service.config.attribute("pool"), Some("4"));
    }

    #[test]
    fn test_service_builder_without_services() {
        let descriptor = ServiceDescriptorBuilder
            .build(&tree("version = \"1.0.0\"\n"), "services.toml")
            .unwrap();
        assert!(descriptor.definitions().is_empty());
    }

    #[test]
    fn test_service_builder_default_config_is_empty() {
        let t = tree("version = \"1.0.0\"\n[[service]]\nrole = \"r\"\nfactory = \"F\"\n");
        let descriptor = ServiceDescriptorBuilder.build(&t, "services.toml").unwrap();
        let config = &descriptor.definitions()[0].config;
        assert_eq!(config.name(), "config");
        assert!(config.children().is_empty());
        assert_eq!(config.attribute_names().count(), 0);
    }
}
