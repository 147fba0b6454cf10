use std::sync::Arc;

use crate::converter_registry::{ConverterRegistry, DefaultConverterRegistry};
use crate::role_registry::{DefaultRoleRegistry, RoleRegistry};
use crate::type_registry::{DefaultTypeRegistry, TypeRegistry};

/// The registries a deployer publishes into.
#[derive(Clone)]
pub struct Registries {
    pub roles: Arc<dyn RoleRegistry>,
    pub types: Arc<dyn TypeRegistry>,
    pub converters: Arc<dyn ConverterRegistry>,
}

impl Registries {
    /// Fresh registries with the built-in roles.
    pub fn new() -> Self {
        Self {
            roles: Arc::new(DefaultRoleRegistry::with_builtins()),
            types: Arc::new(DefaultTypeRegistry::new()),
            converters: Arc::new(DefaultConverterRegistry::new()),
        }
    }

    /// Registries whose role and type lookups fall back to `parent`.
    /// Converters are shared with the parent.
    pub fn child_of(parent: &Registries) -> Self {
        Self {
            roles: Arc::new(DefaultRoleRegistry::with_parent(Arc::clone(&parent.roles))),
            types: Arc::new(DefaultTypeRegistry::with_parent(Arc::clone(&parent.types))),
            converters: Arc::clone(&parent.converters),
        }
    }
}

impl Default for Registries {
    fn default() -> Self {
        Self::new()
    }
}
