//! (role, name) -> factory registry.
//!
//! Roles are keyed by the [`TypeToken`] their scope resolved, so a role name
//! defined by two different scopes gives two unrelated tables. Instances are
//! created lazily through the registered factory.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use forge_loader::{Instance, TypeToken};
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::type_factory::TypeFactory;

pub trait TypeRegistry: Send + Sync {
    /// Register `name` of role `role`, implemented by `class_name` and
    /// constructed by `factory`.
    ///
    /// Registering a name again with the same class replaces the factory;
    /// with a different class it fails.
    fn register_type(
        &self,
        role: &TypeToken,
        name: &str,
        class_name: &str,
        factory: Arc<dyn TypeFactory>,
    ) -> Result<()>;

    fn factory(&self, role: &TypeToken, name: &str) -> Option<Arc<dyn TypeFactory>>;

    /// The class registered for `name` of role `role`.
    fn class_name(&self, role: &TypeToken, name: &str) -> Option<String>;

    /// Registered names of a role, sorted.
    fn names(&self, role: &TypeToken) -> Vec<String>;

    /// Roles with at least one registered name, sorted.
    fn roles(&self) -> Vec<TypeToken>;

    /// Construct a new instance of `name` of role `role`.
    fn create(&self, role: &TypeToken, name: &str) -> Result<Instance> {
        let factory = self.factory(role, name).ok_or_else(|| Error::UnknownType {
            role: role.name.clone(),
            name: name.to_string(),
        })?;
        factory.create(name)
    }
}

struct Registration {
    class_name: String,
    factory: Arc<dyn TypeFactory>,
}

#[derive(Default)]
pub struct DefaultTypeRegistry {
    parent: Option<Arc<dyn TypeRegistry>>,
    roles: RwLock<HashMap<TypeToken, BTreeMap<String, Registration>>>,
}

impl DefaultTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty registry whose lookups fall back to `parent`.
    pub fn with_parent(parent: Arc<dyn TypeRegistry>) -> Self {
        Self {
            parent: Some(parent),
            roles: RwLock::default(),
        }
    }
}

impl TypeRegistry for DefaultTypeRegistry {
    fn register_type(
        &self,
        role: &TypeToken,
        name: &str,
        class_name: &str,
        factory: Arc<dyn TypeFactory>,
    ) -> Result<()> {
        let mut roles = self.roles.write();
        let table = roles.entry(role.clone()).or_default();

        if let Some(existing) = table.get(name) {
            if existing.class_name != class_name {
                return Err(Error::TypeConflict {
                    role: role.name.clone(),
                    name: name.to_string(),
                    existing: existing.class_name.clone(),
                    class_name: class_name.to_string(),
                });
            }
        }

        table.insert(
            name.to_string(),
            Registration {
                class_name: class_name.to_string(),
                factory,
            },
        );
        tracing::debug!("Registered {} '{}' -> {}", role.name, name, class_name);
        Ok(())
    }

    fn factory(&self, role: &TypeToken, name: &str) -> Option<Arc<dyn TypeFactory>> {
        let local = self
            .roles
            .read()
            .get(role)
            .and_then(|table| table.get(name))
            .map(|r| Arc::clone(&r.factory));
        local.or_else(|| self.parent.as_ref().and_then(|p| p.factory(role, name)))
    }

    fn class_name(&self, role: &TypeToken, name: &str) -> Option<String> {
        let local = self
            .roles
            .read()
            .get(role)
            .and_then(|table| table.get(name))
            .map(|r| r.class_name.clone());
        local.or_else(|| self.parent.as_ref().and_then(|p| p.class_name(role, name)))
    }

    fn names(&self, role: &TypeToken) -> Vec<String> {
        let mut names: BTreeSet<String> = self
            .parent
            .as_ref()
            .map(|p| p.names(role).into_iter().collect())
            .unwrap_or_default();
        if let Some(table) = self.roles.read().get(role) {
            names.extend(table.keys().cloned());
        }
        names.into_iter().collect()
    }

    fn roles(&self) -> Vec<TypeToken> {
        let mut roles: BTreeSet<TypeToken> = self
            .parent
            .as_ref()
            .map(|p| p.roles().into_iter().collect())
            .unwrap_or_default();
        roles.extend(
            self.roles
                .read()
                .iter()
                .filter(|(_, table)| !table.is_empty())
                .map(|(token, _)| token.clone()),
        );
        roles.into_iter().collect()
    }
}
