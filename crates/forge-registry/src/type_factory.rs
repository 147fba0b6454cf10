//! Per-role factories binding type names to implementation classes.

use std::collections::BTreeMap;
use std::sync::Arc;

use forge_loader::{Instance, LoadingScope};
use parking_lot::RwLock;

use crate::error::{Error, Result};

/// Constructs named types of one role.
pub trait TypeFactory: Send + Sync {
    /// The class bound to `name`, if any.
    fn class_name(&self, name: &str) -> Option<String>;

    /// Construct a new instance of the class bound to `name`.
    fn create(&self, name: &str) -> Result<Instance>;

    fn can_create(&self, name: &str) -> bool {
        self.class_name(name).is_some()
    }
}

/// A name -> class table instantiating classes through a loading scope.
pub struct DefaultTypeFactory {
    role: String,
    scope: Arc<LoadingScope>,
    bindings: RwLock<BTreeMap<String, String>>,
}

impl DefaultTypeFactory {
    pub fn new(role: impl Into<String>, scope: Arc<LoadingScope>) -> Self {
        Self {
            role: role.into(),
            scope,
            bindings: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn scope(&self) -> &Arc<LoadingScope> {
        &self.scope
    }

    /// Bind `name` to `class_name`, replacing any earlier binding.
    pub fn add_binding(&self, name: impl Into<String>, class_name: impl Into<String>) {
        self.bindings.write().insert(name.into(), class_name.into());
    }

    /// Bound names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.bindings.read().keys().cloned().collect()
    }
}

impl TypeFactory for DefaultTypeFactory {
    fn class_name(&self, name: &str) -> Option<String> {
        self.bindings.read().get(name).cloned()
    }

    fn create(&self, name: &str) -> Result<Instance> {
        let class_name = self.class_name(name).ok_or_else(|| Error::NoBinding {
            role: self.role.clone(),
            name: name.to_string(),
        })?;
        Ok(self.scope.new_instance(&class_name)?)
    }
}
