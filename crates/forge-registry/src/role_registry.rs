//! Shorthand <-> role mapping.
//!
//! A registry resolves a shorthand (`task`) to its fully qualified role
//! (`forge.api.Task`) and back. A child registry consults its parent on a
//! local miss but never writes to it.
//!
//! # Example
//!
//! ```
//! use forge_registry::{DefaultRoleRegistry, RoleRegistry};
//!
//! let registry = DefaultRoleRegistry::new();
//! registry.register("com.acme.Widget", "widget").unwrap();
//! assert_eq!(registry.resolve("widget").as_deref(), Some("com.acme.Widget"));
//! assert_eq!(registry.reverse_resolve("com.acme.Widget").as_deref(), Some("widget"));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::roles::BUILTIN_ROLES;

pub trait RoleRegistry: Send + Sync {
    /// The role a shorthand stands for.
    fn resolve(&self, shorthand: &str) -> Option<String>;

    /// The shorthand of a role.
    fn reverse_resolve(&self, role: &str) -> Option<String>;

    /// Bind `shorthand` to `role`.
    ///
    /// Registering an identical pair again is a no-op. Binding a shorthand
    /// that names another role, or giving a role a second shorthand, fails.
    fn register(&self, role: &str, shorthand: &str) -> Result<()>;

    /// (shorthand, role) pairs visible through this registry, sorted by
    /// shorthand.
    fn list(&self) -> Vec<(String, String)>;
}

#[derive(Default)]
struct RoleMaps {
    by_shorthand: HashMap<String, String>,
    by_role: HashMap<String, String>,
}

#[derive(Default)]
pub struct DefaultRoleRegistry {
    parent: Option<Arc<dyn RoleRegistry>>,
    maps: RwLock<RoleMaps>,
}

impl DefaultRoleRegistry {
    /// An empty registry with no parent.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty registry delegating misses to `parent`.
    pub fn with_parent(parent: Arc<dyn RoleRegistry>) -> Self {
        Self {
            parent: Some(parent),
            maps: RwLock::default(),
        }
    }

    /// A registry with the built-in roles registered.
    pub fn with_builtins() -> Self {
        let mut maps = RoleMaps::default();
        for (shorthand, role) in BUILTIN_ROLES {
            maps.by_shorthand
                .insert(shorthand.to_string(), role.to_string());
            maps.by_role.insert(role.to_string(), shorthand.to_string());
        }
        Self {
            parent: None,
            maps: RwLock::new(maps),
        }
    }

    /// Number of locally registered roles.
    pub fn len(&self) -> usize {
        self.maps.read().by_shorthand.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RoleRegistry for DefaultRoleRegistry {
    fn resolve(&self, shorthand: &str) -> Option<String> {
        if let Some(role) = self.maps.read().by_shorthand.get(shorthand) {
            return Some(role.clone());
        }
        self.parent.as_ref().and_then(|p| p.resolve(shorthand))
    }

    fn reverse_resolve(&self, role: &str) -> Option<String> {
        if let Some(shorthand) = self.maps.read().by_role.get(role) {
            return Some(shorthand.clone());
        }
        self.parent.as_ref().and_then(|p| p.reverse_resolve(role))
    }

    fn register(&self, role: &str, shorthand: &str) -> Result<()> {
        let mut maps = self.maps.write();

        let existing_role = maps
            .by_shorthand
            .get(shorthand)
            .cloned()
            .or_else(|| self.parent.as_ref().and_then(|p| p.resolve(shorthand)));
        let existing_shorthand = maps
            .by_role
            .get(role)
            .cloned()
            .or_else(|| self.parent.as_ref().and_then(|p| p.reverse_resolve(role)));

        match (existing_role, existing_shorthand) {
            (Some(existing), _) if existing != role => Err(Error::ShorthandInUse {
                shorthand: shorthand.to_string(),
                existing,
                role: role.to_string(),
            }),
            (_, Some(existing)) if existing != shorthand => Err(Error::RoleConflict {
                role: role.to_string(),
                existing,
                shorthand: shorthand.to_string(),
            }),
            (Some(_), Some(_)) => Ok(()),
            _ => {
                maps.by_shorthand
                    .insert(shorthand.to_string(), role.to_string());
                maps.by_role.insert(role.to_string(), shorthand.to_string());
                tracing::debug!("Registered role {} as '{}'", role, shorthand);
                Ok(())
            }
        }
    }

    fn list(&self) -> Vec<(String, String)> {
        let mut merged: HashMap<String, String> = self
            .parent
            .as_ref()
            .map(|p| p.list().into_iter().collect())
            .unwrap_or_default();
        for (shorthand, role) in &self.maps.read().by_shorthand {
            merged.insert(shorthand.clone(), role.clone());
        }
        let mut pairs: Vec<(String, String)> = merged.into_iter().collect();
        pairs.sort();
        pairs
    }
}
