//! Isolated resolution contexts over ordered archives.
//!
//! A scope searches its own archives and its parent scope. With
//! [`Delegation::ParentFirst`] (the default) the parent wins; with
//! [`Delegation::LocalFirst`] the scope's own archives win. The parent is
//! held weakly: the [`ScopeManager`](crate::ScopeManager) owns scopes.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use serde::{Deserialize, Serialize};

use crate::archive::Archive;
use crate::catalog::{ClassCatalog, Instance};
use crate::error::{Error, Result};

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a loading scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u64);

impl ScopeId {
    fn next() -> Self {
        Self(NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope-{}", self.0)
    }
}

/// A type name as resolved by a particular scope.
///
/// Two tokens with the same name from different defining scopes are
/// different types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeToken {
    pub name: String,
    pub scope: ScopeId,
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.scope)
    }
}

/// Which side of the scope chain is searched first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Delegation {
    #[default]
    ParentFirst,
    LocalFirst,
}

/// An entry found inside one of a scope's archives.
#[derive(Debug, Clone)]
pub struct Resource {
    archive: Arc<Archive>,
    name: String,
}

impl Resource {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn archive_path(&self) -> &Path {
        self.archive.path()
    }

    /// `<archive path>!/<entry>`
    pub fn url(&self) -> String {
        format!("{}!/{}", self.archive.path().display(), self.name)
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        match self.archive.read_entry(&self.name)? {
            Some(bytes) => Ok(bytes),
            None => Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("entry vanished: {}", self.url()),
            ))),
        }
    }
}

pub struct LoadingScope {
    id: ScopeId,
    archives: Vec<Arc<Archive>>,
    parent: Option<Weak<LoadingScope>>,
    catalog: Option<Arc<ClassCatalog>>,
    delegation: Delegation,
}

impl LoadingScope {
    /// A scope over `archives`, searched in order.
    pub fn new(
        archives: Vec<Arc<Archive>>,
        parent: Option<&Arc<LoadingScope>>,
        delegation: Delegation,
    ) -> Self {
        Self {
            id: ScopeId::next(),
            archives,
            parent: parent.map(Arc::downgrade),
            catalog: None,
            delegation,
        }
    }

    /// A scope with no archives and no parent, backed by `catalog`.
    pub fn root(catalog: ClassCatalog) -> Self {
        Self::new(Vec::new(), None, Delegation::default()).with_catalog(Arc::new(catalog))
    }

    pub fn with_catalog(mut self, catalog: Arc<ClassCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// The parent scope, if it is still alive.
    pub fn parent(&self) -> Option<Arc<LoadingScope>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    pub fn delegation(&self) -> Delegation {
        self.delegation
    }

    pub fn catalog(&self) -> Option<&Arc<ClassCatalog>> {
        self.catalog.as_ref()
    }

    pub fn archives(&self) -> &[Arc<Archive>] {
        &self.archives
    }

    /// Paths of this scope's archives, in search order.
    pub fn code_locations(&self) -> Vec<PathBuf> {
        self.archives.iter().map(|a| a.path().to_path_buf()).collect()
    }

    /// The first resource called `name` in delegation order.
    pub fn resource(&self, name: &str) -> Option<Resource> {
        let local = || {
            self.archives
                .iter()
                .find(|a| a.contains(name))
                .map(|a| resource(a, name))
        };
        let inherited = || self.parent().and_then(|p| p.resource(name));
        match self.delegation {
            Delegation::ParentFirst => inherited().or_else(local),
            Delegation::LocalFirst => local().or_else(inherited),
        }
    }

    /// Every resource called `name` visible to this scope, in delegation order.
    pub fn resources(&self, name: &str) -> Vec<Resource> {
        let local: Vec<Resource> = self
            .archives
            .iter()
            .filter(|a| a.contains(name))
            .map(|a| resource(a, name))
            .collect();
        let inherited = self.parent().map(|p| p.resources(name)).unwrap_or_default();
        match self.delegation {
            Delegation::ParentFirst => inherited.into_iter().chain(local).collect(),
            Delegation::LocalFirst => local.into_iter().chain(inherited).collect(),
        }
    }

    /// Look up `name` in a single archive.
    pub fn archive_resource(&self, archive: &Path, name: &str) -> Option<Resource> {
        self.archives
            .iter()
            .find(|a| a.path() == archive)
            .filter(|a| a.contains(name))
            .map(|a| resource(a, name))
    }

    /// Resolve `name` to the type defined by the first scope on the chain
    /// whose catalog knows it.
    pub fn resolve_type(&self, name: &str) -> Result<TypeToken> {
        self.defining_scope(name, &|scope| {
            Some(TypeToken {
                name: name.to_string(),
                scope: scope.id,
            })
        })
        .ok_or_else(|| Error::UnknownType {
            name: name.to_string(),
        })
    }

    /// Construct a new instance of `class` through the catalog defining it.
    pub fn new_instance(&self, class: &str) -> Result<Instance> {
        match self.defining_scope(class, &|scope| scope.catalog.clone()) {
            Some(catalog) => catalog.instantiate(class),
            None => Err(Error::UnknownClass {
                name: class.to_string(),
            }),
        }
    }

    fn defining_scope<T>(&self, name: &str, found: &dyn Fn(&LoadingScope) -> Option<T>) -> Option<T> {
        let local = || {
            self.catalog
                .as_ref()
                .filter(|c| c.contains(name))
                .and_then(|_| found(self))
        };
        let inherited = || self.parent().and_then(|p| p.defining_scope(name, found));
        match self.delegation {
            Delegation::ParentFirst => inherited().or_else(local),
            Delegation::LocalFirst => local().or_else(inherited),
        }
    }
}

fn resource(archive: &Arc<Archive>, name: &str) -> Resource {
    Resource {
        archive: Arc::clone(archive),
        name: name.to_string(),
    }
}

impl fmt::Debug for LoadingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadingScope")
            .field("id", &self.id)
            .field("code_locations", &self.code_locations())
            .field("delegation", &self.delegation)
            .field("catalog", &self.catalog.is_some())
            .finish()
    }
}
