//! Loading scopes for Forge type libraries.
//!
//! A [`LoadingScope`] is an isolated resolution context over an ordered list
//! of archives with an optional parent scope. The [`ScopeManager`] builds one
//! scope per archive (or archive set), pulling in the optional packages the
//! archive manifests require, and caches it by canonical path.
//!
//! Implementations are supplied by the host through a [`ClassCatalog`]: a
//! table of role types and constructible classes attached to the base scope.

pub mod archive;
pub mod cache;
pub mod catalog;
pub mod error;
pub mod manager;
pub mod repository;
pub mod scope;

pub use archive::Archive;
pub use cache::KeyedCache;
pub use catalog::{ClassCatalog, Instance};
pub use error::{Error, Result};
pub use manager::ScopeManager;
pub use repository::scan_extension_dirs;
pub use scope::{Delegation, LoadingScope, Resource, ScopeId, TypeToken};
