//! Role, type and converter registries for Forge.
//!
//! Deployed type libraries publish into three registries:
//!
//! - [`RoleRegistry`]: shorthand <-> fully qualified role name
//! - [`TypeRegistry`]: (role, type name) -> factory that can construct it
//! - [`ConverterRegistry`]: (source, destination) -> converter class
//!
//! The [`Registries`] bundle carries one of each and is what a deployer is
//! constructed with.

pub mod converter_registry;
pub mod error;
pub mod registries;
pub mod role_registry;
pub mod roles;
pub mod type_factory;
pub mod type_registry;

pub use converter_registry::{ConverterEntry, ConverterRegistry, DefaultConverterRegistry};
pub use error::{Error, Result};
pub use registries::Registries;
pub use role_registry::{DefaultRoleRegistry, RoleRegistry};
pub use roles::builtin_catalog;
pub use type_factory::{DefaultTypeFactory, TypeFactory};
pub use type_registry::{DefaultTypeRegistry, TypeRegistry};
