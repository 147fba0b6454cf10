//! The host's table of role types and constructible classes.
//!
//! Archives carry descriptors naming implementation classes; the code behind
//! those names lives in the host process and is registered here as
//! constructors. A catalog is attached to a [`LoadingScope`](crate::LoadingScope),
//! normally the base scope every archive scope delegates to.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

type Constructor = Arc<dyn Fn() -> Box<dyn Any + Send + Sync> + Send + Sync>;

#[derive(Clone)]
enum Entry {
    Role,
    Class(Constructor),
}

/// Role and class names known to the host.
#[derive(Clone, Default)]
pub struct ClassCatalog {
    entries: HashMap<String, Entry>,
    lenient: bool,
}

impl ClassCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog that knows every name as a type but can only construct the
    /// classes registered in it. Useful to check descriptor wiring without
    /// host code.
    pub fn lenient() -> Self {
        Self {
            entries: HashMap::new(),
            lenient: true,
        }
    }

    pub fn is_lenient(&self) -> bool {
        self.lenient
    }

    /// Register a role type (resolvable, not constructible).
    pub fn register_role(&mut self, name: impl Into<String>) -> &mut Self {
        self.entries.insert(name.into(), Entry::Role);
        self
    }

    /// Register a class with its no-argument constructor.
    pub fn register_class<T, F>(&mut self, name: impl Into<String>, constructor: F) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let constructor: Constructor =
            Arc::new(move || Box::new(constructor()) as Box<dyn Any + Send + Sync>);
        self.entries.insert(name.into(), Entry::Class(constructor));
        self
    }

    /// Whether `name` resolves to a type in this catalog.
    pub fn contains(&self, name: &str) -> bool {
        self.lenient || self.entries.contains_key(name)
    }

    /// Whether `name` has a registered constructor.
    pub fn is_class(&self, name: &str) -> bool {
        matches!(self.entries.get(name), Some(Entry::Class(_)))
    }

    /// Construct a new instance of `name`.
    pub fn instantiate(&self, name: &str) -> Result<Instance> {
        match self.entries.get(name) {
            Some(Entry::Class(constructor)) => Ok(Instance {
                class_name: name.to_string(),
                value: constructor(),
            }),
            Some(Entry::Role) => Err(Error::NotInstantiable {
                name: name.to_string(),
            }),
            None => Err(Error::UnknownClass {
                name: name.to_string(),
            }),
        }
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort();
        names
    }
}

impl fmt::Debug for ClassCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassCatalog")
            .field("names", &self.names())
            .field("lenient", &self.lenient)
            .finish()
    }
}

/// A constructed object and the class it was constructed from.
pub struct Instance {
    class_name: String,
    value: Box<dyn Any + Send + Sync>,
}

impl Instance {
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Take the concrete value, or get the instance back on a type mismatch.
    pub fn downcast<T: Any>(self) -> std::result::Result<Box<T>, Self> {
        let class_name = self.class_name;
        self.value
            .downcast::<T>()
            .map_err(|value| Self { class_name, value })
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class_name", &self.class_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Widget {
        size: u32,
    }

    fn catalog() -> ClassCatalog {
        let mut catalog = ClassCatalog::new();
        catalog
            .register_role("com.acme.Widget")
            .register_class("com.acme.WidgetImpl", || Widget { size: 3 });
        catalog
    }

    #[test]
    fn test_instantiate_class() {
        let instance = catalog().instantiate("com.acme.WidgetImpl").unwrap();
        assert_eq!(instance.class_name(), "com.acme.WidgetImpl");
        assert!(instance.is::<Widget>());
        assert_eq!(instance.downcast_ref::<Widget>(), Some(&Widget { size: 3 }));
    }

    #[test]
    fn test_each_instantiation_is_fresh() {
        let catalog = catalog();
        let a = catalog.instantiate("com.acme.WidgetImpl").unwrap();
        let b = catalog.instantiate("com.acme.WidgetImpl").unwrap();
        let a = a.downcast::<Widget>().unwrap();
        let b = b.downcast::<Widget>().unwrap();
        assert!(!std::ptr::eq(a.as_ref(), b.as_ref()));
    }

    #[test]
    fn test_downcast_mismatch_returns_instance() {
        let instance = catalog().instantiate("com.acme.WidgetImpl").unwrap();
        let instance = instance.downcast::<String>().unwrap_err();
        assert_eq!(instance.class_name(), "com.acme.WidgetImpl");
    }

    #[test]
    fn test_role_is_not_instantiable() {
        let err = catalog().instantiate("com.acme.Widget").unwrap_err();
        assert!(matches!(err, Error::NotInstantiable { .. }));
    }

    #[test]
    fn test_unknown_class() {
        let catalog = catalog();
        assert!(!catalog.contains("com.acme.Gadget"));
        assert!(matches!(
            catalog.instantiate("com.acme.Gadget"),
            Err(Error::UnknownClass { .. })
        ));
    }

    #[test]
    fn test_lenient_resolves_everything_but_constructs_nothing_unknown() {
        let catalog = ClassCatalog::lenient();
        assert!(catalog.contains("anything.At.All"));
        assert!(!catalog.is_class("anything.At.All"));
        assert!(catalog.instantiate("anything.At.All").is_err());
    }

    #[test]
    fn test_names_sorted() {
        assert_eq!(
            catalog().names(),
            vec!["com.acme.Widget", "com.acme.WidgetImpl"]
        );
    }
}
