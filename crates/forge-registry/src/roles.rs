//! Built-in roles.

use forge_loader::ClassCatalog;

pub const TASK: &str = "task";
pub const TASK_ROLE: &str = "forge.api.Task";

pub const DATA_TYPE: &str = "data-type";
pub const DATA_TYPE_ROLE: &str = "forge.api.DataType";

pub const CONVERTER: &str = "converter";
pub const CONVERTER_ROLE: &str = "forge.converter.Converter";

pub const SERVICE_FACTORY: &str = "service-factory";
pub const SERVICE_FACTORY_ROLE: &str = "forge.service.ServiceFactory";

/// (shorthand, role) pairs every root role registry starts with.
pub const BUILTIN_ROLES: &[(&str, &str)] = &[
    (TASK, TASK_ROLE),
    (DATA_TYPE, DATA_TYPE_ROLE),
    (CONVERTER, CONVERTER_ROLE),
    (SERVICE_FACTORY, SERVICE_FACTORY_ROLE),
];

/// A class catalog that knows the built-in role types.
///
/// Hosts add their own roles and classes before attaching it to a base
/// scope.
pub fn builtin_catalog() -> ClassCatalog {
    let mut catalog = ClassCatalog::new();
    for (_, role) in BUILTIN_ROLES {
        catalog.register_role(*role);
    }
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_knows_builtin_roles() {
        let catalog = builtin_catalog();
        for (_, role) in BUILTIN_ROLES {
            assert!(catalog.contains(role), "missing {role}");
            assert!(!catalog.is_class(role));
        }
    }
}
