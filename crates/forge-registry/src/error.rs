/// Errors raised by the registries.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The shorthand already names a different role.
    #[error("shorthand '{shorthand}' is already bound to role '{existing}', cannot bind it to '{role}'")]
    ShorthandInUse {
        shorthand: String,
        existing: String,
        role: String,
    },

    /// The role already has a different shorthand.
    #[error("role '{role}' already has shorthand '{existing}', cannot add '{shorthand}'")]
    RoleConflict {
        role: String,
        existing: String,
        shorthand: String,
    },

    /// The type name is already bound to a different class.
    #[error("type '{name}' of role '{role}' is already implemented by '{existing}', cannot rebind it to '{class_name}'")]
    TypeConflict {
        role: String,
        name: String,
        existing: String,
        class_name: String,
    },

    /// Another converter already handles the conversion.
    #[error("conversion from '{from}' to '{to}' is already handled by '{existing}', cannot register '{class_name}'")]
    ConverterConflict {
        from: String,
        to: String,
        existing: String,
        class_name: String,
    },

    #[error("no type '{name}' registered for role '{role}'")]
    UnknownType { role: String, name: String },

    /// The factory has no class bound to the name.
    #[error("factory for role '{role}' has no binding for '{name}'")]
    NoBinding { role: String, name: String },

    #[error(transparent)]
    Loader(#[from] forge_loader::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
