//! Command implementations

mod deploy;
mod inspect;

pub use deploy::run_deploy;
pub use inspect::run_inspect;
