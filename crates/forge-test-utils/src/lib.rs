//! Shared test utilities for the Forge workspace.
//!
//! Fixtures write real zip archives so loaders and deployers are exercised
//! against the same on-disk format they read in production. Dev-dependency
//! only, never published.
//!
//! # Modules
//!
//! - [`archive`]: [`ArchiveBuilder`] for type-library archives
//! - [`workspace`]: [`TestWorkspace`] with library and extension directories

pub mod archive;
pub mod workspace;

pub use archive::ArchiveBuilder;
pub use workspace::TestWorkspace;
