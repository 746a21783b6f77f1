//! Shared test utilities for the esm-resolver workspace.
//!
//! Dev-dependency only; never published.
//!
//! # Modules
//!
//! - [`tree`]: [`ModuleTree`] builder for directory repositories
//! - [`archive`]: [`ArchiveBuilder`] for zip/jar repositories

pub mod archive;
pub mod tree;

pub use archive::ArchiveBuilder;
pub use tree::ModuleTree;
