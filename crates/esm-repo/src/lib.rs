//! ES module repositories
//!
//! A module repository is a place module references can be resolved in and
//! read from. Two kinds exist:
//!
//! - [`DirectoryRepository`] resolves against a directory tree
//! - [`ArchiveRepository`] resolves against the entries of a zip/jar archive,
//!   optionally rooted at an in-archive directory
//!
//! Every repository owns a [`RepositoryIdentity`]. Paths it resolves are
//! prefixed with `es-module-repo/<uuid>`, so a path can later be routed back
//! to exactly the repository that produced it.

pub mod archive;
pub mod base_uri;
pub mod directory;
pub mod error;
pub mod factory;
pub mod identity;
pub mod repository;
pub mod stream;

pub use archive::ArchiveRepository;
pub use base_uri::BaseUri;
pub use directory::DirectoryRepository;
pub use error::{ConfigurationError, Error, Result};
pub use factory::RepositoryFactory;
pub use identity::RepositoryIdentity;
pub use repository::{EntryKind, EntryMetadata, ModuleRepository};
pub use stream::ByteStream;
