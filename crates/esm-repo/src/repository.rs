//! The repository capability shared by directory and archive repositories

use std::fmt::Debug;

use esm_fs::RelativePath;

use crate::{BaseUri, ByteStream, RepositoryIdentity, Result};

/// What a resolved path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

/// Attributes of a resolved module or a native file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Size in bytes (uncompressed size for archive entries).
    pub len: u64,
    pub kind: EntryKind,
}

impl EntryMetadata {
    pub fn file(len: u64) -> Self {
        Self {
            len,
            kind: EntryKind::File,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// A place ES modules can be resolved in and read from.
///
/// Module references are resolved to *namespaced* paths: the repository's
/// unique prefix followed by the path of the module relative to the
/// repository root. Only namespaced paths produced by this repository can
/// be opened.
pub trait ModuleRepository: Debug + Send + Sync {
    fn identity(&self) -> &RepositoryIdentity;

    /// Resolve a module reference or a namespaced path.
    ///
    /// Accepts bare and `./`-relative references (relative to the repository
    /// root) as well as namespaced paths carrying this repository's prefix.
    /// Returns `None` if no matching module exists, if the path belongs to
    /// another repository, or if it would escape the repository root.
    fn resolve_module_path(&self, path: &RelativePath) -> Option<RelativePath>;

    /// Open a namespaced path previously returned by
    /// [`resolve_module_path`](Self::resolve_module_path).
    fn open_for_read(&self, path: &RelativePath) -> Result<ByteStream>;

    /// Attributes of the module behind a namespaced path.
    fn metadata(&self, path: &RelativePath) -> Result<EntryMetadata>;

    /// The base location this repository was built from.
    fn base_uri(&self) -> BaseUri;

    fn unique_prefix(&self) -> &RelativePath {
        self.identity().prefix()
    }

    fn matches_prefix(&self, path: &RelativePath) -> bool {
        self.identity().owns(path)
    }

    /// Parse `reference` and resolve it.
    fn resolve_module_str(&self, reference: &str) -> Option<RelativePath> {
        self.resolve_module_path(&RelativePath::parse(reference))
    }
}

/// Map a module reference or namespaced path onto a canonical path relative
/// to the repository root.
///
/// Namespaced paths of other repositories yield `None`. So do paths whose
/// `..` segments would climb above the root; those are logged as traversal
/// attempts rather than ordinary misses.
pub(crate) fn repo_relative_reference(
    identity: &RepositoryIdentity,
    path: &RelativePath,
) -> Option<RelativePath> {
    let relative = if path.has_repository_marker() {
        match identity.repo_relative(path) {
            Some(relative) => relative,
            None => {
                tracing::debug!(%path, repository = %identity, "Path belongs to another repository");
                return None;
            }
        }
    } else {
        path.clone()
    };

    let canonical = relative.canonicalize_within();
    if canonical.is_none() {
        tracing::warn!(%path, repository = %identity, "Rejected module path escaping the repository root");
    }
    canonical
}
