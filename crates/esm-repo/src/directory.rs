//! Module repository backed by a directory tree

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use esm_fs::{MODULE_SUFFIXES, RelativePath};

use crate::repository::repo_relative_reference;
use crate::{
    BaseUri, ByteStream, ConfigurationError, EntryKind, EntryMetadata, Error, ModuleRepository,
    RepositoryIdentity, Result,
};

/// Resolves modules against the files below a root directory.
///
/// The root is canonicalized on construction. Every file a resolution
/// lands on is canonicalized as well and must still live below the root,
/// so neither `..` segments nor symlinks lead outside of it.
#[derive(Debug)]
pub struct DirectoryRepository {
    identity: RepositoryIdentity,
    root: PathBuf,
}

impl DirectoryRepository {
    /// Create a repository for the directory `root`.
    ///
    /// # Errors
    ///
    /// Fails if `root` doesn't exist, isn't a directory or can't be listed.
    pub fn new(root: impl AsRef<Path>) -> std::result::Result<Self, ConfigurationError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(ConfigurationError::NotADirectory {
                path: root.to_path_buf(),
            });
        }
        let canonical = dunce::canonicalize(root).map_err(|source| ConfigurationError::Unreadable {
            path: root.to_path_buf(),
            source,
        })?;
        fs::read_dir(&canonical).map_err(|source| ConfigurationError::Unreadable {
            path: canonical.clone(),
            source,
        })?;

        let identity = RepositoryIdentity::generate();
        tracing::debug!(root = %canonical.display(), repository = %identity, "Created directory repository");
        Ok(Self {
            identity,
            root: canonical,
        })
    }

    /// The canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find the file for a canonical repo-relative path, trying the module
    /// suffixes in order. Returns the repo-relative path of the file actually
    /// found, re-derived from its canonical location.
    fn lookup(&self, relative: &RelativePath) -> Option<RelativePath> {
        for suffix in MODULE_SUFFIXES {
            let candidate = relative.with_suffix(suffix)?;
            let native = candidate.to_native(&self.root);
            if !is_readable_file(&native) {
                continue;
            }
            let real = match dunce::canonicalize(&native) {
                Ok(real) => real,
                Err(e) => {
                    tracing::debug!(candidate = %native.display(), error = %e, "Failed to canonicalize candidate");
                    continue;
                }
            };
            let Ok(inside) = real.strip_prefix(&self.root) else {
                tracing::warn!(
                    candidate = %native.display(),
                    real = %real.display(),
                    root = %self.root.display(),
                    "Rejected module file resolving outside the repository root"
                );
                return None;
            };
            return RelativePath::from_native(inside).filter(|found| !found.is_empty());
        }
        None
    }

    /// Map a namespaced path owned by this repository to its canonical
    /// location on disk.
    fn native_path(&self, path: &RelativePath) -> Result<PathBuf> {
        let relative = self
            .identity
            .repo_relative(path)
            .ok_or_else(|| Error::ForeignPath {
                path: path.to_absolute_string(),
            })?;
        let relative = relative.canonicalize_within().ok_or_else(|| Error::Traversal {
            path: path.to_absolute_string(),
        })?;
        let native = relative.to_native(&self.root);
        let real = dunce::canonicalize(&native).map_err(|e| Error::io(&native, e))?;
        if !real.starts_with(&self.root) {
            tracing::warn!(%path, real = %real.display(), "Rejected module path escaping the repository root");
            return Err(Error::Traversal {
                path: path.to_absolute_string(),
            });
        }
        Ok(real)
    }
}

fn is_readable_file(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|m| m.is_file()) && File::open(path).is_ok()
}

impl ModuleRepository for DirectoryRepository {
    fn identity(&self) -> &RepositoryIdentity {
        &self.identity
    }

    fn resolve_module_path(&self, path: &RelativePath) -> Option<RelativePath> {
        tracing::debug!(%path, root = %self.root.display(), "Resolving module path");
        let relative = repo_relative_reference(&self.identity, path)?;
        match self.lookup(&relative) {
            Some(found) => {
                let resolved = self.identity.namespace(&found);
                tracing::debug!(%path, %resolved, "Resolved module path");
                Some(resolved)
            }
            None => {
                tracing::debug!(%path, root = %self.root.display(), "No readable module file found");
                None
            }
        }
    }

    fn open_for_read(&self, path: &RelativePath) -> Result<ByteStream> {
        let native = self.native_path(path)?;
        let file = File::open(&native).map_err(|e| Error::io(&native, e))?;
        Ok(ByteStream::File(file))
    }

    fn metadata(&self, path: &RelativePath) -> Result<EntryMetadata> {
        let native = self.native_path(path)?;
        let metadata = fs::metadata(&native).map_err(|e| Error::io(&native, e))?;
        let kind = if metadata.is_file() {
            EntryKind::File
        } else if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::Other
        };
        Ok(EntryMetadata {
            len: metadata.len(),
            kind,
        })
    }

    fn base_uri(&self) -> BaseUri {
        BaseUri::Directory(self.root.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = DirectoryRepository::new(dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, ConfigurationError::NotADirectory { .. }));
    }

    #[test]
    fn rejects_file_as_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.mjs");
        fs::write(&file, "").unwrap();
        assert!(DirectoryRepository::new(&file).is_err());
    }

    #[test]
    fn empty_reference_does_not_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let repo = DirectoryRepository::new(dir.path()).unwrap();
        assert!(repo.resolve_module_path(&RelativePath::empty()).is_none());
        assert!(repo.resolve_module_str("./").is_none());
    }
}
