//! The resolver facade and its repository list

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use esm_fs::RelativePath;
use esm_repo::{ByteStream, EntryKind, EntryMetadata, ModuleRepository};
use url::Url;

use crate::{AccessMode, Error, ModuleHandle, ModulePath, Result};

/// A repository shared between the resolver and in-flight callers.
pub type SharedRepository = Arc<dyn ModuleRepository>;

#[derive(Debug, Default, Clone)]
struct Repositories {
    system: Option<SharedRepository>,
    user: Vec<SharedRepository>,
}

impl Repositories {
    /// System repository first, then user-defined ones in registration order.
    fn search_order(&self) -> Vec<SharedRepository> {
        self.system.iter().chain(&self.user).cloned().collect()
    }
}

/// Routes module requests to the repository owning them, or to the real
/// file system.
///
/// The repository list is guarded by a lock that is held only while the
/// list is read or replaced. Resolution and I/O work on a snapshot of
/// `Arc`s, so a repository removed mid-request stays alive until that
/// request is done.
#[derive(Debug, Default)]
pub struct ModuleResolver {
    repositories: RwLock<Repositories>,
}

impl ModuleResolver {
    /// A resolver without any repositories.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repositories(
        system: Option<SharedRepository>,
        repositories: Vec<SharedRepository>,
    ) -> Self {
        Self {
            repositories: RwLock::new(Repositories {
                system,
                user: repositories,
            }),
        }
    }

    fn snapshot(&self) -> Vec<SharedRepository> {
        self.repositories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .search_order()
    }

    fn update<R>(&self, f: impl FnOnce(&mut Repositories) -> R) -> R {
        let mut repositories = self
            .repositories
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut repositories)
    }

    // ---- Repository list ----

    pub fn system_repository(&self) -> Option<SharedRepository> {
        self.repositories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .system
            .clone()
    }

    /// The user-defined repositories in search order.
    pub fn repositories(&self) -> Vec<SharedRepository> {
        self.repositories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }

    /// Replace the system repository, returning the previous one.
    pub fn set_system_repository(&self, repository: Option<SharedRepository>) -> Option<SharedRepository> {
        if let Some(repository) = &repository {
            tracing::info!(
                repository = %repository.identity(),
                base_uri = %repository.base_uri(),
                "Set system module repository"
            );
        }
        self.update(|list| std::mem::replace(&mut list.system, repository))
    }

    /// Append a user-defined repository; it is searched after all others.
    pub fn add_repository(&self, repository: SharedRepository) {
        tracing::info!(
            repository = %repository.identity(),
            base_uri = %repository.base_uri(),
            "Added module repository"
        );
        self.update(|list| list.user.push(repository));
    }

    /// Remove the user-defined repository identified by `prefix`.
    ///
    /// Matching is by the unique prefix, so any namespaced path produced by
    /// the repository identifies it as well. Once the last reference is
    /// dropped the repository releases its resources.
    pub fn remove_repository(&self, prefix: &RelativePath) -> Option<SharedRepository> {
        let removed = self.update(|list| {
            let index = list.user.iter().position(|repo| repo.matches_prefix(prefix))?;
            Some(list.user.remove(index))
        });
        match &removed {
            Some(repository) => tracing::info!(
                repository = %repository.identity(),
                base_uri = %repository.base_uri(),
                "Removed module repository"
            ),
            None => tracing::debug!(%prefix, "No repository to remove"),
        }
        removed
    }

    /// Replace the whole user-defined list.
    pub fn set_repositories(&self, repositories: Vec<SharedRepository>) {
        tracing::info!(count = repositories.len(), "Replaced module repositories");
        self.update(|list| list.user = repositories);
    }

    /// The registered repository whose prefix `path` carries.
    pub fn owner_of(&self, path: &RelativePath) -> Option<SharedRepository> {
        if !path.has_repository_marker() {
            return None;
        }
        self.snapshot()
            .into_iter()
            .find(|repo| repo.matches_prefix(path))
    }

    fn owner(&self, path: &RelativePath) -> Result<SharedRepository> {
        self.owner_of(path).ok_or_else(|| Error::UnownedPath {
            path: path.to_absolute_string(),
        })
    }

    // ---- Resolution ----

    /// Resolve a module reference to a handle.
    ///
    /// Namespaced references are resolved only by their owning repository.
    /// Anything else is tried against every repository in search order and
    /// the first match wins. `None` means the module wasn't found.
    pub fn resolve(&self, reference: &str) -> Option<ModuleHandle> {
        let relative = RelativePath::parse(reference);

        if relative.has_repository_marker() {
            let Some(owner) = self.owner_of(&relative) else {
                tracing::debug!(reference, "No registered repository owns module path");
                return None;
            };
            return owner
                .resolve_module_path(&relative)
                .and_then(ModuleHandle::new);
        }

        let found = self
            .snapshot()
            .iter()
            .find_map(|repo| repo.resolve_module_path(&relative));
        if found.is_none() {
            tracing::debug!(reference, "Module not found in any repository");
        }
        found.and_then(ModuleHandle::new)
    }

    /// Resolve `specifier` as imported from the module `referrer`.
    ///
    /// `./` and `../` specifiers are resolved against the directory of the
    /// referrer inside its own repository and never leave that repository's
    /// root. Other specifiers go through [`resolve`](Self::resolve).
    pub fn resolve_from(&self, referrer: &ModuleHandle, specifier: &str) -> Option<ModuleHandle> {
        if !is_relative_specifier(specifier) {
            return self.resolve(specifier);
        }

        let Some(owner) = self.owner_of(referrer.path()) else {
            tracing::debug!(%referrer, specifier, "Referrer isn't owned by any registered repository");
            return None;
        };
        let referrer_relative = owner.identity().repo_relative(referrer.path())?;
        let directory = referrer_relative.parent().unwrap_or_default();
        let candidate = directory.append(&RelativePath::parse(specifier));

        tracing::debug!(%referrer, specifier, %candidate, "Resolving nested import");
        owner
            .resolve_module_path(&candidate)
            .and_then(ModuleHandle::new)
    }

    /// Open a resolved module.
    pub fn open(&self, handle: &ModuleHandle) -> Result<ByteStream> {
        let owner = self.owner(handle.path())?;
        Ok(owner.open_for_read(handle.path())?)
    }

    // ---- File system surface ----

    /// Turn text into a [`ModulePath`].
    ///
    /// Absolute paths without a repository marker stay on the real file
    /// system. Other text is resolved as a module reference; if no
    /// repository knows it, it is treated as a plain path. A namespaced path
    /// is always a module path, even if its repository is gone; operations
    /// on it then fail with [`Error::UnownedPath`].
    pub fn parse_path(&self, text: &str) -> ModulePath {
        let relative = RelativePath::parse(text);
        if relative.has_repository_marker() {
            let resolved = self
                .owner_of(&relative)
                .and_then(|repo| repo.resolve_module_path(&relative));
            return ModulePath::Module(resolved.unwrap_or(relative));
        }

        let native = Path::new(text);
        if native.is_absolute() {
            return ModulePath::Native(native.to_path_buf());
        }
        match self.resolve(text) {
            Some(handle) => handle.into(),
            None => ModulePath::Native(native.to_path_buf()),
        }
    }

    /// Parse a `file:` URI. Other schemes are rejected.
    pub fn parse_uri(&self, uri: &Url) -> Result<ModulePath> {
        if uri.scheme() != "file" {
            return Err(Error::UnsupportedUri {
                uri: uri.to_string(),
            });
        }
        let path = uri.to_file_path().map_err(|()| Error::UnsupportedUri {
            uri: uri.to_string(),
        })?;
        Ok(self.parse_path(&path.to_string_lossy()))
    }

    /// Check that `path` exists and permits every access in `modes`.
    pub fn check_access(&self, path: &ModulePath, modes: &[AccessMode]) -> Result<()> {
        match path {
            ModulePath::Module(module) => {
                let owner = self.owner(module)?;
                owner.metadata(module)?;
                if modes.contains(&AccessMode::Write) {
                    return Err(Error::ReadOnly {
                        path: module.to_absolute_string(),
                    });
                }
                if modes.contains(&AccessMode::Execute) {
                    return Err(Error::AccessDenied {
                        path: PathBuf::from(module.to_absolute_string()),
                    });
                }
                Ok(())
            }
            ModulePath::Native(native) => check_native_access(native, modes),
        }
    }

    pub fn read_attributes(&self, path: &ModulePath) -> Result<EntryMetadata> {
        match path {
            ModulePath::Module(module) => Ok(self.owner(module)?.metadata(module)?),
            ModulePath::Native(native) => {
                let metadata = fs::metadata(native).map_err(|e| Error::io(native, e))?;
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
        }
    }

    /// The canonical form of `path`.
    ///
    /// Module paths are re-resolved by their repository, which reflects
    /// symlinks and suffixes back into the returned path.
    pub fn to_real_path(&self, path: &ModulePath) -> Result<ModulePath> {
        match path {
            ModulePath::Module(module) => {
                let owner = self.owner(module)?;
                owner
                    .resolve_module_path(module)
                    .map(ModulePath::Module)
                    .ok_or_else(|| Error::NotFound {
                        path: module.to_absolute_string(),
                    })
            }
            ModulePath::Native(native) => dunce::canonicalize(native)
                .map(ModulePath::Native)
                .map_err(|e| Error::io(native, e)),
        }
    }

    /// Module paths are already absolute; native paths are made absolute
    /// against the current directory without touching the file system.
    pub fn to_absolute_path(&self, path: &ModulePath) -> Result<ModulePath> {
        match path {
            ModulePath::Module(_) => Ok(path.clone()),
            ModulePath::Native(native) => std::path::absolute(native)
                .map(ModulePath::Native)
                .map_err(|e| Error::io(native, e)),
        }
    }

    /// Open `path` for reading.
    pub fn new_byte_channel(&self, path: &ModulePath) -> Result<ByteStream> {
        match path {
            ModulePath::Module(module) => Ok(self.owner(module)?.open_for_read(module)?),
            ModulePath::Native(native) => File::open(native)
                .map(ByteStream::File)
                .map_err(|e| Error::io(native, e)),
        }
    }

    pub fn create_directory(&self, path: &ModulePath) -> Result<()> {
        match path {
            ModulePath::Module(module) => Err(unsupported("create_directory", module)),
            ModulePath::Native(native) => fs::create_dir(native).map_err(|e| Error::io(native, e)),
        }
    }

    pub fn delete(&self, path: &ModulePath) -> Result<()> {
        match path {
            ModulePath::Module(module) => Err(unsupported("delete", module)),
            ModulePath::Native(native) => {
                let metadata = fs::symlink_metadata(native).map_err(|e| Error::io(native, e))?;
                let result = if metadata.is_dir() {
                    fs::remove_dir(native)
                } else {
                    fs::remove_file(native)
                };
                result.map_err(|e| Error::io(native, e))
            }
        }
    }

    /// List the entries of a native directory accepted by `filter`, sorted.
    pub fn new_directory_stream(
        &self,
        path: &ModulePath,
        filter: impl Fn(&Path) -> bool,
    ) -> Result<Vec<PathBuf>> {
        match path {
            ModulePath::Module(module) => Err(unsupported("new_directory_stream", module)),
            ModulePath::Native(native) => {
                let mut entries = Vec::new();
                for entry in fs::read_dir(native).map_err(|e| Error::io(native, e))? {
                    let entry = entry.map_err(|e| Error::io(native, e))?;
                    let entry_path = entry.path();
                    if filter(&entry_path) {
                        entries.push(entry_path);
                    }
                }
                entries.sort();
                Ok(entries)
            }
        }
    }
}

fn is_relative_specifier(specifier: &str) -> bool {
    matches!(specifier, "." | "..")
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

fn unsupported(operation: &'static str, path: &RelativePath) -> Error {
    Error::Unsupported {
        operation,
        path: path.to_absolute_string(),
    }
}

fn check_native_access(path: &Path, modes: &[AccessMode]) -> Result<()> {
    let metadata = fs::metadata(path).map_err(|e| Error::io(path, e))?;
    for mode in modes {
        match mode {
            AccessMode::Read => {
                let readable = if metadata.is_dir() {
                    fs::read_dir(path).map(drop)
                } else {
                    File::open(path).map(drop)
                };
                readable.map_err(|e| access_error(path, e))?;
            }
            AccessMode::Write => {
                if metadata.permissions().readonly() {
                    return Err(Error::AccessDenied {
                        path: path.to_path_buf(),
                    });
                }
            }
            AccessMode::Execute => {
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    if metadata.permissions().mode() & 0o111 == 0 {
                        return Err(Error::AccessDenied {
                            path: path.to_path_buf(),
                        });
                    }
                }
            }
        }
    }
    Ok(())
}

fn access_error(path: &Path, error: io::Error) -> Error {
    if error.kind() == io::ErrorKind::PermissionDenied {
        Error::AccessDenied {
            path: path.to_path_buf(),
        }
    } else {
        Error::io(path, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esm_repo::DirectoryRepository;
    use esm_test_utils::ModuleTree;

    fn directory(tree: &ModuleTree) -> SharedRepository {
        Arc::new(DirectoryRepository::new(tree.root()).unwrap())
    }

    #[test]
    fn system_repository_is_searched_first() {
        let system = ModuleTree::new().file("util.mjs", "system");
        let user = ModuleTree::new().file("util.mjs", "user");
        let system_repo = directory(&system);
        let resolver = ModuleResolver::with_repositories(Some(system_repo.clone()), vec![directory(&user)]);

        let handle = resolver.resolve("util").unwrap();
        assert!(system_repo.matches_prefix(handle.path()));
    }

    #[test]
    fn relative_specifier_detection() {
        assert!(is_relative_specifier("./a"));
        assert!(is_relative_specifier("../a"));
        assert!(is_relative_specifier(".."));
        assert!(!is_relative_specifier("a/b"));
        assert!(!is_relative_specifier(".hidden"));
        assert!(!is_relative_specifier("/es-module-repo/x"));
    }

    #[test]
    fn set_system_repository_returns_previous() {
        let tree = ModuleTree::new();
        let resolver = ModuleResolver::new();
        let first = directory(&tree);

        assert!(resolver.set_system_repository(Some(first.clone())).is_none());
        let previous = resolver.set_system_repository(None).unwrap();
        assert_eq!(previous.unique_prefix(), first.unique_prefix());
        assert!(resolver.system_repository().is_none());
    }
}
