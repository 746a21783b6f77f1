//! Module repository backed by a zip/jar archive

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use esm_fs::{MODULE_SUFFIXES, RelativePath};
use zip::ZipArchive;

use crate::repository::repo_relative_reference;
use crate::{
    BaseUri, ByteStream, ConfigurationError, EntryKind, EntryMetadata, Error, ModuleRepository,
    RepositoryIdentity, Result,
};

/// Upper bound on the buffer reserved up front when reading an entry.
const MAX_PRESIZE: u64 = 1 << 20;

#[derive(Debug, Clone, Copy)]
struct FileEntry {
    index: usize,
    len: u64,
}

/// Names of all entries, normalized to `RelativePath` form.
///
/// Directories are recorded both for explicit directory entries and for
/// every parent of a file entry, since many archivers omit the former.
#[derive(Debug, Default)]
struct EntryIndex {
    files: HashMap<RelativePath, FileEntry>,
    directories: HashSet<RelativePath>,
}

impl EntryIndex {
    fn read(archive: &mut ZipArchive<File>, path: &Path) -> std::result::Result<Self, ConfigurationError> {
        let mut index = Self::default();
        for i in 0..archive.len() {
            let entry = archive
                .by_index_raw(i)
                .map_err(|source| ConfigurationError::ArchiveOpen {
                    path: path.to_path_buf(),
                    source,
                })?;
            let name = RelativePath::parse(entry.name());
            // Entries like "../x" can't be addressed by module paths
            let Some(name) = name.canonicalize_within().filter(|n| !n.is_empty()) else {
                continue;
            };
            if entry.is_dir() {
                index.add_directory(name);
            } else {
                if let Some(parent) = name.parent() {
                    index.add_directory(parent);
                }
                index.files.insert(
                    name,
                    FileEntry {
                        index: i,
                        len: entry.size(),
                    },
                );
            }
        }
        Ok(index)
    }

    fn add_directory(&mut self, mut directory: RelativePath) {
        while !directory.is_empty() && self.directories.insert(directory.clone()) {
            directory = directory.parent().unwrap_or_default();
        }
    }

    fn file(&self, name: &RelativePath) -> Option<FileEntry> {
        self.files.get(name).copied()
    }

    fn is_directory(&self, name: &RelativePath) -> bool {
        name.is_empty() || self.directories.contains(name)
    }
}

/// Resolves modules against the entries of a zip or jar archive.
///
/// The archive is opened once on construction and stays open for the
/// lifetime of the repository; dropping the repository releases it.
/// Namespaced paths are relative to the in-archive root.
pub struct ArchiveRepository {
    identity: RepositoryIdentity,
    archive_path: PathBuf,
    root: RelativePath,
    entries: EntryIndex,
    archive: Mutex<ZipArchive<File>>,
}

impl ArchiveRepository {
    /// Create a repository rooted at the top level of the archive.
    pub fn open(file: impl AsRef<Path>) -> std::result::Result<Self, ConfigurationError> {
        Self::with_root(file, &RelativePath::empty())
    }

    /// Create a repository rooted at the directory entry `root` of the
    /// archive.
    ///
    /// # Errors
    ///
    /// Fails if the archive can't be opened or read, if `root` doesn't
    /// exist in it, or if `root` names a file entry.
    pub fn with_root(
        file: impl AsRef<Path>,
        root: &RelativePath,
    ) -> std::result::Result<Self, ConfigurationError> {
        let file = file.as_ref();
        let archive_path =
            dunce::canonicalize(file).map_err(|source| ConfigurationError::ArchiveIo {
                path: file.to_path_buf(),
                source,
            })?;
        let handle = File::open(&archive_path).map_err(|source| ConfigurationError::ArchiveIo {
            path: archive_path.clone(),
            source,
        })?;
        let mut archive =
            ZipArchive::new(handle).map_err(|source| ConfigurationError::ArchiveOpen {
                path: archive_path.clone(),
                source,
            })?;
        let entries = EntryIndex::read(&mut archive, &archive_path)?;

        let root = root.canonicalize();
        if !entries.is_directory(&root) {
            let entry = root.to_string();
            return Err(if entries.file(&root).is_some() {
                ConfigurationError::RootEntryNotADirectory {
                    archive: archive_path,
                    entry,
                }
            } else {
                ConfigurationError::RootEntryMissing {
                    archive: archive_path,
                    entry,
                }
            });
        }

        let identity = RepositoryIdentity::generate();
        tracing::debug!(
            archive = %archive_path.display(),
            %root,
            files = entries.files.len(),
            repository = %identity,
            "Opened archive repository"
        );
        Ok(Self {
            identity,
            archive_path,
            root,
            entries,
            archive: Mutex::new(archive),
        })
    }

    /// Create a repository from an `archive:` base URI.
    pub fn from_uri(uri: &BaseUri) -> std::result::Result<Self, ConfigurationError> {
        match uri {
            BaseUri::Archive { file, entry } => Self::with_root(file, entry),
            BaseUri::Directory(_) => Err(ConfigurationError::UnsupportedScheme {
                uri: uri.to_string(),
                scheme: "file".into(),
            }),
        }
    }

    /// Parse an `archive:<file-uri>!<entry>` URI and open the repository.
    pub fn parse(uri: &str) -> std::result::Result<Self, ConfigurationError> {
        Self::from_uri(&BaseUri::parse(uri)?)
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// The in-archive root directory, empty for the archive root.
    pub fn root(&self) -> &RelativePath {
        &self.root
    }

    /// Find the file entry for a canonical repo-relative path, trying the
    /// module suffixes in order.
    fn lookup(&self, relative: &RelativePath) -> Option<(RelativePath, FileEntry)> {
        for suffix in MODULE_SUFFIXES {
            let candidate = relative.with_suffix(suffix)?;
            if let Some(entry) = self.entries.file(&self.root.append(&candidate)) {
                return Some((candidate, entry));
            }
        }
        None
    }

    fn entry_for(&self, path: &RelativePath) -> Result<(RelativePath, FileEntry)> {
        let relative = self
            .identity
            .repo_relative(path)
            .ok_or_else(|| Error::ForeignPath {
                path: path.to_absolute_string(),
            })?;
        let relative = relative.canonicalize_within().ok_or_else(|| Error::Traversal {
            path: path.to_absolute_string(),
        })?;
        self.lookup(&relative).ok_or_else(|| Error::NotFound {
            path: path.to_absolute_string(),
        })
    }
}

impl ModuleRepository for ArchiveRepository {
    fn identity(&self) -> &RepositoryIdentity {
        &self.identity
    }

    fn resolve_module_path(&self, path: &RelativePath) -> Option<RelativePath> {
        tracing::debug!(%path, archive = %self.archive_path.display(), "Resolving module path");
        let relative = repo_relative_reference(&self.identity, path)?;
        match self.lookup(&relative) {
            Some((found, _)) => {
                let resolved = self.identity.namespace(&found);
                tracing::debug!(%path, %resolved, "Resolved module path");
                Some(resolved)
            }
            None => {
                tracing::debug!(%path, archive = %self.archive_path.display(), "No matching archive entry found");
                None
            }
        }
    }

    fn open_for_read(&self, path: &RelativePath) -> Result<ByteStream> {
        let (found, entry) = self.entry_for(path)?;
        let name = self.root.append(&found).to_string();

        let mut archive = self.archive.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = archive.by_index(entry.index).map_err(|source| Error::Archive {
            archive: self.archive_path.clone(),
            entry: name.clone(),
            source,
        })?;
        // The declared size comes from the central directory and is not
        // trusted for allocation
        let mut bytes = Vec::with_capacity(entry.len.min(MAX_PRESIZE) as usize);
        file.by_ref()
            .take(entry.len)
            .read_to_end(&mut bytes)
            .map_err(|e| Error::io(self.archive_path.join(&name), e))?;

        tracing::debug!(%path, entry = %name, bytes = bytes.len(), "Read archive entry into memory");
        Ok(ByteStream::from_bytes(bytes))
    }

    fn metadata(&self, path: &RelativePath) -> Result<EntryMetadata> {
        let (_, entry) = self.entry_for(path)?;
        Ok(EntryMetadata {
            len: entry.len,
            kind: EntryKind::File,
        })
    }

    fn base_uri(&self) -> BaseUri {
        BaseUri::Archive {
            file: self.archive_path.clone(),
            entry: self.root.clone(),
        }
    }
}

impl fmt::Debug for ArchiveRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveRepository")
            .field("identity", &self.identity)
            .field("archive_path", &self.archive_path)
            .field("root", &self.root)
            .field("files", &self.entries.files.len())
            .finish_non_exhaustive()
    }
}

impl Drop for ArchiveRepository {
    fn drop(&mut self) {
        tracing::debug!(
            archive = %self.archive_path.display(),
            repository = %self.identity,
            "Released archive handle"
        );
    }
}
