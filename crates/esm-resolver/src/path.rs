//! Path values handed across the resolver boundary

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use esm_fs::RelativePath;

use crate::Error;

/// A path the resolver operates on.
///
/// Namespaced module paths are routed to the repository owning their
/// prefix; everything else is a plain path on the real file system.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModulePath {
    Module(RelativePath),
    Native(PathBuf),
}

impl ModulePath {
    pub fn is_module(&self) -> bool {
        matches!(self, Self::Module(_))
    }

    pub fn as_native(&self) -> Option<&Path> {
        match self {
            Self::Native(path) => Some(path),
            Self::Module(_) => None,
        }
    }

    /// The module handle, if this is a namespaced path.
    pub fn to_handle(&self) -> Option<ModuleHandle> {
        match self {
            Self::Module(path) => ModuleHandle::new(path.clone()),
            Self::Native(_) => None,
        }
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module(path) => write!(f, "{}", path.to_absolute_string()),
            Self::Native(path) => write!(f, "{}", path.display()),
        }
    }
}

impl From<ModuleHandle> for ModulePath {
    fn from(handle: ModuleHandle) -> Self {
        Self::Module(handle.0)
    }
}

/// Opaque handle of a resolved module.
///
/// Renders as `/es-module-repo/<uuid>/<repo-relative path>`. The runtime may
/// hand the string form back in, e.g. as the referrer of a nested import;
/// [`FromStr`] accepts it again.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleHandle(RelativePath);

impl ModuleHandle {
    /// Wrap a namespaced path. `None` if it doesn't carry a repository marker.
    pub fn new(path: RelativePath) -> Option<Self> {
        path.has_repository_marker().then_some(Self(path))
    }

    pub fn path(&self) -> &RelativePath {
        &self.0
    }

    pub fn into_path(self) -> RelativePath {
        self.0
    }
}

impl fmt::Display for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_absolute_string())
    }
}

impl FromStr for ModuleHandle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(RelativePath::parse(s)).ok_or_else(|| Error::InvalidHandle {
            handle: s.to_owned(),
        })
    }
}

/// Access checked by [`ModuleResolver::check_access`](crate::ModuleResolver::check_access).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
    Execute,
}
