//! Base-location URIs of module repositories
//!
//! Two forms are accepted:
//!
//! - `file:///path/to/modules/` names a directory repository
//! - `archive:file:///path/to/lib.jar!/js/v3` names an archive repository
//!   rooted at the in-archive directory `js/v3`. The part after `!` is
//!   optional; without it the archive root is used. `jar:` is accepted as an
//!   alias of `archive:`.
//!
//! Any other scheme is rejected.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use esm_fs::RelativePath;
use url::Url;

use crate::ConfigurationError;

const ARCHIVE_ENTRY_DELIMITER: char = '!';

/// Where a repository's modules live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseUri {
    Directory(PathBuf),
    Archive { file: PathBuf, entry: RelativePath },
}

impl BaseUri {
    /// Parse a `file:`, `archive:` or `jar:` URI.
    pub fn parse(text: &str) -> Result<Self, ConfigurationError> {
        let text = text.trim();
        let (scheme, rest) = text
            .split_once(':')
            .ok_or_else(|| invalid(text, "missing URI scheme"))?;

        match scheme.to_ascii_lowercase().as_str() {
            "file" => Ok(Self::Directory(file_uri_to_path(text, text)?)),
            "archive" | "jar" => {
                let (file_uri, entry) = match rest.rfind(ARCHIVE_ENTRY_DELIMITER) {
                    Some(idx) => (&rest[..idx], &rest[idx + 1..]),
                    None => (rest, ""),
                };
                let file = file_uri_to_path(file_uri, text)?;
                let entry = RelativePath::parse(entry);
                if entry.canonicalize_within().is_none() {
                    return Err(invalid(text, "archive entry path escapes the archive root"));
                }
                Ok(Self::Archive {
                    file,
                    entry: entry.canonicalize(),
                })
            }
            other => Err(ConfigurationError::UnsupportedScheme {
                uri: text.to_owned(),
                scheme: other.to_owned(),
            }),
        }
    }

    /// Derive a base URI from a plain path: a directory becomes a directory
    /// repository, a file an archive repository rooted at the archive root.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let absolute = std::path::absolute(path).map_err(|source| ConfigurationError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        if absolute.is_dir() {
            Ok(Self::Directory(absolute))
        } else if absolute.is_file() {
            Ok(Self::Archive {
                file: absolute,
                entry: RelativePath::empty(),
            })
        } else {
            Err(ConfigurationError::NotADirectory { path: absolute })
        }
    }

    /// Parse `text` as a URI if it has a known scheme, otherwise treat it as
    /// a plain path.
    pub fn parse_or_path(text: &str) -> Result<Self, ConfigurationError> {
        let has_scheme = text
            .split_once(':')
            .is_some_and(|(scheme, _)| {
                matches!(scheme.to_ascii_lowercase().as_str(), "file" | "archive" | "jar")
            });
        if has_scheme {
            Self::parse(text)
        } else {
            Self::from_path(text)
        }
    }

    pub fn is_archive(&self) -> bool {
        matches!(self, Self::Archive { .. })
    }
}

fn invalid(uri: &str, reason: impl Into<String>) -> ConfigurationError {
    ConfigurationError::InvalidUri {
        uri: uri.to_owned(),
        reason: reason.into(),
    }
}

fn file_uri_to_path(file_uri: &str, original: &str) -> Result<PathBuf, ConfigurationError> {
    let url = Url::parse(file_uri).map_err(|e| invalid(original, e.to_string()))?;
    if url.scheme() != "file" {
        return Err(invalid(
            original,
            format!("expected an embedded 'file' URI, got scheme '{}'", url.scheme()),
        ));
    }
    url.to_file_path()
        .map_err(|()| invalid(original, "URI doesn't name a local file path"))
}

impl fmt::Display for BaseUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory(path) => match Url::from_directory_path(path) {
                Ok(url) => write!(f, "{url}"),
                Err(()) => write!(f, "file://{}", path.display()),
            },
            Self::Archive { file, entry } => match Url::from_file_path(file) {
                Ok(url) => write!(f, "archive:{url}!/{entry}"),
                Err(()) => write!(f, "archive:file://{}!/{entry}", file.display()),
            },
        }
    }
}

impl FromStr for BaseUri {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
