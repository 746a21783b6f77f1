//! Relative paths for module references and repository entries
//!
//! Module references (`./lib/util`, `../shared/log.mjs`), paths of files
//! below a repository root and names of archive entries are all handled as
//! a [`RelativePath`]: an ordered sequence of segments without any notion
//! of a platform separator, drive letter or root.
//!
//! `std::path::Path` is only used at I/O boundaries, see
//! [`RelativePath::to_native`] and [`RelativePath::from_native`].

use std::convert::Infallible;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use uuid::Uuid;

use crate::{Error, MODULE_REPO_TAG, Result};

const CURRENT_DIR: &str = ".";
const PARENT_DIR: &str = "..";

/// An immutable, ordered sequence of non-empty path segments.
///
/// Equality, ordering and prefix tests are segment-wise: `ab/c` is not a
/// prefix of `abc/d`. The empty path has zero segments and is the neutral
/// element of [`append`](Self::append).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativePath {
    segments: Vec<String>,
}

impl RelativePath {
    /// The empty path.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a delimited path.
    ///
    /// Both `/` and `\` delimit segments. Leading, trailing and repeated
    /// delimiters are ignored, so `/a//b/` parses to the segments `a`, `b`.
    pub fn parse(text: &str) -> Self {
        let segments = text
            .split(['/', '\\'])
            .filter(|segment| !segment.is_empty())
            .map(str::to_owned)
            .collect();
        Self { segments }
    }

    /// Build a path from individual segments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSegment`] if a segment is empty or contains a
    /// path separator.
    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments = segments
            .into_iter()
            .map(|segment| validate_segment(segment.into()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { segments })
    }

    /// Convert a native relative path, e.g. the result of
    /// `Path::strip_prefix`, into a `RelativePath`.
    ///
    /// Returns `None` for absolute paths and for segments that are not
    /// valid UTF-8 or that contain a separator character.
    pub fn from_native(path: &Path) -> Option<Self> {
        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(name) => {
                    let name = name.to_str()?;
                    if name.contains(['/', '\\']) {
                        return None;
                    }
                    segments.push(name.to_owned());
                }
                Component::CurDir => {}
                Component::ParentDir => segments.push(PARENT_DIR.to_owned()),
                Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        Some(Self { segments })
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments, counting `.` and `..`.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }

    /// The last segment, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// All but the last segment. `None` for the empty path.
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.segments.split_last()?;
        Some(Self {
            segments: parent.to_vec(),
        })
    }

    /// A new path with the segments of `other` appended.
    pub fn append(&self, other: &RelativePath) -> Self {
        let mut segments = Vec::with_capacity(self.len() + other.len());
        segments.extend_from_slice(&self.segments);
        segments.extend_from_slice(&other.segments);
        Self { segments }
    }

    /// A new path with one validated segment appended.
    pub fn join(&self, segment: &str) -> Result<Self> {
        let segment = validate_segment(segment.to_owned())?;
        let mut segments = self.segments.clone();
        segments.push(segment);
        Ok(Self { segments })
    }

    /// The segments in `from..to`, or `None` if the range is out of bounds.
    pub fn subrange(&self, from: usize, to: usize) -> Option<Self> {
        let segments = self.segments.get(from..to)?;
        Some(Self {
            segments: segments.to_vec(),
        })
    }

    /// Segment-wise prefix test.
    pub fn starts_with(&self, other: &RelativePath) -> bool {
        self.segments.starts_with(&other.segments)
    }

    /// The remainder after `prefix`, or `None` if `prefix` doesn't match.
    pub fn strip_prefix(&self, prefix: &RelativePath) -> Option<Self> {
        if !self.starts_with(prefix) {
            return None;
        }
        self.subrange(prefix.len(), self.len())
    }

    /// A copy of this path with `suffix` appended to the last segment.
    ///
    /// Returns `None` for the empty path, and for suffixes that contain a
    /// separator.
    pub fn with_suffix(&self, suffix: &str) -> Option<Self> {
        if suffix.contains(['/', '\\']) {
            return None;
        }
        let (last, parent) = self.segments.split_last()?;
        let mut segments = parent.to_vec();
        segments.push(format!("{last}{suffix}"));
        Some(Self { segments })
    }

    /// Resolve `.` and `..` segments without touching the file system.
    ///
    /// `.` is skipped, `..` removes the previously kept segment. A `..`
    /// with nothing left to remove is dropped, so `../a` canonicalizes to
    /// `a`. The result never contains `.` or `..`, which makes the
    /// operation idempotent.
    pub fn canonicalize(&self) -> Self {
        let mut canonical: Vec<String> = Vec::with_capacity(self.len());
        for segment in &self.segments {
            match segment.as_str() {
                CURRENT_DIR => {}
                PARENT_DIR => {
                    canonical.pop();
                }
                _ => canonical.push(segment.clone()),
            }
        }
        Self {
            segments: canonical,
        }
    }

    /// Like [`canonicalize`](Self::canonicalize), but returns `None` if a
    /// `..` segment would climb above the first segment.
    ///
    /// Repositories use this to detect references that try to leave their
    /// root.
    pub fn canonicalize_within(&self) -> Option<Self> {
        let mut canonical: Vec<String> = Vec::with_capacity(self.len());
        for segment in &self.segments {
            match segment.as_str() {
                CURRENT_DIR => {}
                PARENT_DIR => {
                    canonical.pop()?;
                }
                _ => canonical.push(segment.clone()),
            }
        }
        Some(Self {
            segments: canonical,
        })
    }

    /// Resolve this path relative to the directory `base`.
    ///
    /// A path that already carries a repository marker (see
    /// [`has_repository_marker`](Self::has_repository_marker)) is returned
    /// unchanged. Otherwise the result is `base` + `self`, canonicalized.
    pub fn resolve_against_directory_context(&self, base: &RelativePath) -> Self {
        if self.has_repository_marker() {
            return self.clone();
        }
        base.append(self).canonicalize()
    }

    /// Resolve this path relative to the directory containing `file`.
    pub fn resolve_against_file_context(&self, file: &RelativePath) -> Self {
        match file.parent() {
            Some(parent) => self.resolve_against_directory_context(&parent),
            None => self.resolve_against_directory_context(&RelativePath::empty()),
        }
    }

    /// True if the path starts with `es-module-repo/<uuid>`.
    ///
    /// The tag is compared case-insensitively; the second segment must
    /// parse as a UUID.
    pub fn has_repository_marker(&self) -> bool {
        match (self.segment(0), self.segment(1)) {
            (Some(tag), Some(uuid)) => {
                tag.eq_ignore_ascii_case(MODULE_REPO_TAG) && Uuid::parse_str(uuid).is_ok()
            }
            _ => false,
        }
    }

    /// Map this path below a native base directory.
    pub fn to_native(&self, base: &Path) -> PathBuf {
        let mut native = base.to_path_buf();
        native.extend(&self.segments);
        native
    }

    /// Render with a leading `/`, the form used for namespaced module paths.
    pub fn to_absolute_string(&self) -> String {
        format!("/{self}")
    }
}

fn validate_segment(segment: String) -> Result<String> {
    if segment.is_empty() {
        return Err(Error::InvalidSegment {
            segment,
            reason: "segment must not be empty".into(),
        });
    }
    if segment.contains(['/', '\\']) {
        return Err(Error::InvalidSegment {
            segment,
            reason: "segment must not contain a path separator".into(),
        });
    }
    Ok(segment)
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl FromStr for RelativePath {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for RelativePath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for RelativePath {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl<'a> IntoIterator for &'a RelativePath {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ignores_redundant_separators() {
        let path = RelativePath::parse("/a//b/");
        assert_eq!(path.segments(), ["a", "b"]);
    }

    #[test]
    fn empty_is_neutral_for_append() {
        let path = RelativePath::parse("a/b");
        assert_eq!(path.append(&RelativePath::empty()), path);
        assert_eq!(RelativePath::empty().append(&path), path);
    }

    #[test]
    fn from_segments_rejects_separators() {
        assert!(RelativePath::from_segments(["a", "b/c"]).is_err());
        assert!(RelativePath::from_segments(["a", ""]).is_err());
        assert!(RelativePath::from_segments(["a", "b"]).is_ok());
    }

    #[test]
    fn canonicalize_within_detects_escape() {
        assert_eq!(
            RelativePath::parse("a/../b").canonicalize_within(),
            Some(RelativePath::parse("b"))
        );
        assert_eq!(RelativePath::parse("a/../../b").canonicalize_within(), None);
        assert_eq!(RelativePath::parse("../b").canonicalize_within(), None);
    }

    #[test]
    fn with_suffix_extends_last_segment() {
        let path = RelativePath::parse("lib/util");
        assert_eq!(path.with_suffix(".mjs").unwrap().to_string(), "lib/util.mjs");
        assert!(RelativePath::empty().with_suffix(".js").is_none());
    }

    #[test]
    fn marker_requires_uuid() {
        let marked = RelativePath::parse("/es-module-repo/0f0d2a36-7a4c-4a59-9d3c-1f1b3a2b4c5d/a");
        assert!(marked.has_repository_marker());
        assert!(!RelativePath::parse("/es-module-repo/not-a-uuid/a").has_repository_marker());
        assert!(!RelativePath::parse("es-module-repo").has_repository_marker());
    }
}
