//! Per-repository namespace tokens

use std::fmt;

use esm_fs::{MODULE_REPO_TAG, RelativePath};
use uuid::Uuid;

/// The unique path prefix `es-module-repo/<uuid>` of one repository.
///
/// Generated once when the repository is constructed. A path that starts
/// with this prefix was produced by, and can only be resolved against, the
/// repository holding the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryIdentity {
    uuid: Uuid,
    prefix: RelativePath,
}

impl RepositoryIdentity {
    /// Create an identity with a freshly generated UUID.
    pub fn generate() -> Self {
        Self::with_uuid(Uuid::new_v4())
    }

    pub fn with_uuid(uuid: Uuid) -> Self {
        let prefix = RelativePath::parse(&format!("{MODULE_REPO_TAG}/{uuid}"));
        Self { uuid, prefix }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// The two-segment prefix of every path this repository resolves.
    pub fn prefix(&self) -> &RelativePath {
        &self.prefix
    }

    /// True if `path` carries this identity's marker.
    ///
    /// The tag is compared case-insensitively and the UUID by value, so
    /// `ES-MODULE-REPO/<UUID in upper case>` still matches.
    pub fn owns(&self, path: &RelativePath) -> bool {
        match (path.segment(0), path.segment(1)) {
            (Some(tag), Some(uuid)) => {
                tag.eq_ignore_ascii_case(MODULE_REPO_TAG)
                    && Uuid::parse_str(uuid).is_ok_and(|uuid| uuid == self.uuid)
            }
            _ => false,
        }
    }

    /// Prepend the prefix to a repo-relative path.
    pub fn namespace(&self, repo_relative: &RelativePath) -> RelativePath {
        self.prefix.append(repo_relative)
    }

    /// Strip the prefix from a namespaced path owned by this identity.
    pub fn repo_relative(&self, path: &RelativePath) -> Option<RelativePath> {
        if !self.owns(path) {
            return None;
        }
        path.subrange(2, path.len())
    }
}

impl fmt::Display for RepositoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix.to_absolute_string())
    }
}
