//! [`ModuleTree`] builder for directory repository scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory populated with module files.
///
/// # Example
///
/// ```rust,no_run
/// use esm_test_utils::ModuleTree;
///
/// let tree = ModuleTree::new()
///     .file("a/b.mjs", "export const b = 1;")
///     .dir("empty");
/// tree.assert_file_exists("a/b.mjs");
/// ```
pub struct ModuleTree {
    temp_dir: TempDir,
}

impl Default for ModuleTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleTree {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` below the root.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write a file, creating parent directories as needed.
    ///
    /// # Panics
    /// Panics if the filesystem operations fail.
    pub fn file(self, relative: &str, content: &str) -> Self {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("ModuleTree::file: failed to create {}: {e}", parent.display()));
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("ModuleTree::file: failed to write {}: {e}", path.display()));
        self
    }

    /// Create a directory (and its parents).
    ///
    /// # Panics
    /// Panics if the directory can't be created.
    pub fn dir(self, relative: &str) -> Self {
        let path = self.path(relative);
        fs::create_dir_all(&path)
            .unwrap_or_else(|e| panic!("ModuleTree::dir: failed to create {}: {e}", path.display()));
        self
    }

    /// Assert that `relative` exists below the root.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, relative: &str) {
        let full_path = self.path(relative);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }
}
