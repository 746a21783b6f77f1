//! [`ArchiveBuilder`] for archive repository scenarios.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

enum Entry {
    Directory(String),
    File(String, Vec<u8>),
}

/// Collects entries and writes them as a zip archive.
///
/// Entries are written in insertion order and exactly as named, so tests
/// control whether explicit directory entries exist.
///
/// # Example
///
/// ```rust,no_run
/// use esm_test_utils::ArchiveBuilder;
///
/// let (_dir, jar) = ArchiveBuilder::new()
///     .dir("js/v3/")
///     .file("js/v3/lib/x.js", "export const x = 1;")
///     .build_temp("modules.jar");
/// ```
#[derive(Default)]
pub struct ArchiveBuilder {
    entries: Vec<Entry>,
    compression: Option<zip::CompressionMethod>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store entries uncompressed instead of deflated.
    pub fn stored(mut self) -> Self {
        self.compression = Some(zip::CompressionMethod::Stored);
        self
    }

    /// Add an explicit directory entry.
    pub fn dir(mut self, name: &str) -> Self {
        self.entries.push(Entry::Directory(name.to_owned()));
        self
    }

    /// Add a file entry.
    pub fn file(mut self, name: &str, content: impl AsRef<[u8]>) -> Self {
        self.entries
            .push(Entry::File(name.to_owned(), content.as_ref().to_vec()));
        self
    }

    /// Write the archive to `path`.
    ///
    /// # Panics
    /// Panics if the archive can't be written.
    pub fn write_to(&self, path: &Path) {
        let file = File::create(path)
            .unwrap_or_else(|e| panic!("ArchiveBuilder: failed to create {}: {e}", path.display()));
        let mut zip = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default()
            .compression_method(self.compression.unwrap_or(zip::CompressionMethod::Deflated));

        for entry in &self.entries {
            match entry {
                Entry::Directory(name) => {
                    zip.add_directory(name.as_str(), options)
                        .unwrap_or_else(|e| panic!("ArchiveBuilder: failed to add {name}: {e}"));
                }
                Entry::File(name, content) => {
                    zip.start_file(name.as_str(), options)
                        .unwrap_or_else(|e| panic!("ArchiveBuilder: failed to add {name}: {e}"));
                    zip.write_all(content)
                        .unwrap_or_else(|e| panic!("ArchiveBuilder: failed to write {name}: {e}"));
                }
            }
        }
        zip.finish()
            .unwrap_or_else(|e| panic!("ArchiveBuilder: failed to finish archive: {e}"));
    }

    /// Write the archive into a fresh temporary directory.
    ///
    /// The returned `TempDir` must be kept alive as long as the archive is
    /// used.
    pub fn build_temp(&self, file_name: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(file_name);
        self.write_to(&path);
        (dir, path)
    }
}
