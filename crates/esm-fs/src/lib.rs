//! Path algebra and configuration I/O for the ES module resolver
//!
//! Provides the platform-independent [`RelativePath`] used for module
//! references and repository paths, plus safe I/O for persisted settings.

pub mod config;
pub mod constants;
pub mod error;
mod io;
pub mod path;

pub use config::ConfigStore;
pub use constants::{MODULE_REPO_TAG, MODULE_SUFFIXES};
pub use error::{Error, Result};
pub use path::RelativePath;
