//! ES module resolution facade
//!
//! [`ModuleResolver`] is what a scripting runtime talks to. It owns an
//! optional system repository plus an ordered list of user-defined
//! repositories and routes every request either to the repository that owns
//! a namespaced path or to the real file system.
//!
//! ```text
//!              scripting runtime
//!                     |
//!               ModuleResolver
//!                     |
//!     +---------------+---------------+
//!     |               |               |
//!  system repo   user repos...   real file system
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::io::Read;
//! use esm_resolver::{ModuleResolver, RepositorySettings};
//!
//! let settings = RepositorySettings {
//!     system: None,
//!     repositories: vec!["file:///opt/modules/".into()],
//! };
//! let (resolver, report) = ModuleResolver::from_settings(&settings);
//! assert!(report.is_complete());
//!
//! if let Some(handle) = resolver.resolve("./lib/util") {
//!     let mut source = String::new();
//!     resolver.open(&handle)?.read_to_string(&mut source)?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod path;
pub mod resolver;
pub mod settings;

pub use error::{Error, Result};
pub use path::{AccessMode, ModuleHandle, ModulePath};
pub use resolver::{ModuleResolver, SharedRepository};
pub use settings::{LoadReport, RepositorySettings, SkippedEntry};
