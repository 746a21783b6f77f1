//! Naming constants shared by all module repositories.

/// First segment of every repository-namespaced module path.
///
/// A namespaced path looks like `/es-module-repo/<uuid>/lib/module.mjs`.
pub const MODULE_REPO_TAG: &str = "es-module-repo";

/// Suffixes tried, in order, when looking up the file behind a module reference.
///
/// The bare name wins over `.mjs`, which wins over `.js`.
pub const MODULE_SUFFIXES: [&str; 3] = ["", ".mjs", ".js"];
