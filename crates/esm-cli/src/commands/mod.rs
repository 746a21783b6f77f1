//! Command implementations for esm-cli

pub mod repos;
pub mod resolve;

pub use repos::{run_repos_add, run_repos_list, run_repos_remove};
pub use resolve::{run_cat, run_resolve};
