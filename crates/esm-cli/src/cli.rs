//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// esm - Resolve ES modules across directory and archive repositories
#[derive(Parser, Debug)]
#[command(name = "esm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Repository settings file (TOML, JSON or YAML)
    #[arg(long, global = true, env = "ESM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Use this base URI or path as the system repository
    #[arg(long, global = true)]
    pub system: Option<String>,

    /// Additional repository (base URI, directory or archive path),
    /// searched after the configured ones
    #[arg(long = "repo", global = true)]
    pub repos: Vec<String>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve a module reference and print its handle
    ///
    /// Examples:
    ///   esm --repo ./modules resolve lib/util
    ///   esm resolve ./strings --from app/main
    Resolve {
        /// Module reference, e.g. "lib/util" or "./lib/util.mjs"
        reference: String,

        /// Resolve relative to this importing module
        #[arg(long, value_name = "REFERRER")]
        from: Option<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Resolve a module reference and write its source to stdout
    Cat {
        /// Module reference
        reference: String,

        /// Resolve relative to this importing module
        #[arg(long, value_name = "REFERRER")]
        from: Option<String>,
    },

    /// Manage the configured repositories
    Repos {
        #[command(subcommand)]
        action: ReposAction,
    },
}

/// Repository list actions
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ReposAction {
    /// Show configured repositories and whether they load
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Validate a repository and append it to the settings file
    Add {
        /// Base URI, directory or archive path
        location: String,
    },

    /// Remove a repository from the settings file
    Remove {
        /// Base URI, directory or archive path
        location: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_resolve_with_global_options() {
        let cli = Cli::parse_from([
            "esm", "--repo", "a", "resolve", "lib/x", "--repo", "b", "--json",
        ]);
        assert_eq!(cli.repos, vec!["a", "b"]);
        assert_eq!(
            cli.command,
            Commands::Resolve {
                reference: "lib/x".into(),
                from: None,
                json: true,
            }
        );
    }

    #[test]
    fn parse_repos_add() {
        let cli = Cli::parse_from(["esm", "repos", "add", "file:///opt/modules/"]);
        assert_eq!(
            cli.command,
            Commands::Repos {
                action: ReposAction::Add {
                    location: "file:///opt/modules/".into()
                }
            }
        );
    }
}
