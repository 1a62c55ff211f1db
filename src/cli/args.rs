use std::path::PathBuf;

use clap::Parser;

use crate::{model::DEFAULT_REVISION, stale::DEFAULT_REF};

/// Discovers which remote serves a repository, clones it and checks out a revision.
#[derive(Debug, Parser)]
#[clap(name = "clone-lite", version)]
pub struct CloneArgs {
    /// Host-relative repository path, e.g. `org/repo`
    pub repospec: String,
    /// Revision to check out
    #[clap(default_value = DEFAULT_REVISION)]
    pub revision: String,
    /// Path to store all cloned repos, defaults to the current directory
    #[clap(long, value_name = "PATH")]
    pub clonepath: Option<PathBuf>,
    /// Path to cached repos to support fast cloning
    #[clap(long, value_name = "PATH")]
    pub mirrorpath: Option<PathBuf>,
    /// Check out in <repo>/<revision> rather than <repo>
    #[clap(long)]
    pub versioning: bool,
    /// Candidate remote to probe, in priority order; may be repeated
    #[clap(long = "remote", value_name = "URL")]
    pub remotes: Vec<String>,
    /// Local user.name for the clone, applied together with --email
    #[clap(long)]
    pub name: Option<String>,
    /// Local user.email for the clone, applied together with --name
    #[clap(long)]
    pub email: Option<String>,
    /// Local user.signingkey for the clone
    #[clap(long, value_name = "KEY")]
    pub signing_key: Option<String>,
    /// Print the git commands instead of running them
    #[clap(long)]
    pub dry_run: bool,
    /// Turn on verbose output
    #[clap(short, long)]
    pub verbose: bool,
}

/// Generates a YAML report of stale remote branches grouped by author.
#[derive(Debug, Parser)]
#[clap(name = "stale-branches", version)]
pub struct StaleArgs {
    /// Number of days to consider a branch stale
    pub days: i64,
    /// Git reference to check
    #[clap(long = "ref", default_value = DEFAULT_REF)]
    pub reference: String,
    /// Turn on verbose output
    #[clap(short, long)]
    pub verbose: bool,
}
