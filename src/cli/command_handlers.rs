use std::path::PathBuf;

use log::debug;

use crate::{
    cli::args::{CloneArgs, StaleArgs},
    config::CloneLiteConfig,
    model::{IdentityConfig, RepositorySpec},
    CloneLite,
};

/// Initialises logging for a binary; `RUST_LOG` still takes precedence.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Handler to the clone command, returns the effective local path
pub fn do_clone(args: CloneArgs, config: CloneLiteConfig) -> anyhow::Result<PathBuf> {
    let spec = RepositorySpec::new(&args.repospec, Some(args.revision.clone()))?;
    let remotes = candidate_remotes(&args, &config);
    let clone_root = args.clonepath.clone().or(config.clone_path.clone());
    let mirror_root = args.mirrorpath.clone().or(config.mirror_path.clone());
    let identity = identity(&args, config.identity);

    debug!(
        "Cloning {} at {} into {:?} (mirror {:?}, versioning {})",
        spec.specifier, spec.revision, clone_root, mirror_root, args.versioning
    );

    let mut builder = CloneLite::builder()
        .remotes(remotes)
        .identity(identity)
        .versioned(args.versioning)
        .dry_run(args.dry_run)
        .verbose(args.verbose);
    if let Some(clone_root) = clone_root {
        builder = builder.clone_root(clone_root);
    }
    if let Some(mirror_root) = mirror_root {
        builder = builder.mirror_root(mirror_root);
    }

    let path = builder.try_build()?.acquire(&spec)?;
    Ok(path)
}

/// Handler to the stale branch report, returns the YAML document
pub fn do_stale_report(args: StaleArgs) -> anyhow::Result<String> {
    let report = CloneLite::builder()
        .verbose(args.verbose)
        .try_build()?
        .stale_report(args.days, &args.reference)?;
    debug!("{} authors with stale branches", report.authors.len());
    Ok(report.to_yaml()?)
}

/// Remotes given on the command line replace the configured ones
fn candidate_remotes(args: &CloneArgs, config: &CloneLiteConfig) -> Vec<String> {
    if args.remotes.is_empty() {
        config.remotes.clone().unwrap_or_default()
    } else {
        args.remotes.clone()
    }
}

/// Identity fields from the command line win field by field
fn identity(args: &CloneArgs, configured: IdentityConfig) -> IdentityConfig {
    IdentityConfig {
        name: args.name.clone(),
        email: args.email.clone(),
        signing_key: args.signing_key.clone(),
    }
    .or(configured)
}
