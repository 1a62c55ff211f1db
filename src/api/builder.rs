use std::{env, path::PathBuf};

use crate::{
    command::{ExecutionMode, SystemRunner},
    git::{discovery::default_remotes, remote::Remote, repository::RepositoryAcquirer},
    model::{IdentityConfig, MirrorReference},
    CloneLite,
};

#[derive(Default)]
pub struct CloneLiteBuilder {
    clone_root: Option<PathBuf>,
    mirror_root: Option<PathBuf>,
    remotes: Vec<String>,
    identity: IdentityConfig,
    versioned: bool,
    dry_run: bool,
    verbose: bool,
}

impl CloneLiteBuilder {
    /// Directory that receives all clones.
    ///
    /// Defaults to the current directory.
    pub fn clone_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.clone_root = Some(path.into());
        self
    }

    /// Directory holding `<repo>.git` mirrors that clones borrow objects from.
    pub fn mirror_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.mirror_root = Some(path.into());
        self
    }

    /// Candidate remote, probed in the order added.
    ///
    /// Defaults to `ssh://git@github.com` then `https://github.com`.
    pub fn remote(mut self, remote: impl Into<String>) -> Self {
        self.remotes.push(remote.into());
        self
    }

    pub fn remotes<I, S>(mut self, remotes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.remotes.extend(remotes.into_iter().map(Into::into));
        self
    }

    pub fn identity(mut self, identity: IdentityConfig) -> Self {
        self.identity = identity;
        self
    }

    /// Check out into `<repo>/<revision>` so several revisions can coexist.
    pub fn versioned(mut self, versioned: bool) -> Self {
        self.versioned = versioned;
        self
    }

    /// Log mutating git commands instead of running them.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn try_build(self) -> anyhow::Result<CloneLite> {
        let Self {
            clone_root,
            mirror_root,
            remotes,
            identity,
            versioned,
            dry_run,
            verbose,
        } = self;

        let clone_root = match clone_root {
            Some(root) => root,
            None => env::current_dir()?,
        };

        let remotes = if remotes.is_empty() {
            default_remotes()
        } else {
            remotes
                .iter()
                .map(|remote| Remote::parse(remote))
                .collect::<Result<Vec<_>, _>>()?
        };

        let mode = if dry_run {
            ExecutionMode::DryRun
        } else {
            ExecutionMode::Execute
        };

        Ok(CloneLite {
            acquirer: RepositoryAcquirer::new(SystemRunner::new(mode, verbose)),
            remotes,
            clone_root,
            mirror: mirror_root.map(MirrorReference::new),
            identity,
            versioned,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::lock_working_directory;

    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let _cwd = lock_working_directory();
        let clone_lite = CloneLite::builder().try_build().unwrap();
        assert_eq!(clone_lite.remotes, default_remotes());
        assert_eq!(clone_lite.clone_root, env::current_dir().unwrap());
        assert_eq!(clone_lite.mirror, None);
        assert!(!clone_lite.versioned);
    }

    #[test]
    fn custom_remotes_keep_their_order() {
        let clone_lite = CloneLite::builder()
            .remote("https://gitlab.com")
            .remotes(["git@gitlab.com"])
            .try_build()
            .unwrap();
        let remotes: Vec<&str> = clone_lite.remotes.iter().map(Remote::as_str).collect();
        assert_eq!(remotes, vec!["https://gitlab.com", "git@gitlab.com"]);
    }

    #[test]
    fn invalid_remote_is_rejected() {
        assert!(CloneLite::builder()
            .remote("svn://example.com")
            .try_build()
            .is_err());
    }
}
