use std::path::PathBuf;

use log::info;
use thiserror::Error;

use crate::{
    command::SystemRunner,
    git::{
        discovery::{discover, Discovered},
        remote::Remote,
        repository::{AcquireError, AcquireRequest, RepositoryAcquirer},
    },
    model::{CloneDestination, IdentityConfig, MirrorReference, RepositorySpec},
    stale::{find_stale_branches, StaleReport, StaleReportError},
};

mod builder;

pub use builder::CloneLiteBuilder;

#[derive(Error, Debug)]
pub enum CloneLiteError {
    #[error("Failed to discover repository: {specifier}")]
    DiscoveryExhausted { specifier: String },
    #[error(transparent)]
    Acquire(#[from] AcquireError),
}

/// Discovers and provisions repositories under one clone root.
pub struct CloneLite {
    acquirer: RepositoryAcquirer<SystemRunner>,
    remotes: Vec<Remote>,
    clone_root: PathBuf,
    mirror: Option<MirrorReference>,
    identity: IdentityConfig,
    versioned: bool,
}

impl CloneLite {
    pub fn builder() -> CloneLiteBuilder {
        CloneLiteBuilder::default()
    }

    /// Finds the first configured remote that serves `specifier`
    pub fn discover(&self, specifier: &str) -> Option<Discovered> {
        discover(self.acquirer.runner(), specifier, &self.remotes)
    }

    /// Discovers, clones if needed, checks out and configures `spec`, returning its local path
    pub fn acquire(&mut self, spec: &RepositorySpec) -> Result<PathBuf, CloneLiteError> {
        let Discovered { remote, .. } = self.discover(spec.specifier.as_str()).ok_or_else(|| {
            CloneLiteError::DiscoveryExhausted {
                specifier: spec.specifier.to_string(),
            }
        })?;
        info!("Using {} for {}", remote, spec.specifier);

        let request = AcquireRequest {
            remote,
            destination: CloneDestination::new(
                &self.clone_root,
                spec.specifier.clone(),
                self.versioned,
            ),
            revision: spec.revision.clone(),
            mirror: self.mirror.clone(),
            identity: self.identity.clone(),
        };
        Ok(self.acquirer.acquire(&request)?)
    }

    /// Reports branches under `reference` untouched for at least `days` days,
    /// in the repository of the current directory
    pub fn stale_report(
        &self,
        days: i64,
        reference: &str,
    ) -> Result<StaleReport, StaleReportError> {
        let branches = find_stale_branches(self.acquirer.runner(), days, reference)?;
        Ok(StaleReport::new(&branches))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn undiscoverable_repository_is_not_cloned() {
        let temp = tempfile::tempdir().unwrap();
        let clone_root = temp.path().join("clones");
        let mut clone_lite = CloneLite::builder()
            .clone_root(&clone_root)
            .remote(temp.path().join("no-such-remote").display().to_string())
            .try_build()
            .unwrap();

        let error = clone_lite
            .acquire(&RepositorySpec::new("org/repo", None).unwrap())
            .unwrap_err();

        assert!(matches!(
            error,
            CloneLiteError::DiscoveryExhausted { ref specifier } if specifier == "org/repo"
        ));
        assert_eq!(
            error.to_string(),
            "Failed to discover repository: org/repo"
        );
        assert!(!clone_root.exists());
    }
}
