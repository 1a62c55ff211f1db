use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    time::Duration,
};

use git2::Repository;
use log::{debug, info, trace};
use thiserror::Error;

use crate::{
    command::{CommandError, CommandRunner, ExecutionMode},
    directory::{expand, DirectoryError, DirectoryOptions, ScopedDirectory},
    flock::FileLock,
    model::{CloneDestination, IdentityConfig, MirrorReference},
};

use super::{checkout, clean, clone, config_set, remote::Remote};

const LOCK_FILE_NAME: &str = ".clone-lite.lock";
const LOCK_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Error, Debug)]
pub enum AcquireError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("Clone root {root} is busy: {source}")]
    Lock {
        root: PathBuf,
        source: crate::flock::Error,
    },
    #[error("{path} exists but is not a git repository, remove it to clone again: {source}")]
    NotARepository {
        path: PathBuf,
        source: git2::Error,
    },
}

/// Everything needed to materialise one repository at one revision.
#[derive(Debug, Clone)]
pub struct AcquireRequest {
    pub remote: Remote,
    pub destination: CloneDestination,
    pub revision: String,
    pub mirror: Option<MirrorReference>,
    pub identity: IdentityConfig,
}

/// Clones, cleans, checks out and configures repositories through a [`CommandRunner`].
///
/// The acquirer remembers which effective paths it has cloned, so within one
/// process a path is cloned at most once even when nothing reaches the disk.
pub struct RepositoryAcquirer<R> {
    runner: R,
    cloned: HashSet<PathBuf>,
}

impl<R: CommandRunner> RepositoryAcquirer<R> {
    pub fn new(runner: R) -> Self {
        RepositoryAcquirer {
            runner,
            cloned: HashSet::new(),
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Returns the effective local path of the checked out repository.
    pub fn acquire(&mut self, request: &AcquireRequest) -> Result<PathBuf, AcquireError> {
        let dry_run = self.runner.mode() == ExecutionMode::DryRun;
        let options = DirectoryOptions {
            create_if_missing: true,
            verbose: self.runner.verbose(),
            dry_run,
        };

        let clone_root = expand(&request.destination.clone_root)?;
        let mirror = request
            .mirror
            .as_ref()
            .map(|mirror| expand(mirror.root()).map(MirrorReference::new))
            .transpose()?;
        let destination = CloneDestination {
            clone_root,
            ..request.destination.clone()
        };
        let repo_path = destination.repo_path(&request.revision);
        let effective_path = destination.effective_path(&request.revision);

        let root = ScopedDirectory::enter([&destination.clone_root], options)?;
        let _lock = if dry_run {
            None
        } else {
            Some(Self::acquire_lock(root.path(), LOCK_TIMEOUT)?)
        };

        if self.needs_clone(&effective_path)? {
            let reference = mirror
                .as_ref()
                .map(|mirror| mirror.reference_for(&destination.repo_name));
            let url = request.remote.join(destination.repo_name.as_str());
            info!("Cloning {} into {}", url, effective_path.display());
            let mut command = clone(reference.as_deref(), &url, &repo_path);
            if self.runner.verbose() {
                command = command.inherit_output();
            }
            self.runner.run(&command)?;
            self.cloned.insert(effective_path.clone());
        } else {
            debug!("{} already present, skipping clone", effective_path.display());
        }

        {
            let _repo = ScopedDirectory::enter([&effective_path], options)?;
            self.runner.run(&clean())?;
            info!("Checking out {} in {}", request.revision, effective_path.display());
            self.runner.run(&checkout(&request.revision))?;
            self.configure(&request.identity)?;
        }

        Ok(effective_path)
    }

    fn needs_clone(&self, path: &Path) -> Result<bool, AcquireError> {
        if self.cloned.contains(path) {
            return Ok(false);
        }
        if !path.exists() {
            return Ok(true);
        }
        trace!("Opening existing repository at {}", path.display());
        Repository::open(path).map_err(|source| AcquireError::NotARepository {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(false)
    }

    fn configure(&self, identity: &IdentityConfig) -> Result<(), AcquireError> {
        if let Some((name, email)) = identity.name_and_email() {
            self.runner.run(&config_set("user.name", name))?;
            self.runner.run(&config_set("user.email", email))?;
        }
        if let Some(signing_key) = &identity.signing_key {
            self.runner.run(&config_set("user.signingkey", signing_key))?;
        }
        Ok(())
    }

    fn acquire_lock(clone_root: &Path, timeout: Duration) -> Result<FileLock, AcquireError> {
        trace!("Locking clone root {}", clone_root.display());
        FileLock::acquire(&clone_root.join(LOCK_FILE_NAME), timeout).map_err(|source| {
            AcquireError::Lock {
                root: clone_root.to_path_buf(),
                source,
            }
        })
    }
}
