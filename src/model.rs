use std::{
    fmt::Display,
    path::{Component, Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_REVISION: &str = "HEAD";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RepoNameError {
    #[error("Repository name is empty")]
    Empty,
    #[error("Repository name `{0}` must be a relative path without `.`, `..` or empty segments")]
    Escapes(String),
}

/// Host-relative repository path such as `org/repo`.
///
/// Surrounding slashes are trimmed, and every segment is a plain name, so joining
/// it onto a clone or mirror root never leaves that root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoName(String);

impl RepoName {
    pub fn parse(specifier: &str) -> Result<Self, RepoNameError> {
        let trimmed = specifier.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(RepoNameError::Empty);
        }
        let plain_segments = trimmed
            .split('/')
            .all(|segment| !matches!(segment, "" | "." | ".."));
        let relative = Path::new(trimmed)
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !plain_segments || !relative {
            return Err(RepoNameError::Escapes(specifier.to_owned()));
        }
        Ok(RepoName(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RepoName {
    type Err = RepoNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for RepoName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A repository together with the revision to check out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySpec {
    pub specifier: RepoName,
    pub revision: String,
}

impl RepositorySpec {
    pub fn new(specifier: &str, revision: Option<String>) -> Result<Self, RepoNameError> {
        Ok(RepositorySpec {
            specifier: RepoName::parse(specifier)?,
            revision: revision.unwrap_or_else(|| DEFAULT_REVISION.to_owned()),
        })
    }
}

/// Where a repository lands on disk.
///
/// The effective path doubles as the clone cache key: it depends on nothing
/// but these fields and the revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneDestination {
    pub clone_root: PathBuf,
    pub repo_name: RepoName,
    pub versioned: bool,
}

impl CloneDestination {
    pub fn new(clone_root: impl Into<PathBuf>, repo_name: RepoName, versioned: bool) -> Self {
        CloneDestination {
            clone_root: clone_root.into(),
            repo_name,
            versioned,
        }
    }

    /// Path relative to the clone root.
    pub fn repo_path(&self, revision: &str) -> PathBuf {
        let path = PathBuf::from(self.repo_name.as_str());
        if self.versioned {
            path.join(revision)
        } else {
            path
        }
    }

    pub fn effective_path(&self, revision: &str) -> PathBuf {
        self.clone_root.join(self.repo_path(revision))
    }
}

/// Local object cache that clones borrow from instead of downloading shared history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorReference {
    pub mirror_root: PathBuf,
}

impl MirrorReference {
    pub fn new(mirror_root: impl Into<PathBuf>) -> Self {
        MirrorReference {
            mirror_root: mirror_root.into(),
        }
    }

    /// `<mirror_root>/<repo_name>.git`
    pub fn reference_for(&self, repo_name: &RepoName) -> PathBuf {
        self.mirror_root.join(format!("{repo_name}.git"))
    }

    pub fn root(&self) -> &Path {
        &self.mirror_root
    }
}

/// Per-clone committer identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IdentityConfig {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "signingkey")]
    pub signing_key: Option<String>,
}

impl IdentityConfig {
    /// Name and email, only when both are set.
    pub fn name_and_email(&self) -> Option<(&str, &str)> {
        match (&self.name, &self.email) {
            (Some(name), Some(email)) => Some((name.as_str(), email.as_str())),
            _ => None,
        }
    }

    /// Fields set in `self` win over those in `fallback`.
    pub fn or(self, fallback: IdentityConfig) -> IdentityConfig {
        IdentityConfig {
            name: self.name.or(fallback.name),
            email: self.email.or(fallback.email),
            signing_key: self.signing_key.or(fallback.signing_key),
        }
    }
}
