use std::{
    fmt::{Display, Formatter},
    str::FromStr,
    sync::OnceLock,
};

use regex_lite::Regex;
use thiserror::Error;

/// Schemes git accepts in URL form.
const URL_SCHEMES: [&str; 5] = ["ssh", "git", "http", "https", "file"];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Remote must not be empty")]
    Empty,
    #[error("Unsupported remote scheme `{scheme}` in {remote}")]
    UnsupportedScheme { scheme: String, remote: String },
    #[error("Could not recognise remote {0}")]
    Unrecognised(String),
}

/// How a remote prefix and a repository name are glued together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteKind {
    /// `scheme://host[/path]`, joined with `/`.
    Url,
    /// `[user@]host`, joined with `:`.
    ScpLike,
    /// `[user@]host:path`, already past the `:`, joined with `/`.
    ScpLikeWithPath,
    /// A path on the local filesystem, joined with `/`.
    Local,
}

/// A remote host prefix that repository names are appended to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    prefix: String,
    kind: RemoteKind,
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.-]*)://.+$").unwrap())
}

fn scp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:[^@/:]+@)?[^@/:]+(?P<path>:.*)?$").unwrap())
}

impl Remote {
    pub fn parse(remote: &str) -> Result<Remote, RemoteError> {
        let trimmed = remote.trim();
        if trimmed.is_empty() {
            return Err(RemoteError::Empty);
        }

        let kind = if let Some(captures) = url_regex().captures(trimmed) {
            let scheme = captures["scheme"].to_ascii_lowercase();
            if !URL_SCHEMES.contains(&scheme.as_str()) {
                return Err(RemoteError::UnsupportedScheme {
                    scheme,
                    remote: trimmed.to_owned(),
                });
            }
            RemoteKind::Url
        } else if trimmed.contains("://") {
            return Err(RemoteError::Unrecognised(trimmed.to_owned()));
        } else if trimmed.starts_with('/') || trimmed.starts_with('.') {
            RemoteKind::Local
        } else if let Some(captures) = scp_regex().captures(trimmed) {
            match captures.name("path") {
                Some(path) if path.as_str().len() > 1 => RemoteKind::ScpLikeWithPath,
                _ => RemoteKind::ScpLike,
            }
        } else {
            return Err(RemoteError::Unrecognised(trimmed.to_owned()));
        };

        let prefix = match kind {
            RemoteKind::ScpLike => trimmed.trim_end_matches(':'),
            _ => trimmed.trim_end_matches('/'),
        };

        Ok(Remote {
            prefix: prefix.to_owned(),
            kind,
        })
    }

    pub fn kind(&self) -> RemoteKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    pub fn separator(&self) -> char {
        match self.kind {
            RemoteKind::ScpLike => ':',
            RemoteKind::Url | RemoteKind::ScpLikeWithPath | RemoteKind::Local => '/',
        }
    }

    /// Full git URL of `repository` on this remote.
    pub fn join(&self, repository: &str) -> String {
        let repository = repository.trim_start_matches('/');
        format!("{}{}{}", self.prefix, self.separator(), repository)
    }
}

impl FromStr for Remote {
    type Err = RemoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Remote::parse(s)
    }
}

impl Display for Remote {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn url_remotes_join_with_slash() {
        let remote = Remote::parse("https://github.com").unwrap();
        assert_eq!(remote.kind(), RemoteKind::Url);
        assert_eq!(remote.join("org/repo"), "https://github.com/org/repo");

        let remote = Remote::parse("ssh://git@github.com/").unwrap();
        assert_eq!(remote.join("org/repo"), "ssh://git@github.com/org/repo");
    }

    #[test]
    fn scp_like_remotes_join_with_colon() {
        let remote = Remote::parse("git@github.com").unwrap();
        assert_eq!(remote.kind(), RemoteKind::ScpLike);
        assert_eq!(remote.join("org/repo"), "git@github.com:org/repo");

        let remote = Remote::parse("git@github.com:").unwrap();
        assert_eq!(remote.join("org/repo"), "git@github.com:org/repo");

        let remote = Remote::parse("git@github.com:org").unwrap();
        assert_eq!(remote.kind(), RemoteKind::ScpLikeWithPath);
        assert_eq!(remote.join("repo"), "git@github.com:org/repo");
    }

    #[test]
    fn local_paths() {
        let remote = Remote::parse("/srv/git/").unwrap();
        assert_eq!(remote.kind(), RemoteKind::Local);
        assert_eq!(remote.join("repo"), "/srv/git/repo");
    }

    #[test]
    fn rejects_unknown_schemes() {
        assert_eq!(
            Remote::parse("svn://example.com"),
            Err(RemoteError::UnsupportedScheme {
                scheme: "svn".to_owned(),
                remote: "svn://example.com".to_owned()
            })
        );
        assert_eq!(Remote::parse("  "), Err(RemoteError::Empty));
        assert!(Remote::parse("a@b@c").is_err());
    }
}
