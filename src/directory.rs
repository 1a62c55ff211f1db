use std::{
    env,
    path::{Component, Path, PathBuf},
};

use home::home_dir;
use log::{error, info, log, Level};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Could not find home directory to expand {path}")]
    HomeNotFound { path: String },
    #[error("Could not read the current directory: {0}")]
    CurrentDir(std::io::Error),
    #[error("Could not create directory {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Could not enter directory {path}: {source}")]
    Enter {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Expands a leading `~`, makes the path absolute and resolves `.` and `..` lexically.
pub fn expand(path: impl AsRef<Path>) -> Result<PathBuf, DirectoryError> {
    let path = path.as_ref();
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => {
            let home = home_dir().ok_or_else(|| DirectoryError::HomeNotFound {
                path: path.display().to_string(),
            })?;
            home.join(rest)
        }
        Err(_) => path.to_path_buf(),
    };
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        env::current_dir()
            .map_err(DirectoryError::CurrentDir)?
            .join(expanded)
    };
    Ok(normalize(&absolute))
}

/// Lexical normalization; `..` never climbs above the root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}

#[derive(Debug, Clone, Copy)]
pub struct DirectoryOptions {
    pub create_if_missing: bool,
    pub verbose: bool,
    /// Log the directory changes without performing them.
    pub dry_run: bool,
}

impl Default for DirectoryOptions {
    fn default() -> Self {
        DirectoryOptions {
            create_if_missing: true,
            verbose: false,
            dry_run: false,
        }
    }
}

/// Holds the process inside a working directory until dropped.
///
/// The previous working directory is restored on drop, so every exit path of the
/// enclosing scope (early returns, `?`, panics) leaves the process where it was.
/// Guards must be dropped in reverse order of creation, which plain scoping gives.
#[must_use = "the previous directory is restored as soon as the guard is dropped"]
pub struct ScopedDirectory {
    path: PathBuf,
    previous: Option<PathBuf>,
    verbose: bool,
}

impl ScopedDirectory {
    pub fn enter<I, P>(segments: I, options: DirectoryOptions) -> Result<Self, DirectoryError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let joined: PathBuf = segments
            .into_iter()
            .fold(PathBuf::new(), |acc, segment| acc.join(segment));
        let path = expand(joined)?;
        let current = env::current_dir().map_err(DirectoryError::CurrentDir)?;

        if path == current {
            return Ok(ScopedDirectory {
                path,
                previous: None,
                verbose: options.verbose,
            });
        }

        if options.dry_run {
            if options.create_if_missing && !path.exists() {
                info!("mkdir -p {}", path.display());
            }
            info!("cd {}", path.display());
            return Ok(ScopedDirectory {
                path,
                previous: None,
                verbose: options.verbose,
            });
        }

        if options.create_if_missing {
            std::fs::create_dir_all(&path).map_err(|source| DirectoryError::Create {
                path: path.clone(),
                source,
            })?;
        }
        env::set_current_dir(&path).map_err(|source| DirectoryError::Enter {
            path: path.clone(),
            source,
        })?;
        log!(level(options.verbose), "cd {}", path.display());

        Ok(ScopedDirectory {
            path,
            previous: Some(current),
            verbose: options.verbose,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScopedDirectory {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            match env::set_current_dir(&previous) {
                Ok(()) => log!(level(self.verbose), "cd {}", previous.display()),
                Err(e) => error!("Could not return to {}: {}", previous.display(), e),
            }
        }
    }
}

fn level(verbose: bool) -> Level {
    if verbose {
        Level::Info
    } else {
        Level::Debug
    }
}

/// Runs `body` inside the directory made of `segments`, restoring the working directory afterwards.
pub fn with_directory<I, P, F, T, E>(
    segments: I,
    options: DirectoryOptions,
    body: F,
) -> Result<T, E>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
    F: FnOnce(&Path) -> Result<T, E>,
    E: From<DirectoryError>,
{
    let guard = ScopedDirectory::enter(segments, options)?;
    body(guard.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::lock_working_directory;

    use pretty_assertions::assert_eq;

    #[test]
    fn normalize_resolves_dots() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn expand_resolves_home() {
        let home = home_dir().unwrap();
        assert_eq!(expand("~/code/../src").unwrap(), home.join("src"));
        assert_eq!(expand("~").unwrap(), normalize(&home));
    }

    #[test]
    fn expand_leaves_absolute_paths() {
        assert_eq!(expand("/tmp/x/").unwrap(), PathBuf::from("/tmp/x"));
    }

    #[test]
    fn creates_and_restores() {
        let _lock = lock_working_directory();
        let temp = tempfile::tempdir().unwrap();
        let before = env::current_dir().unwrap();
        let target = temp.path().join("a").join("b");

        let inside = with_directory([temp.path(), Path::new("a/b")], Default::default(), |_| {
            env::current_dir().map_err(DirectoryError::CurrentDir)
        })
        .unwrap();

        assert_eq!(inside.canonicalize().unwrap(), target.canonicalize().unwrap());
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn restores_when_body_fails() {
        let _lock = lock_working_directory();
        let temp = tempfile::tempdir().unwrap();
        let before = env::current_dir().unwrap();

        let result: Result<(), DirectoryError> =
            with_directory([temp.path()], Default::default(), |path| {
                Err(DirectoryError::HomeNotFound {
                    path: path.display().to_string(),
                })
            });

        assert!(result.is_err());
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn nested_guards_unwind_in_order() {
        let _lock = lock_working_directory();
        let temp = tempfile::tempdir().unwrap();
        let before = env::current_dir().unwrap();
        {
            let outer = ScopedDirectory::enter([temp.path()], Default::default()).unwrap();
            let outer_cwd = env::current_dir().unwrap();
            {
                let _inner = ScopedDirectory::enter(["inner"], Default::default()).unwrap();
                assert_eq!(
                    env::current_dir().unwrap().canonicalize().unwrap(),
                    outer.path().join("inner").canonicalize().unwrap()
                );
            }
            assert_eq!(env::current_dir().unwrap(), outer_cwd);
        }
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn missing_directory_without_create_fails() {
        let _lock = lock_working_directory();
        let temp = tempfile::tempdir().unwrap();
        let before = env::current_dir().unwrap();
        let options = DirectoryOptions {
            create_if_missing: false,
            ..Default::default()
        };

        let result = ScopedDirectory::enter([temp.path().join("missing")], options);

        assert!(matches!(result, Err(DirectoryError::Enter { .. })));
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn dry_run_does_not_touch_the_process() {
        let _lock = lock_working_directory();
        let temp = tempfile::tempdir().unwrap();
        let before = env::current_dir().unwrap();
        let target = temp.path().join("planned");
        let options = DirectoryOptions {
            dry_run: true,
            ..Default::default()
        };

        let guard = ScopedDirectory::enter([&target], options).unwrap();

        assert_eq!(guard.path(), normalize(&target));
        assert!(!target.exists());
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn current_directory_is_a_no_op() {
        let _lock = lock_working_directory();
        let before = env::current_dir().unwrap();
        let guard = ScopedDirectory::enter(["."], Default::default()).unwrap();
        assert_eq!(guard.path(), before);
        drop(guard);
        assert_eq!(env::current_dir().unwrap(), before);
    }
}
