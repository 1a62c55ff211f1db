use std::{
    fs::File,
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

use fs4::fs_std::FileExt;
use log::{debug, info, trace};
use thiserror::Error;

const RETRY_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot lock {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Gave up after {}s waiting for another clone-lite holding {path}", .waited.as_secs())]
    Timeout { path: PathBuf, waited: Duration },
}

/// Advisory exclusive lock on a file, held until dropped.
#[derive(Debug)]
pub struct FileLock {
    _file: File,
    path: PathBuf,
}

impl FileLock {
    /// Waits up to `timeout` for other processes holding `path` to let go.
    pub fn acquire(path: &Path, timeout: Duration) -> Result<Self, Error> {
        let io = |source| Error::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io)?;
        let start = Instant::now();
        let mut announced = false;
        while !file.try_lock_exclusive().map_err(io)? {
            let waited = start.elapsed();
            if waited >= timeout {
                return Err(Error::Timeout {
                    path: path.to_path_buf(),
                    waited,
                });
            }
            if !announced {
                info!("Waiting for another clone-lite to release {}", path.display());
                announced = true;
            }
            thread::sleep(RETRY_INTERVAL.min(timeout - waited));
        }
        debug!("Locked {}", path.display());
        Ok(FileLock {
            _file: file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        trace!("Releasing {}", self.path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_is_released_on_drop() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(".lock");

        let lock = FileLock::acquire(&path, Duration::ZERO).unwrap();
        assert_eq!(lock.path(), path);
        drop(lock);

        assert!(FileLock::acquire(&path, Duration::ZERO).is_ok());
    }

    #[test]
    fn held_lock_times_out() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join(".lock");
        let _held = FileLock::acquire(&path, Duration::ZERO).unwrap();

        let error = FileLock::acquire(&path, Duration::from_millis(50)).unwrap_err();

        match error {
            Error::Timeout { path: locked, waited } => {
                assert_eq!(locked, path);
                assert!(waited >= Duration::from_millis(50));
            }
            other => panic!("unexpected error {other}"),
        }
    }
}
