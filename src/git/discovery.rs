use log::{debug, info, warn};

use crate::command::CommandRunner;

use super::{ls_remote, remote::Remote};

/// Candidate remotes tried when none are configured, in priority order.
pub const DEFAULT_REMOTES: [&str; 2] = ["ssh://git@github.com", "https://github.com"];

/// A remote that answered the reachability probe for a specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovered {
    pub remote: Remote,
    pub specifier: String,
}

pub fn default_remotes() -> Vec<Remote> {
    DEFAULT_REMOTES
        .iter()
        .filter_map(|remote| remote.parse().ok())
        .collect()
}

/// Probes `candidates` in order and returns the first that serves `specifier`.
///
/// Probes never fail the call: a candidate that cannot be reached, or whose probe
/// cannot even be started, is skipped. `None` means every candidate was exhausted.
pub fn discover<R: CommandRunner>(
    runner: &R,
    specifier: &str,
    candidates: &[Remote],
) -> Option<Discovered> {
    for remote in candidates {
        let url = remote.join(specifier);
        debug!("Probing {}", url);
        let probe = ls_remote(&url).read_only().allow_failure();
        match runner.run(&probe) {
            Ok(result) if result.success() => {
                info!("Found {} on {}", specifier, remote);
                return Some(Discovered {
                    remote: remote.clone(),
                    specifier: specifier.to_owned(),
                });
            }
            Ok(result) => debug!(
                "{} did not answer for {} ({:?}): {}",
                remote,
                specifier,
                result.exit_code,
                result.stderr.trim_end()
            ),
            Err(e) => warn!("Could not probe {}: {}", url, e),
        }
    }
    None
}
