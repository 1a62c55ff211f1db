pub mod discovery;
pub mod remote;
pub mod repository;

use std::path::Path;

use crate::command::CommandLine;

// Argument grammar of the git executable, kept in one place.

pub fn ls_remote(url: &str) -> CommandLine {
    CommandLine::git().arg("ls-remote").arg(url)
}

pub fn clone(reference: Option<&Path>, url: &str, destination: &Path) -> CommandLine {
    let mut command = CommandLine::git().arg("clone");
    if let Some(reference) = reference {
        command = command.arg("--reference").arg(reference);
    }
    command.arg(url).arg(destination)
}

pub fn clean() -> CommandLine {
    CommandLine::git().arg("clean").arg("-xfd")
}

pub fn checkout(revision: &str) -> CommandLine {
    CommandLine::git().arg("checkout").arg(revision)
}

pub fn config_set(key: &str, value: &str) -> CommandLine {
    CommandLine::git()
        .args(["config", "--local"])
        .arg(key)
        .arg(value)
}

pub fn for_each_ref(reference: &str, format: &str) -> CommandLine {
    CommandLine::git()
        .arg("for-each-ref")
        .arg("--sort=-committerdate")
        .arg(reference)
        .arg(format!("--format={format}"))
}
