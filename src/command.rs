use std::{
    ffi::{OsStr, OsString},
    fmt::{Display, Write},
    io,
    process::{Command, Stdio},
};

use log::{debug, info, log, Level};
use thiserror::Error;

/// Output returned in place of real streams when a command is skipped by a dry run.
pub const DRY_RUN_OUTPUT: &str = "dry-run";

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("Command `{command}` exited with {}; stdout={stdout}; stderr={stderr}", display_code(.exit_code))]
    Failed {
        command: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code".to_owned(),
    }
}

/// Whether commands are actually executed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    #[default]
    Execute,
    /// Log every mutating command instead of running it.
    DryRun,
}

/// Result of a single command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// `None` when the command was skipped by a dry run or killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    pub fn dry_run() -> Self {
        CommandResult {
            exit_code: None,
            stdout: DRY_RUN_OUTPUT.to_owned(),
            stderr: DRY_RUN_OUTPUT.to_owned(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// A program and its arguments, passed to the operating system as an argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: OsString,
    args: Vec<OsString>,
    fail_on_error: bool,
    capture: bool,
    read_only: bool,
}

impl CommandLine {
    pub fn new(program: impl Into<OsString>) -> Self {
        CommandLine {
            program: program.into(),
            args: Vec::new(),
            fail_on_error: true,
            capture: true,
            read_only: false,
        }
    }

    pub fn git() -> Self {
        Self::new("git")
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Return the exit code to the caller instead of failing on a non-zero status.
    pub fn allow_failure(mut self) -> Self {
        self.fail_on_error = false;
        self
    }

    /// Stream the child's output to this process' stderr as it runs, keeping stdout for results.
    pub fn inherit_output(mut self) -> Self {
        self.capture = false;
        self
    }

    /// Mark the command as a query with no side effects, so it still runs during a dry run.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    pub fn fails_on_error(&self) -> bool {
        self.fail_on_error
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).stdin(Stdio::null());
        if self.capture {
            command.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            command.stdout(io::stderr()).stderr(Stdio::inherit());
        }
        command
    }
}

impl Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_quoted(f, &self.program)?;
        for arg in &self.args {
            f.write_char(' ')?;
            write_quoted(f, arg)?;
        }
        Ok(())
    }
}

fn write_quoted(f: &mut std::fmt::Formatter<'_>, word: &OsStr) -> std::fmt::Result {
    let word = word.to_string_lossy();
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:@=%+,~^".contains(c));
    if plain {
        f.write_str(&word)
    } else {
        write!(f, "'{}'", word.replace('\'', r"'\''"))
    }
}

/// Executes command lines on behalf of the acquisition pipeline.
pub trait CommandRunner {
    fn run(&self, command: &CommandLine) -> Result<CommandResult, CommandError>;

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Execute
    }

    fn verbose(&self) -> bool {
        false
    }
}

/// Runs commands as child processes of the current process, blocking until they exit.
#[derive(Debug, Default, Clone)]
pub struct SystemRunner {
    mode: ExecutionMode,
    verbose: bool,
}

impl SystemRunner {
    pub fn new(mode: ExecutionMode, verbose: bool) -> Self {
        SystemRunner { mode, verbose }
    }

    fn level(&self) -> Level {
        if self.verbose {
            Level::Info
        } else {
            Level::Debug
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: &CommandLine) -> Result<CommandResult, CommandError> {
        if self.mode == ExecutionMode::DryRun && !command.read_only {
            info!("{}", command);
            return Ok(CommandResult::dry_run());
        }

        log!(self.level(), "{}", command);
        let output = command
            .to_command()
            .output()
            .map_err(|source| CommandError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let result = CommandResult {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !result.stdout.is_empty() {
            log!(self.level(), "{}", result.stdout.trim_end());
        }
        if !result.stderr.is_empty() {
            log!(self.level(), "{}", result.stderr.trim_end());
        }

        if command.fail_on_error && !output.status.success() {
            debug!("`{}` exited with {:?}", command, result.exit_code);
            return Err(CommandError::Failed {
                command: command.to_string(),
                exit_code: result.exit_code,
                stdout: result.stdout,
                stderr: result.stderr,
            });
        }

        Ok(result)
    }

    fn mode(&self) -> ExecutionMode {
        self.mode
    }

    fn verbose(&self) -> bool {
        self.verbose
    }
}
