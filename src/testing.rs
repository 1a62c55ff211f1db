use std::{
    cell::RefCell,
    path::Path,
    sync::{Mutex, MutexGuard},
};

use crate::command::{CommandError, CommandLine, CommandResult, CommandRunner, ExecutionMode};

static WORKING_DIRECTORY: Mutex<()> = Mutex::new(());

/// Serializes tests that change the process working directory.
pub fn lock_working_directory() -> MutexGuard<'static, ()> {
    WORKING_DIRECTORY
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

type Responder = Box<dyn Fn(&CommandLine) -> Option<CommandResult>>;

/// Records every command and answers them without spawning processes.
///
/// `git clone` is emulated by initialising an empty repository at the destination,
/// relative to the current working directory like the real command.
pub struct RecordingRunner {
    pub commands: RefCell<Vec<CommandLine>>,
    responder: Responder,
    mode: ExecutionMode,
    verbose: bool,
}

impl Default for RecordingRunner {
    fn default() -> Self {
        Self::with_responder(|_| None)
    }
}

impl RecordingRunner {
    pub fn with_responder(
        responder: impl Fn(&CommandLine) -> Option<CommandResult> + 'static,
    ) -> Self {
        RecordingRunner {
            commands: RefCell::new(Vec::new()),
            responder: Box::new(responder),
            mode: ExecutionMode::Execute,
            verbose: false,
        }
    }

    pub fn dry_run(mut self) -> Self {
        self.mode = ExecutionMode::DryRun;
        self
    }

    pub fn verbosely(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Recorded commands rendered as strings.
    pub fn lines(&self) -> Vec<String> {
        self.commands
            .borrow()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.lines()
            .iter()
            .filter(|line| line.starts_with(prefix))
            .count()
    }
}

pub fn exit(code: i32) -> CommandResult {
    CommandResult {
        exit_code: Some(code),
        stdout: String::new(),
        stderr: String::new(),
    }
}

pub fn output(stdout: &str) -> CommandResult {
    CommandResult {
        exit_code: Some(0),
        stdout: stdout.to_owned(),
        stderr: String::new(),
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &CommandLine) -> Result<CommandResult, CommandError> {
        self.commands.borrow_mut().push(command.clone());

        if self.mode == ExecutionMode::DryRun && !command.is_read_only() {
            return Ok(CommandResult::dry_run());
        }

        let result = match (self.responder)(command) {
            Some(result) => result,
            None => {
                let args = command.arguments();
                if command.program() == "git" && args.first().is_some_and(|a| a == "clone") {
                    if let Some(destination) = args.last() {
                        git2::Repository::init(Path::new(destination))
                            .expect("failed to initialise fake clone");
                    }
                }
                exit(0)
            }
        };

        if command.fails_on_error() && !result.success() {
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
