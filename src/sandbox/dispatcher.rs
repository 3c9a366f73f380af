//! # Process Dispatcher
//!
//! Runs jailed argv values under one of two contracts.
//!
//! ## Captured
//!
//! stdout and stderr are piped; the child runs to completion on a tokio task
//! and the result is posted back to the event loop. A zero exit yields
//! [`CommandResult::Success`] carrying stdout; anything else yields
//! [`CommandResult::Failure`] carrying whatever stderr was collected.
//!
//! ## Interactive
//!
//! stdin, stdout and stderr are inherited so the child owns the terminal:
//!
//! ```ignore
//! Command::new(program)
//!     .stdin(Stdio::inherit())
//!     .stdout(Stdio::inherit())
//!     .stderr(Stdio::inherit())
//! ```
//!
//! The caller must have released the terminal first. Nothing is captured, so
//! the result never carries content bytes.

use super::factory::{ArgvError, CommandKind, SelectedCommand};
use std::io;
use std::process::{ExitStatus, Stdio};
use thiserror::Error;

/// How a command is run relative to the panel's terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// The panel keeps the terminal and collects stdio.
    Captured,
    /// The child takes the terminal until it exits.
    Interactive,
}

impl ExecutionMode {
    pub fn for_kind(kind: CommandKind) -> Self {
        match kind {
            CommandKind::OpenShell => ExecutionMode::Interactive,
            _ => ExecutionMode::Captured,
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Argv(#[from] ArgvError),

    #[error("empty command line")]
    EmptyArgv,

    #[error("{program}: binary not found")]
    NotFound { program: String },

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}")]
    NonZeroExit { program: String, status: ExitStatus },

    #[error("i/o failure while running {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("terminal hand-off failed: {0}")]
    Terminal(String),
}

/// Outcome of one dispatched command.
#[derive(Debug)]
pub enum CommandResult {
    Success {
        bytes: Vec<u8>,
        origin: SelectedCommand,
    },
    Failure {
        stderr: Vec<u8>,
        error: DispatchError,
    },
}

impl CommandResult {
    pub fn failure(error: impl Into<DispatchError>) -> Self {
        CommandResult::Failure {
            stderr: Vec::new(),
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CommandResult::Success { .. })
    }
}

fn split_argv(argv: &[String]) -> Result<(&String, &[String]), DispatchError> {
    argv.split_first().ok_or(DispatchError::EmptyArgv)
}

fn spawn_error(program: &str, source: io::Error) -> DispatchError {
    if source.kind() == io::ErrorKind::NotFound {
        DispatchError::NotFound {
            program: program.to_string(),
        }
    } else {
        DispatchError::Spawn {
            program: program.to_string(),
            source,
        }
    }
}

/// Run `argv` to completion with piped stdio.
pub async fn run_captured(argv: Vec<String>, origin: SelectedCommand) -> CommandResult {
    let (program, args) = match split_argv(&argv) {
        Ok(parts) => parts,
        Err(e) => return CommandResult::failure(e),
    };
    tracing::debug!(?argv, "running captured command");

    let child = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    let child = match child {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!(%program, error = %e, "failed to spawn captured command");
            return CommandResult::failure(spawn_error(program, e));
        }
    };

    match child.wait_with_output().await {
        Ok(output) if output.status.success() => CommandResult::Success {
            bytes: output.stdout,
            origin,
        },
        Ok(output) => {
            tracing::warn!(%program, status = %output.status, "captured command failed");
            CommandResult::Failure {
                stderr: output.stderr,
                error: DispatchError::NonZeroExit {
                    program: program.clone(),
                    status: output.status,
                },
            }
        }
        Err(e) => CommandResult::failure(DispatchError::Io {
            program: program.clone(),
            source: e,
        }),
    }
}

/// Run `argv` with inherited stdio, blocking until the child exits.
pub fn run_interactive(argv: &[String], origin: SelectedCommand) -> CommandResult {
    let (program, args) = match split_argv(argv) {
        Ok(parts) => parts,
        Err(e) => return CommandResult::failure(e),
    };
    tracing::debug!(?argv, "handing terminal to interactive command");

    let status = std::process::Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status();

    match status {
        Ok(status) if status.success() => CommandResult::Success {
            bytes: Vec::new(),
            origin,
        },
        Ok(status) => CommandResult::failure(DispatchError::NonZeroExit {
            program: program.clone(),
            status,
        }),
        Err(e) => CommandResult::failure(spawn_error(program, e)),
    }
}
