//! Subprocess execution seam.
//!
//! Every CLI call goes through a [`CommandRunner`], so the provider can be
//! exercised against a scripted runner in tests and against
//! [`ProcessRunner`] in production.

use super::DockerError;
use async_trait::async_trait;
use std::process::{Output, Stdio};
use tokio_util::sync::CancellationToken;

/// Exit status and captured output of one finished invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// A successful invocation that printed `stdout`.
    pub fn ok(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: Vec::new(),
        }
    }

    /// A failed invocation with the given exit code and stderr.
    pub fn failure(exit_code: i32, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            success: false,
            exit_code: Some(exit_code),
            stdout: Vec::new(),
            stderr: stderr.into(),
        }
    }

    /// Stdout followed by stderr.
    pub fn combined(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.stdout.len() + self.stderr.len());
        out.extend_from_slice(&self.stdout);
        out.extend_from_slice(&self.stderr);
        out
    }

    pub fn combined_lossy(&self) -> String {
        String::from_utf8_lossy(&self.combined()).into_owned()
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

/// Runs one external program to completion.
///
/// Implementations must honour `cancel`: once it fires, the child is
/// terminated and [`DockerError::Cancelled`] is returned.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, DockerError>;
}

/// Render a command line for logs and error messages.
pub fn render_command(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

/// Runs commands as real child processes via `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        ProcessRunner
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, DockerError> {
        let cmd_str = render_command(program, args);
        if cancel.is_cancelled() {
            return Err(DockerError::Cancelled { command: cmd_str });
        }

        let mut command = tokio::process::Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            // Dropping the output future on cancellation must take the child with it
            .kill_on_drop(true);

        tracing::debug!(command = %cmd_str, "Running");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(command = %cmd_str, "Cancelled, killing child");
                Err(DockerError::Cancelled { command: cmd_str })
            }
            result = command.output() => {
                let output = result.map_err(|e| DockerError::exec_failed(&cmd_str, e))?;
                let output = CommandOutput::from(output);
                tracing::debug!(
                    command = %cmd_str,
                    exit_code = ?output.exit_code,
                    "Finished"
                );
                Ok(output)
            }
        }
    }
}
