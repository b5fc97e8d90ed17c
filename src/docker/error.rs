use std::fmt;

/// Structured error type for orchestration CLI invocations.
///
/// Carries the rendered command line so failures can be reproduced by hand,
/// and the combined stdout/stderr of the process verbatim.
#[derive(Debug)]
pub enum DockerError {
    /// Command ran but returned non-zero exit.
    CommandFailed {
        command: String,
        output: String,
        exit_code: Option<i32>,
    },

    /// Binary couldn't be executed (not in PATH, permission denied).
    ExecFailed {
        command: String,
        source: std::io::Error,
    },

    /// The caller's cancellation token fired while the command was running.
    Cancelled { command: String },
}

impl DockerError {
    /// Create a command-failed error from a completed invocation.
    pub fn failed(cmd: impl Into<String>, output: &super::CommandOutput) -> Self {
        DockerError::CommandFailed {
            command: cmd.into(),
            output: output.combined_lossy(),
            exit_code: output.exit_code,
        }
    }

    /// Create a command-failed error from an output string and optional exit code.
    pub fn cmd_failed(
        cmd: impl Into<String>,
        output: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        DockerError::CommandFailed {
            command: cmd.into(),
            output: output.into(),
            exit_code,
        }
    }

    /// Create an exec-failed error (binary not found / permission denied).
    pub fn exec_failed(cmd: impl Into<String>, err: std::io::Error) -> Self {
        DockerError::ExecFailed {
            command: cmd.into(),
            source: err,
        }
    }

    /// The command line that produced this error.
    pub fn command(&self) -> &str {
        match self {
            DockerError::CommandFailed { command, .. }
            | DockerError::ExecFailed { command, .. }
            | DockerError::Cancelled { command } => command,
        }
    }
}

impl fmt::Display for DockerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DockerError::CommandFailed {
                command,
                output,
                exit_code,
            } => {
                let output = output.trim();
                if let Some(code) = exit_code {
                    write!(f, "'{}' failed (exit code {}): {}", command, code, output)
                } else {
                    write!(f, "'{}' failed: {}", command, output)
                }
            }
            DockerError::ExecFailed { command, source } => {
                write!(f, "Failed to execute '{}': {}", command, source)
            }
            DockerError::Cancelled { command } => {
                write!(f, "'{}' was cancelled", command)
            }
        }
    }
}

impl std::error::Error for DockerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DockerError::ExecFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docker::CommandOutput;

    #[test]
    fn failed_keeps_output_verbatim() {
        let output = CommandOutput {
            success: false,
            exit_code: Some(1),
            stdout: b"  pulling web\n".to_vec(),
            stderr: b"Error: manifest unknown\n\n".to_vec(),
        };
        let err = DockerError::failed("docker compose up -d", &output);

        match &err {
            DockerError::CommandFailed { output, .. } => {
                assert_eq!(output, "  pulling web\nError: manifest unknown\n\n");
            }
            other => panic!("unexpected variant: {:?}", other),
        }
        assert_eq!(
            err.to_string(),
            "'docker compose up -d' failed (exit code 1): pulling web\nError: manifest unknown"
        );
    }
}
