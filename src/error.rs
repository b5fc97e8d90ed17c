// Allow unused_assignments at module level because thiserror's generated code
// for struct variants triggers false positive warnings - the fields ARE used
// in the Display impl but rustc's lint pass doesn't see this.
#![allow(unused_assignments)]

use crate::docker::DockerError;
use miette::Diagnostic;
use std::io;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Provider not initialized")]
    #[diagnostic(
        code(stack::provider::not_initialized),
        help("Call `initialize` with a topology before operating on it")
    )]
    NotInitialized,

    #[error("Service not found: {0}")]
    #[diagnostic(
        code(stack::service::not_found),
        help("Check the declared services with `stack services`")
    )]
    ServiceNotFound(String),

    #[error("Container for service '{0}' not found")]
    #[diagnostic(
        code(stack::service::container_not_found),
        help("Bring the topology up with `stack up` first")
    )]
    ContainerNotFound(String),

    #[error("Failed to {context}: {source}")]
    #[diagnostic(code(stack::compose::staging))]
    Staging {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to {action}: {source}")]
    #[diagnostic(
        code(stack::docker::command),
        help("Verify Docker is running with `docker ps`")
    )]
    Command {
        action: String,
        #[source]
        source: DockerError,
    },

    #[error("Operation cancelled: {0}")]
    Cancelled(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap a staging I/O failure with what was being attempted.
    pub fn staging(context: impl Into<String>, source: io::Error) -> Self {
        Error::Staging {
            context: context.into(),
            source,
        }
    }

    /// Wrap a CLI failure with the lifecycle action it belonged to.
    ///
    /// Cancellation is surfaced as [`Error::Cancelled`] rather than as a
    /// command failure so callers can tell the two apart.
    pub fn command(action: impl Into<String>, source: DockerError) -> Self {
        let action = action.into();
        match source {
            DockerError::Cancelled { .. } => Error::Cancelled(action),
            source => Error::Command { action, source },
        }
    }

    /// Returns a helpful suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Error::NotInitialized => {
                Some("The provider needs a topology before it can run commands.".to_string())
            }
            Error::ServiceNotFound(name) => Some(format!(
                "'{}' is not declared in the topology. List declared services with: stack services",
                name
            )),
            Error::ContainerNotFound(name) => Some(format!(
                "No running container for '{}'. Start the topology with: stack up",
                name
            )),
            Error::Config(msg) if msg.contains("Could not find") => Some(
                "Create a compose-stack.yaml or pass one with --config".to_string(),
            ),
            Error::Command {
                source: DockerError::ExecFailed { .. },
                ..
            } => Some("Check that Docker is installed and on your PATH".to_string()),
            Error::Command { .. } => Some("Check that Docker is running: docker ps".to_string()),
            _ => None,
        }
    }

    /// Formats the error with its suggestion (if any) for user-friendly display.
    pub fn with_suggestion(&self) -> String {
        match self.suggestion() {
            Some(suggestion) => format!("{}\n\nHint: {}", self, suggestion),
            None => self.to_string(),
        }
    }
}
