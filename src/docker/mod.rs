//! Docker and Docker Compose CLI plumbing.
//!
//! The orchestration CLI is an external collaborator: this module only
//! builds argument lists, runs them through a [`CommandRunner`], and maps
//! exit status and combined output into [`DockerError`].

pub mod client;
pub mod error;
pub mod runner;

pub use client::{ComposeClient, ComposeCommand, ComposeVariant, STATUS_FORMAT};
pub use error::DockerError;
pub use runner::{render_command, CommandOutput, CommandRunner, ProcessRunner};
