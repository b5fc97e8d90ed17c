//! Lifecycle façade over a container orchestrator.
//!
//! This module provides the [`ContainerProvider`] trait and its compose
//! implementation, [`ComposeProvider`].
//!
//! A provider starts out uninitialized. [`ContainerProvider::initialize`]
//! stores a [`Topology`] without doing any I/O; every other lifecycle call
//! fails with [`Error::NotInitialized`](crate::Error::NotInitialized) until
//! then.
//!
//! # Example
//!
//! ```no_run
//! use compose_stack::provider::{ComposeProvider, ContainerProvider};
//! use compose_stack::topology::{PortMapping, ServiceDefinition, Topology};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> compose_stack::Result<()> {
//! let topology = Topology::new("demo").with_service(
//!     "web",
//!     ServiceDefinition::new("nginx", "stable").port(PortMapping::tcp(8080, 80)),
//! );
//!
//! let provider = ComposeProvider::new();
//! provider.initialize(topology)?;
//!
//! let cancel = CancellationToken::new();
//! provider.start(&cancel).await?;
//! for (service, status) in provider.status(&cancel).await? {
//!     println!("{service}: {status}");
//! }
//! provider.stop(&cancel).await?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod compose;

pub use builder::ComposeProviderBuilder;
pub use compose::ComposeProvider;

use crate::error::Result;
use crate::topology::Topology;
use async_trait::async_trait;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Cursor;
use tokio_util::sync::CancellationToken;

/// Readable container log output.
pub type LogStream = Cursor<Vec<u8>>;

/// Lifecycle state of one declared service, as reported by
/// [`ContainerProvider::status`].
///
/// The first seven variants mirror Docker's `.State.Status` values.
/// `NotFound` and `Error` are sentinels produced locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceStatus {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
    /// No container id is cached for the service.
    NotFound,
    /// Inspecting the service's container failed.
    Error,
    /// A state string this crate does not know, kept verbatim.
    Other(String),
}

impl ServiceStatus {
    /// Map a `docker inspect` state string.
    pub fn parse(state: &str) -> Self {
        match state.trim() {
            "created" => ServiceStatus::Created,
            "running" => ServiceStatus::Running,
            "paused" => ServiceStatus::Paused,
            "restarting" => ServiceStatus::Restarting,
            "removing" => ServiceStatus::Removing,
            "exited" => ServiceStatus::Exited,
            "dead" => ServiceStatus::Dead,
            "not_found" => ServiceStatus::NotFound,
            "error" => ServiceStatus::Error,
            other => ServiceStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ServiceStatus::Created => "created",
            ServiceStatus::Running => "running",
            ServiceStatus::Paused => "paused",
            ServiceStatus::Restarting => "restarting",
            ServiceStatus::Removing => "removing",
            ServiceStatus::Exited => "exited",
            ServiceStatus::Dead => "dead",
            ServiceStatus::NotFound => "not_found",
            ServiceStatus::Error => "error",
            ServiceStatus::Other(s) => s,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ServiceStatus::Running)
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl Serialize for ServiceStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Operations for running a [`Topology`] on some container backend.
#[async_trait]
pub trait ContainerProvider: Send + Sync {
    /// Store `topology` and mark the provider initialized. No I/O.
    fn initialize(&self, topology: Topology) -> Result<()>;

    /// Create and start every container of the topology.
    async fn start(&self, cancel: &CancellationToken) -> Result<()>;

    /// Stop and remove every container of the topology.
    async fn stop(&self, cancel: &CancellationToken) -> Result<()>;

    /// Current state of every declared service.
    ///
    /// Per-service failures are reported as [`ServiceStatus::NotFound`] or
    /// [`ServiceStatus::Error`] and never fail the whole call.
    async fn status(&self, cancel: &CancellationToken) -> Result<BTreeMap<String, ServiceStatus>>;

    /// Log output of the container backing `service`.
    async fn logs(&self, service: &str, cancel: &CancellationToken) -> Result<LogStream>;

    /// Last known container id for `service`, or an empty string.
    fn container_id(&self, service: &str) -> String;

    /// Declared service names, sorted. Empty before initialization.
    fn services(&self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_docker_states() {
        for state in [
            "created",
            "running",
            "paused",
            "restarting",
            "removing",
            "exited",
            "dead",
        ] {
            assert_eq!(ServiceStatus::parse(state).as_str(), state);
        }
    }

    #[test]
    fn unknown_state_kept_verbatim() {
        let status = ServiceStatus::parse("  hibernating\n");
        assert_eq!(status, ServiceStatus::Other("hibernating".to_string()));
        assert_eq!(status.to_string(), "hibernating");
    }

    #[test]
    fn sentinels_serialize_as_strings() {
        let mut map = BTreeMap::new();
        map.insert("db", ServiceStatus::NotFound);
        map.insert("web", ServiceStatus::Error);
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"db":"not_found","web":"error"}"#
        );
    }
}
