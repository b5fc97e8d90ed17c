//! # Compose Stack
//!
//! Declare a multi-container application in Rust and run it with Docker Compose.
//!
//! ## Features
//!
//! - **Topology Model**: Plain value types for services, ports, volumes and resource limits
//! - **Deterministic Rendering**: Identical topologies always render to byte-identical compose YAML
//! - **Lifecycle Provider**: Start, stop, inspect and read logs through the compose CLI
//! - **Best-effort Status**: One unreachable service never hides the state of its siblings
//! - **Cancellation Support**: In-flight CLI calls are killed via `CancellationToken`
//!
//! ## Quick Start
//!
//! ```no_run
//! use compose_stack::{ComposeProvider, ContainerProvider, Parser};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), compose_stack::Error> {
//! let topology = Parser::new().load_topology("compose-stack.yaml")?;
//!
//! let provider = ComposeProvider::new();
//! provider.initialize(topology)?;
//!
//! let cancel = CancellationToken::new();
//! provider.start(&cancel).await?;
//! let statuses = provider.status(&cancel).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency Model
//!
//! A provider is `Send + Sync` and all methods take `&self`. The stored
//! topology and the container-id cache sit behind one read/write lock that
//! is never held across a CLI call; the cache is rebuilt off-lock and
//! swapped in whole.

pub mod compose;
pub mod docker;
pub mod error;
pub mod provider;
pub mod topology;

// Re-export commonly used types
pub use error::{Error, Result};
pub use provider::{ComposeProvider, ContainerProvider, ServiceStatus};
pub use topology::{
    Parser, PortMapping, ResourceLimits, ServiceDefinition, Topology, VolumeMapping,
};
