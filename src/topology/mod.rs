//! Topology model and loading.
//!
//! - `types` - value types (`Topology`, `ServiceDefinition`, `PortMapping`,
//!   `VolumeMapping`, `ResourceLimits`)
//! - `parser` - YAML topology files

mod parser;
mod types;

pub use parser::*;
pub use types::*;
