//! Compose file generation and staging.
//!
//! [`render`] turns a [`Topology`](crate::topology::Topology) into
//! docker-compose YAML; [`stage`] writes it somewhere the CLI can read it
//! and [`cleanup`] removes it again.

mod generator;
mod staging;

pub use generator::*;
pub use staging::*;
