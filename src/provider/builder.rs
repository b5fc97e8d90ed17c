use super::{ComposeProvider, ContainerProvider};
use crate::docker::{CommandRunner, ComposeClient, ComposeVariant, ProcessRunner};
use crate::topology::Topology;
use std::sync::Arc;

/// Builder for constructing a [`ComposeProvider`] with a fluent API.
///
/// # Example
///
/// ```
/// use compose_stack::docker::ComposeVariant;
/// use compose_stack::provider::{ComposeProvider, ContainerProvider};
/// use compose_stack::topology::Topology;
///
/// let provider = ComposeProvider::builder()
///     .compose_variant(ComposeVariant::V2)
///     .topology(Topology::new("demo"))
///     .build();
/// assert!(provider.is_initialized());
/// assert!(provider.services().is_empty());
/// ```
pub struct ComposeProviderBuilder {
    runner: Option<Arc<dyn CommandRunner>>,
    variant: ComposeVariant,
    docker_bin: Option<String>,
    compose_v1_bin: Option<String>,
    keep_staged_files: bool,
    topology: Option<Topology>,
}

impl ComposeProviderBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            runner: None,
            variant: ComposeVariant::default(),
            docker_bin: None,
            compose_v1_bin: None,
            keep_staged_files: false,
            topology: None,
        }
    }

    /// Run CLI calls through `runner` instead of real subprocesses.
    pub fn runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    /// Pick the compose front-end. Defaults to [`ComposeVariant::Auto`].
    pub fn compose_variant(mut self, variant: ComposeVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Path or name of the `docker` binary.
    pub fn docker_bin(mut self, bin: impl Into<String>) -> Self {
        self.docker_bin = Some(bin.into());
        self
    }

    /// Path or name of the standalone `docker-compose` binary.
    pub fn compose_v1_bin(mut self, bin: impl Into<String>) -> Self {
        self.compose_v1_bin = Some(bin.into());
        self
    }

    /// Leave staged compose files on disk after each CLI call.
    pub fn keep_staged_files(mut self, keep: bool) -> Self {
        self.keep_staged_files = keep;
        self
    }

    /// Initialize the built provider with `topology`.
    pub fn topology(mut self, topology: Topology) -> Self {
        self.topology = Some(topology);
        self
    }

    pub fn build(self) -> ComposeProvider {
        let runner = self
            .runner
            .unwrap_or_else(|| Arc::new(ProcessRunner::new()));

        let mut client = ComposeClient::new(runner, self.variant);
        if let Some(bin) = self.docker_bin {
            client = client.with_docker_bin(bin);
        }
        if let Some(bin) = self.compose_v1_bin {
            client = client.with_compose_v1_bin(bin);
        }

        let provider = ComposeProvider::from_parts(client, self.keep_staged_files);
        if let Some(topology) = self.topology {
            // ComposeProvider::initialize is infallible
            let _ = provider.initialize(topology);
        }
        provider
    }
}

impl Default for ComposeProviderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
