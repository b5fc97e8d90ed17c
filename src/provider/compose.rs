use super::{ComposeProviderBuilder, ContainerProvider, LogStream, ServiceStatus};
use crate::compose;
use crate::docker::{ComposeClient, DockerError};
use crate::error::{Error, Result};
use crate::topology::Topology;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// State shared by all operations, guarded by one lock.
///
/// `topology` doubles as the initialized flag.
#[derive(Debug, Default)]
struct ProviderState {
    topology: Option<Topology>,
    /// service name -> container id
    containers: HashMap<String, String>,
}

/// [`ContainerProvider`] backed by the Docker Compose CLI.
///
/// Every `start`/`stop` re-renders the stored topology into a staged
/// compose file and hands it to the CLI. Whether a second `start` is a
/// no-op is up to compose; no started/stopped state is tracked here.
///
/// The lock is only held to copy state in or out, never across a CLI call.
#[derive(Debug)]
pub struct ComposeProvider {
    client: ComposeClient,
    state: RwLock<ProviderState>,
    keep_staged_files: bool,
}

impl ComposeProvider {
    /// Provider using real subprocesses and auto-detected compose.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ComposeProviderBuilder {
        ComposeProviderBuilder::new()
    }

    pub(super) fn from_parts(client: ComposeClient, keep_staged_files: bool) -> Self {
        Self {
            client,
            state: RwLock::new(ProviderState::default()),
            keep_staged_files,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.state.read().topology.is_some()
    }

    /// Copy of the stored topology, if initialized.
    pub fn topology(&self) -> Option<Topology> {
        self.state.read().topology.clone()
    }

    fn snapshot(&self) -> Result<Topology> {
        self.state
            .read()
            .topology
            .clone()
            .ok_or(Error::NotInitialized)
    }

    fn release(&self, compose_file: &Path) {
        if self.keep_staged_files {
            tracing::info!(path = %compose_file.display(), "Keeping staged compose file");
            return;
        }
        if let Err(e) = compose::cleanup(compose_file) {
            tracing::warn!("Failed to remove staged compose file: {}", e);
        }
    }

    /// Re-query container ids for every declared service and swap the
    /// result in as the new cache.
    ///
    /// Services whose query fails or lists nothing are left out. Only
    /// cancellation aborts the refresh, in which case the old cache stays.
    async fn refresh_container_ids(
        &self,
        topology: &Topology,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let project = topology.project_name();
        let mut containers = HashMap::new();

        for service in topology.services.keys() {
            match self.client.container_id(project, service, cancel).await {
                Ok(Some(id)) => {
                    containers.insert(service.clone(), id);
                }
                Ok(None) => {
                    tracing::debug!(service = %service, "No container listed");
                }
                Err(e @ DockerError::Cancelled { .. }) => {
                    return Err(Error::command("refresh container ids", e));
                }
                Err(e) => {
                    tracing::debug!(service = %service, "Skipping container id lookup: {}", e);
                }
            }
        }

        tracing::debug!(project, resolved = containers.len(), "Refreshed container ids");
        self.state.write().containers = containers;
        Ok(())
    }
}

impl Default for ComposeProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContainerProvider for ComposeProvider {
    fn initialize(&self, topology: Topology) -> Result<()> {
        tracing::debug!(
            project = topology.project_name(),
            services = topology.services.len(),
            "Initializing provider"
        );
        let mut state = self.state.write();
        state.topology = Some(topology);
        state.containers.clear();
        Ok(())
    }

    async fn start(&self, cancel: &CancellationToken) -> Result<()> {
        let topology = self.snapshot()?;
        let project = topology.project_name();

        let compose_file = compose::stage_topology(&topology)?;
        let result = self.client.up(project, &compose_file, cancel).await;
        self.release(&compose_file);
        result.map_err(|e| Error::command("start containers", e))?;

        tracing::info!(project, "Containers started");
        self.refresh_container_ids(&topology, cancel).await
    }

    async fn stop(&self, cancel: &CancellationToken) -> Result<()> {
        let topology = self.snapshot()?;
        let project = topology.project_name();

        let compose_file = compose::stage_topology(&topology)?;
        let result = self.client.down(project, &compose_file, cancel).await;
        self.release(&compose_file);
        result.map_err(|e| Error::command("stop containers", e))?;

        self.state.write().containers = HashMap::new();
        tracing::info!(project, "Containers stopped");
        Ok(())
    }

    async fn status(&self, cancel: &CancellationToken) -> Result<BTreeMap<String, ServiceStatus>> {
        let topology = self.snapshot()?;
        self.refresh_container_ids(&topology, cancel).await?;
        let containers = self.state.read().containers.clone();

        let mut statuses = BTreeMap::new();
        for service in topology.services.keys() {
            let status = match containers.get(service) {
                None => ServiceStatus::NotFound,
                Some(id) => match self.client.inspect_status(id, cancel).await {
                    Ok(state) => ServiceStatus::parse(&state),
                    Err(e @ DockerError::Cancelled { .. }) => {
                        return Err(Error::command("inspect containers", e));
                    }
                    Err(e) => {
                        tracing::debug!(service = %service, "Inspect failed: {}", e);
                        ServiceStatus::Error
                    }
                },
            };
            statuses.insert(service.clone(), status);
        }

        Ok(statuses)
    }

    async fn logs(&self, service: &str, cancel: &CancellationToken) -> Result<LogStream> {
        let topology = self.snapshot()?;
        if !topology.has_service(service) {
            return Err(Error::ServiceNotFound(service.to_string()));
        }

        self.refresh_container_ids(&topology, cancel).await?;

        let container_id = self.container_id(service);
        if container_id.is_empty() {
            return Err(Error::ContainerNotFound(service.to_string()));
        }

        let output = self
            .client
            .logs(&container_id, cancel)
            .await
            .map_err(|e| Error::command("get logs", e))?;
        Ok(Cursor::new(output))
    }

    fn container_id(&self, service: &str) -> String {
        self.state
            .read()
            .containers
            .get(service)
            .cloned()
            .unwrap_or_default()
    }

    fn services(&self) -> Vec<String> {
        self.state
            .read()
            .topology
            .as_ref()
            .map(Topology::service_names)
            .unwrap_or_default()
    }
}
