use super::short_id;
use crate::output::UserOutput;
use compose_stack::{ContainerProvider, Topology};
use tokio_util::sync::CancellationToken;

pub async fn run_up(
    provider: &dyn ContainerProvider,
    topology: &Topology,
    cancel: &CancellationToken,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    out.status(&format!(
        "Starting project '{}' ({} services)...",
        topology.project_name(),
        topology.services.len()
    ));

    provider.start(cancel).await?;

    for service in provider.services() {
        let id = provider.container_id(&service);
        if id.is_empty() {
            out.warning(&format!("  {:<30} no container", service));
        } else {
            out.status(&format!("  {:<30} {}", service, short_id(&id)));
        }
    }

    out.success(&format!("Project '{}' is up", topology.project_name()));
    Ok(())
}
