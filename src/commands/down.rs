use crate::output::UserOutput;
use compose_stack::{ContainerProvider, Topology};
use tokio_util::sync::CancellationToken;

pub async fn run_down(
    provider: &dyn ContainerProvider,
    topology: &Topology,
    cancel: &CancellationToken,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    out.status(&format!("Stopping project '{}'...", topology.project_name()));
    provider.stop(cancel).await?;
    out.success(&format!("Project '{}' is down", topology.project_name()));
    Ok(())
}
