use super::short_id;
use crate::output::UserOutput;
use compose_stack::{ContainerProvider, ServiceStatus};
use tokio_util::sync::CancellationToken;

pub async fn run_status(
    provider: &dyn ContainerProvider,
    json: bool,
    cancel: &CancellationToken,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let statuses = provider.status(cancel).await?;

    if json {
        use serde_json::json;

        let status_obj = statuses
            .iter()
            .map(|(name, status)| {
                let id = provider.container_id(name);
                let container_id = (!id.is_empty()).then_some(id);
                (
                    name.clone(),
                    json!({
                        "status": status,
                        "container_id": container_id,
                    }),
                )
            })
            .collect::<serde_json::Map<_, _>>();

        out.status(&serde_json::to_string_pretty(&status_obj)?);
        return Ok(());
    }

    out.status("Service Status:");
    out.status(&format!("{:-<60}", ""));

    if statuses.is_empty() {
        out.status("  No services declared");
        return Ok(());
    }

    for (name, status) in &statuses {
        let icon = match status {
            ServiceStatus::Running => "+",
            ServiceStatus::Created | ServiceStatus::Restarting | ServiceStatus::Paused => ".",
            ServiceStatus::NotFound | ServiceStatus::Exited => "o",
            ServiceStatus::Error | ServiceStatus::Dead => "x",
            ServiceStatus::Removing | ServiceStatus::Other(_) => "?",
        };
        let id = provider.container_id(name);
        out.status(&format!(
            "  {} {:<30} {:<12} {}",
            icon,
            name,
            status,
            short_id(&id)
        ));
    }

    Ok(())
}
