use crate::output::UserOutput;
use compose_stack::{ContainerProvider, Error};
use std::io::Read;
use tokio_util::sync::CancellationToken;

pub async fn run_logs(
    provider: &dyn ContainerProvider,
    service: &str,
    cancel: &CancellationToken,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let mut stream = match provider.logs(service, cancel).await {
        Ok(stream) => stream,
        Err(e) => {
            if matches!(e, Error::ServiceNotFound(_)) {
                let services = provider.services();
                if !services.is_empty() {
                    out.error("Available services:");
                    for name in services {
                        out.error(&format!("  - {}", name));
                    }
                }
            }
            return Err(e.into());
        }
    };

    let mut logs = Vec::new();
    stream.read_to_end(&mut logs)?;
    if logs.is_empty() {
        out.status(&format!("No logs available for service '{}'", service));
    } else {
        out.raw(&logs);
    }
    Ok(())
}
