use crate::output::UserOutput;
use compose_stack::Topology;

pub fn run_services(topology: &Topology, json: bool, out: &dyn UserOutput) -> anyhow::Result<()> {
    let names = topology.service_names();

    if json {
        out.status(&serde_json::to_string_pretty(&names)?);
        return Ok(());
    }

    for name in names {
        let service = &topology.services[&name];
        out.status(&format!("{:<30} {}", name, service.image_reference()));
    }
    Ok(())
}
