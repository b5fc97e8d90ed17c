use crate::output::UserOutput;
use compose_stack::{compose, Topology};
use std::path::Path;

pub fn run_render(
    topology: &Topology,
    output: Option<&Path>,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let text = compose::render(topology);
    match output {
        Some(path) => {
            std::fs::write(path, &text)?;
            out.success(&format!("Wrote {}", path.display()));
        }
        None => out.raw(text.as_bytes()),
    }
    Ok(())
}
