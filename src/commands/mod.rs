//! Subcommand implementations for the `stack` binary.

mod down;
mod logs;
mod render;
mod services;
mod status;
mod up;

pub use down::run_down;
pub use logs::run_logs;
pub use render::run_render;
pub use services::run_services;
pub use status::run_status;
pub use up::run_up;

/// Shorten a container id the way `docker ps` does.
pub(crate) fn short_id(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}
