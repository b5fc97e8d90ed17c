use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stack")]
#[command(about = "Compose Stack - Run a declared container topology with Docker Compose")]
pub struct Cli {
    /// Topology file path (defaults to compose-stack.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Compose front-end: auto, v1 (docker-compose) or v2 (docker compose)
    #[arg(long, value_name = "VARIANT", default_value = "auto")]
    pub compose: String,

    /// Keep staged compose files on disk instead of removing them
    #[arg(long)]
    pub keep_files: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create and start all containers
    Up,
    /// Stop and remove all containers
    Down,
    /// Show the state of every service
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a service's container logs
    Logs {
        /// Service name
        service: String,
    },
    /// Print the generated compose file
    Render {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List declared services
    Services {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
