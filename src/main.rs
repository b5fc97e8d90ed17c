mod cli;
mod commands;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use compose_stack::docker::ComposeVariant;
use compose_stack::{
    ComposeProvider, ContainerProvider, Error as StackError, Parser as TopologyParser,
};
use output::{CliOutput, UserOutput};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        if let Some(stack_error) = e.downcast_ref::<StackError>() {
            CliOutput.error(&format!("Error: {}", stack_error));
            if let Some(suggestion) = stack_error.suggestion() {
                eprintln!("\nHint: {}", suggestion);
            }
        } else {
            CliOutput.error(&format!("Error: {:#}", e));
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    // ── Commands that need no topology ──────────────────────────────
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        let bin_name = cmd.get_name().to_string();
        clap_complete::generate(*shell, &mut cmd, bin_name, &mut std::io::stdout());
        return Ok(());
    }

    // ── Load topology ───────────────────────────────────────────────
    let parser = TopologyParser::new();
    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => parser.find_config_file()?,
    };
    let topology = parser.load_topology(&config_path)?;
    tracing::debug!(
        path = %config_path.display(),
        project = topology.project_name(),
        "Loaded topology"
    );

    // ── Commands that need the topology but no CLI calls ────────────
    match &cli.command {
        Commands::Render { output } => {
            return commands::run_render(&topology, output.as_deref(), &CliOutput);
        }
        Commands::Services { json } => {
            return commands::run_services(&topology, *json, &CliOutput);
        }
        _ => {}
    }

    // ── Commands that drive compose ─────────────────────────────────
    let variant = cli
        .compose
        .parse::<ComposeVariant>()
        .map_err(anyhow::Error::msg)?;

    let provider = ComposeProvider::builder()
        .compose_variant(variant)
        .keep_staged_files(cli.keep_files)
        .build();
    provider.initialize(topology.clone())?;

    // Ctrl-C kills whatever compose call is in flight
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::debug!("Interrupt received, cancelling");
                cancel.cancel();
            }
        });
    }

    match cli.command {
        Commands::Up => commands::run_up(&provider, &topology, &cancel, &CliOutput).await,
        Commands::Down => commands::run_down(&provider, &topology, &cancel, &CliOutput).await,
        Commands::Status { json } => {
            commands::run_status(&provider, json, &cancel, &CliOutput).await
        }
        Commands::Logs { service } => {
            commands::run_logs(&provider, &service, &cancel, &CliOutput).await
        }
        Commands::Completions { .. } | Commands::Render { .. } | Commands::Services { .. } => {
            unreachable!("handled before the provider is built");
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
