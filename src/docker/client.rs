//! Compose-aware Docker CLI client.
//!
//! All orchestration CLI interactions go through `ComposeClient`, which
//! builds the argument lists, maps non-zero exits to [`DockerError`], and
//! resolves which compose front-end (`docker compose` or `docker-compose`)
//! to use.

use super::runner::{render_command, CommandOutput, CommandRunner};
use super::DockerError;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;

/// Go template passed to `docker inspect` to read a container's lifecycle state.
pub const STATUS_FORMAT: &str = "{{.State.Status}}";

/// Which compose front-end to invoke, as requested by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposeVariant {
    /// Probe for v2 first, then fall back to v1.
    #[default]
    Auto,
    /// `docker-compose`
    V1,
    /// `docker compose`
    V2,
}

impl FromStr for ComposeVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ComposeVariant::Auto),
            "v1" | "docker-compose" => Ok(ComposeVariant::V1),
            "v2" | "docker compose" => Ok(ComposeVariant::V2),
            other => Err(format!(
                "Invalid compose variant '{}'. Valid options: auto, v1, v2",
                other
            )),
        }
    }
}

impl fmt::Display for ComposeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposeVariant::Auto => write!(f, "auto"),
            ComposeVariant::V1 => write!(f, "v1"),
            ComposeVariant::V2 => write!(f, "v2"),
        }
    }
}

/// Docker Compose command type (v1 or v2), once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeCommand {
    V2, // docker compose
    V1, // docker-compose
}

/// Client for the compose CLI and the single-container `docker` commands.
///
/// Cheap to clone; clones share the runner and the resolved compose command.
#[derive(Clone)]
pub struct ComposeClient {
    runner: Arc<dyn CommandRunner>,
    docker_bin: String,
    compose_v1_bin: String,
    variant: ComposeVariant,
    resolved: Arc<OnceCell<ComposeCommand>>,
}

impl fmt::Debug for ComposeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposeClient")
            .field("docker_bin", &self.docker_bin)
            .field("compose_v1_bin", &self.compose_v1_bin)
            .field("variant", &self.variant)
            .field("resolved", &self.resolved.get())
            .finish()
    }
}

impl ComposeClient {
    pub fn new(runner: Arc<dyn CommandRunner>, variant: ComposeVariant) -> Self {
        Self {
            runner,
            docker_bin: "docker".to_string(),
            compose_v1_bin: "docker-compose".to_string(),
            variant,
            resolved: Arc::new(OnceCell::new()),
        }
    }

    /// Override the `docker` binary (also used as the v2 compose front-end).
    pub fn with_docker_bin(mut self, bin: impl Into<String>) -> Self {
        self.docker_bin = bin.into();
        self
    }

    /// Override the standalone v1 `docker-compose` binary.
    pub fn with_compose_v1_bin(mut self, bin: impl Into<String>) -> Self {
        self.compose_v1_bin = bin.into();
        self
    }

    pub fn variant(&self) -> ComposeVariant {
        self.variant
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    async fn run(
        &self,
        program: &str,
        args: Vec<String>,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, DockerError> {
        self.runner.run(program, &args, cancel).await
    }

    /// Run a command, returning its output only if it exited 0.
    async fn run_success(
        &self,
        program: &str,
        args: Vec<String>,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, DockerError> {
        let cmd_str = render_command(program, &args);
        let output = self.run(program, args, cancel).await?;
        if output.success {
            Ok(output)
        } else {
            Err(DockerError::failed(cmd_str, &output))
        }
    }

    /// Resolve the compose front-end, probing at most once per client.
    pub async fn compose_command(
        &self,
        cancel: &CancellationToken,
    ) -> Result<ComposeCommand, DockerError> {
        match self.variant {
            ComposeVariant::V1 => Ok(ComposeCommand::V1),
            ComposeVariant::V2 => Ok(ComposeCommand::V2),
            ComposeVariant::Auto => self
                .resolved
                .get_or_try_init(|| self.detect(cancel))
                .await
                .copied(),
        }
    }

    /// Detect which docker compose command is available
    async fn detect(&self, cancel: &CancellationToken) -> Result<ComposeCommand, DockerError> {
        // Try docker compose (v2) first
        match self
            .run(&self.docker_bin, args(&["compose", "version"]), cancel)
            .await
        {
            Ok(output) if output.success => {
                tracing::debug!("Using 'docker compose' (v2)");
                return Ok(ComposeCommand::V2);
            }
            Err(e @ DockerError::Cancelled { .. }) => return Err(e),
            _ => {}
        }

        // Try docker-compose (v1) as fallback
        match self
            .run(&self.compose_v1_bin, args(&["--version"]), cancel)
            .await
        {
            Ok(output) if output.success => {
                tracing::debug!("Using 'docker-compose' (v1)");
                Ok(ComposeCommand::V1)
            }
            Err(e @ DockerError::Cancelled { .. }) => Err(e),
            _ => Err(DockerError::cmd_failed(
                "docker compose version",
                "Neither 'docker compose' (v2) nor 'docker-compose' (v1) found. Please install Docker Compose.",
                None,
            )),
        }
    }

    /// Build program and argument list for a project-scoped compose call.
    async fn compose_args(
        &self,
        project: &str,
        compose_file: Option<&Path>,
        sub_args: &[&str],
        cancel: &CancellationToken,
    ) -> Result<(String, Vec<String>), DockerError> {
        let (program, mut argv) = match self.compose_command(cancel).await? {
            ComposeCommand::V2 => (self.docker_bin.clone(), vec!["compose".to_string()]),
            ComposeCommand::V1 => (self.compose_v1_bin.clone(), Vec::new()),
        };
        argv.push("-p".to_string());
        argv.push(project.to_string());
        if let Some(file) = compose_file {
            argv.push("-f".to_string());
            argv.push(file.display().to_string());
        }
        argv.extend(sub_args.iter().map(|s| s.to_string()));
        Ok((program, argv))
    }

    // ========================================================================
    // Project lifecycle
    // ========================================================================

    /// `compose -p <project> -f <file> up -d`
    pub async fn up(
        &self,
        project: &str,
        compose_file: &Path,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, DockerError> {
        let (program, argv) = self
            .compose_args(project, Some(compose_file), &["up", "-d"], cancel)
            .await?;
        self.run_success(&program, argv, cancel).await
    }

    /// `compose -p <project> -f <file> down`
    pub async fn down(
        &self,
        project: &str,
        compose_file: &Path,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, DockerError> {
        let (program, argv) = self
            .compose_args(project, Some(compose_file), &["down"], cancel)
            .await?;
        self.run_success(&program, argv, cancel).await
    }

    /// `compose -p <project> ps -q <service>`
    ///
    /// Returns the first container id listed, or `None` when the service has
    /// no container.
    pub async fn container_id(
        &self,
        project: &str,
        service: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, DockerError> {
        let (program, argv) = self
            .compose_args(project, None, &["ps", "-q", service], cancel)
            .await?;
        let output = self.run_success(&program, argv, cancel).await?;
        Ok(output
            .stdout_lossy()
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(String::from))
    }

    // ========================================================================
    // Single-container inspection
    // ========================================================================

    /// `docker inspect --format {{.State.Status}} <id>`, trimmed.
    pub async fn inspect_status(
        &self,
        container_id: &str,
        cancel: &CancellationToken,
    ) -> Result<String, DockerError> {
        let output = self
            .run_success(
                &self.docker_bin,
                args(&["inspect", "--format", STATUS_FORMAT, container_id]),
                cancel,
            )
            .await?;
        Ok(output.stdout_lossy().trim().to_string())
    }

    /// `docker logs <id>`, stdout followed by stderr.
    pub async fn logs(
        &self,
        container_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, DockerError> {
        let output = self
            .run_success(&self.docker_bin, args(&["logs", container_id]), cancel)
            .await?;
        Ok(output.combined())
    }
}

fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Replies to every call with the next scripted output, recording argv.
    struct ScriptedRunner {
        replies: Mutex<Vec<CommandOutput>>,
        calls: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl ScriptedRunner {
        fn new(mut replies: Vec<CommandOutput>) -> Arc<Self> {
            replies.reverse();
            Arc::new(Self {
                replies: Mutex::new(replies),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(
            &self,
            program: &str,
            args: &[String],
            _cancel: &CancellationToken,
        ) -> Result<CommandOutput, DockerError> {
            self.calls
                .lock()
                .push((program.to_string(), args.to_vec()));
            Ok(self
                .replies
                .lock()
                .pop()
                .unwrap_or_else(|| CommandOutput::failure(127, "unscripted")))
        }
    }

    #[test]
    fn variant_parses_aliases() {
        assert_eq!("auto".parse::<ComposeVariant>(), Ok(ComposeVariant::Auto));
        assert_eq!("V2".parse::<ComposeVariant>(), Ok(ComposeVariant::V2));
        assert_eq!(
            "docker-compose".parse::<ComposeVariant>(),
            Ok(ComposeVariant::V1)
        );
        assert!("v3".parse::<ComposeVariant>().is_err());
    }

    #[tokio::test]
    async fn up_v2_scopes_project_and_file() {
        let runner = ScriptedRunner::new(vec![CommandOutput::ok("")]);
        let client = ComposeClient::new(runner.clone(), ComposeVariant::V2);
        client
            .up("demo", Path::new("/tmp/x/docker-compose.yml"), &CancellationToken::new())
            .await
            .unwrap();

        let calls = runner.calls.lock();
        assert_eq!(calls[0].0, "docker");
        assert_eq!(
            calls[0].1,
            args(&["compose", "-p", "demo", "-f", "/tmp/x/docker-compose.yml", "up", "-d"])
        );
    }

    #[tokio::test]
    async fn v1_uses_standalone_binary() {
        let runner = ScriptedRunner::new(vec![CommandOutput::ok("abc123\n")]);
        let client = ComposeClient::new(runner.clone(), ComposeVariant::V1);
        let id = client
            .container_id("demo", "web", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(id.as_deref(), Some("abc123"));
        let calls = runner.calls.lock();
        assert_eq!(calls[0].0, "docker-compose");
        assert_eq!(calls[0].1, args(&["-p", "demo", "ps", "-q", "web"]));
    }

    #[tokio::test]
    async fn empty_ps_output_is_none() {
        let runner = ScriptedRunner::new(vec![CommandOutput::ok("\n")]);
        let client = ComposeClient::new(runner, ComposeVariant::V2);
        let id = client
            .container_id("demo", "web", &CancellationToken::new())
            .await
            .unwrap();
        assert!(id.is_none());
    }

    #[tokio::test]
    async fn auto_detection_falls_back_to_v1_once() {
        let runner = ScriptedRunner::new(vec![
            CommandOutput::failure(1, "unknown command: compose"),
            CommandOutput::ok("docker-compose version 1.29.2"),
            CommandOutput::ok(""),
            CommandOutput::ok(""),
        ]);
        let client = ComposeClient::new(runner.clone(), ComposeVariant::Auto);
        let cancel = CancellationToken::new();
        let file = Path::new("/tmp/x/docker-compose.yml");
        client.up("demo", file, &cancel).await.unwrap();
        client.down("demo", file, &cancel).await.unwrap();

        let calls = runner.calls.lock();
        // two probes, then up and down without re-probing
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[2].0, "docker-compose");
        assert_eq!(calls[3].1.last().map(String::as_str), Some("down"));
    }

    #[tokio::test]
    async fn non_zero_exit_carries_output() {
        let runner = ScriptedRunner::new(vec![CommandOutput::failure(
            1,
            "Error: No such object: deadbeef",
        )]);
        let client = ComposeClient::new(runner, ComposeVariant::V2);
        let err = client
            .inspect_status("deadbeef", &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            DockerError::CommandFailed {
                command,
                output,
                exit_code,
            } => {
                assert_eq!(command, "docker inspect --format {{.State.Status}} deadbeef");
                assert_eq!(output, "Error: No such object: deadbeef");
                assert_eq!(exit_code, Some(1));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
