//! Scripted stand-in for the docker / docker compose CLIs.
#![allow(dead_code)]

use async_trait::async_trait;
use compose_stack::docker::{CommandOutput, CommandRunner, ComposeVariant, DockerError};
use compose_stack::ComposeProvider;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// One recorded CLI call.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Contents of the `-f` file at the moment of the call.
    pub compose_file: Option<String>,
}

impl Invocation {
    pub fn arg_after(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    pub fn is_compose(&self, sub: &str) -> bool {
        self.args.first().map(String::as_str) == Some("compose") && self.has_arg(sub)
    }

    pub fn is_docker(&self, sub: &str) -> bool {
        self.args.first().map(String::as_str) == Some(sub)
    }
}

#[derive(Default)]
struct FakeState {
    running: bool,
    /// service -> container id, listed by `ps -q` while running
    ids: HashMap<String, String>,
    /// container id -> inspect state
    states: HashMap<String, String>,
    /// container id -> log output
    logs: HashMap<String, String>,
    fail_up: Option<String>,
    fail_down: Option<String>,
    fail_ps: HashSet<String>,
    fail_inspect: HashSet<String>,
}

/// In-memory docker that understands the handful of commands the provider uses.
#[derive(Default)]
pub struct FakeDocker {
    state: Mutex<FakeState>,
    calls: Mutex<Vec<Invocation>>,
}

impl FakeDocker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a container that `up` brings to `state`.
    pub fn container(&self, service: &str, id: &str, state: &str) {
        let mut s = self.state.lock();
        s.ids.insert(service.to_string(), id.to_string());
        s.states.insert(id.to_string(), state.to_string());
    }

    pub fn logs_for(&self, id: &str, logs: &str) {
        self.state.lock().logs.insert(id.to_string(), logs.to_string());
    }

    pub fn set_running(&self, running: bool) {
        self.state.lock().running = running;
    }

    pub fn fail_up(&self, output: &str) {
        self.state.lock().fail_up = Some(output.to_string());
    }

    pub fn fail_down(&self, output: &str) {
        self.state.lock().fail_down = Some(output.to_string());
    }

    pub fn fail_ps_for(&self, service: &str) {
        self.state.lock().fail_ps.insert(service.to_string());
    }

    pub fn fail_inspect_for(&self, id: &str) {
        self.state.lock().fail_inspect.insert(id.to_string());
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn respond(&self, inv: &Invocation) -> CommandOutput {
        let mut s = self.state.lock();

        if inv.args == ["compose", "version"] {
            return CommandOutput::ok("Docker Compose version v2.27.0\n");
        }
        if inv.is_compose("up") {
            if let Some(out) = &s.fail_up {
                return CommandOutput::failure(1, out.clone());
            }
            s.running = true;
            return CommandOutput::ok("Container web-1  Started\n");
        }
        if inv.is_compose("down") {
            if let Some(out) = &s.fail_down {
                return CommandOutput::failure(1, out.clone());
            }
            s.running = false;
            return CommandOutput::ok("");
        }
        if inv.is_compose("ps") {
            let service = inv.args.last().cloned().unwrap_or_default();
            if s.fail_ps.contains(&service) {
                return CommandOutput::failure(1, "no such service");
            }
            let id = if s.running {
                s.ids.get(&service).cloned().unwrap_or_default()
            } else {
                String::new()
            };
            return CommandOutput::ok(format!("{}\n", id));
        }
        if inv.is_docker("inspect") {
            let id = inv.args.last().cloned().unwrap_or_default();
            if s.fail_inspect.contains(&id) {
                return CommandOutput::failure(1, format!("Error: No such object: {}", id));
            }
            return match s.states.get(&id) {
                Some(state) => CommandOutput::ok(format!("{}\n", state)),
                None => CommandOutput::failure(1, format!("Error: No such object: {}", id)),
            };
        }
        if inv.is_docker("logs") {
            let id = inv.args.last().cloned().unwrap_or_default();
            return match s.logs.get(&id) {
                Some(logs) => CommandOutput::ok(logs.clone()),
                None => CommandOutput::failure(1, format!("Error: No such container: {}", id)),
            };
        }

        CommandOutput::failure(127, format!("unexpected command: {:?}", inv.args))
    }
}

#[async_trait]
impl CommandRunner for FakeDocker {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, DockerError> {
        let compose_file = args
            .iter()
            .position(|a| a == "-f")
            .and_then(|i| args.get(i + 1))
            .and_then(|path| std::fs::read_to_string(path).ok());

        let inv = Invocation {
            program: program.to_string(),
            args: args.to_vec(),
            compose_file,
        };
        self.calls.lock().push(inv.clone());

        if cancel.is_cancelled() {
            return Err(DockerError::Cancelled {
                command: format!("{} {}", program, args.join(" ")),
            });
        }
        Ok(self.respond(&inv))
    }
}

/// Provider wired to `fake` with compose v2 so no detection calls happen.
pub fn provider_with(fake: &Arc<FakeDocker>) -> ComposeProvider {
    ComposeProvider::builder()
        .runner(fake.clone())
        .compose_variant(ComposeVariant::V2)
        .build()
}
