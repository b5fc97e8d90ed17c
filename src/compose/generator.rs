use crate::topology::{ServiceDefinition, Topology};
use std::borrow::Cow;
use std::fmt;

/// Compose file format version written in the header.
pub const COMPOSE_FILE_VERSION: &str = "3.4";

/// Driver for the optional project network.
pub const NETWORK_DRIVER: &str = "bridge";

/// Render a topology as docker-compose YAML.
///
/// Services are written in name order and environment variables in key
/// order, so equal topologies always produce byte-identical text. Missing
/// fields make the output sparser; nothing is validated.
pub fn render(topology: &Topology) -> String {
    ComposeFile(topology).to_string()
}

/// Display adapter producing the compose document for one topology.
struct ComposeFile<'a>(&'a Topology);

impl fmt::Display for ComposeFile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topology = self.0;

        writeln!(f, "version: \"{}\"", COMPOSE_FILE_VERSION)?;
        writeln!(f)?;

        writeln!(f, "services:")?;
        for (name, service) in &topology.services {
            write_service(f, name, service)?;
        }

        if !topology.network.is_empty() {
            writeln!(f)?;
            writeln!(f, "networks:")?;
            writeln!(f, "  {}:", scalar(&topology.network))?;
            writeln!(f, "    driver: {}", NETWORK_DRIVER)?;
        }

        Ok(())
    }
}

fn write_service(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    service: &ServiceDefinition,
) -> fmt::Result {
    writeln!(f, "  {}:", scalar(name))?;
    writeln!(f, "    image: {}", scalar(&service.image_reference()))?;

    if !service.restart.is_empty() {
        writeln!(f, "    restart: {}", scalar(&service.restart))?;
    }

    if !service.ports.is_empty() {
        writeln!(f, "    ports:")?;
        for port in &service.ports {
            writeln!(f, "      - {}", quoted(&port.to_string()))?;
        }
    }

    if !service.volumes.is_empty() {
        writeln!(f, "    volumes:")?;
        for volume in &service.volumes {
            writeln!(f, "      - {}", scalar(&volume.to_string()))?;
        }
    }

    if !service.environment.is_empty() {
        writeln!(f, "    environment:")?;
        for (key, value) in &service.environment {
            writeln!(f, "      - {}", scalar(&format!("{}={}", key, value)))?;
        }
    }

    if !service.depends_on.is_empty() {
        writeln!(f, "    depends_on:")?;
        for dep in &service.depends_on {
            writeln!(f, "      - {}", scalar(dep))?;
        }
    }

    let limits = &service.resources;
    if limits.is_set() {
        writeln!(f, "    deploy:")?;
        writeln!(f, "      resources:")?;
        writeln!(f, "        limits:")?;
        if !limits.memory.is_empty() {
            writeln!(f, "          memory: {}", scalar(&limits.memory))?;
        }
        if !limits.cpus.is_empty() {
            writeln!(f, "          cpus: {}", scalar(&limits.cpus))?;
        }
    }

    Ok(())
}

/// Words a YAML reader may turn into a boolean or null.
const RESERVED_WORDS: &[&str] = &[
    "true", "false", "yes", "no", "on", "off", "y", "n", "null", "~",
];

/// Emit `value` as a plain scalar when it reads back unchanged, otherwise
/// double-quoted.
fn scalar(value: &str) -> Cow<'_, str> {
    if is_plain_safe(value) {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(quoted(value))
    }
}

fn is_plain_safe(value: &str) -> bool {
    let Some(first) = value.chars().next() else {
        return false;
    };
    if "-?:,[]{}#&*!|>'\"%@`".contains(first) {
        return false;
    }
    if value.starts_with(char::is_whitespace)
        || value.ends_with(char::is_whitespace)
        || value.ends_with(':')
    {
        return false;
    }
    if value.contains(": ") || value.contains(" #") || value.chars().any(char::is_control) {
        return false;
    }
    !RESERVED_WORDS.iter().any(|word| word.eq_ignore_ascii_case(value))
}

/// Double-quoted YAML scalar with escapes.
fn quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
