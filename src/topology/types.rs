use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

fn default_protocol() -> String {
    "tcp".to_string()
}

/// Helper for serde skip_serializing_if
fn is_empty(s: &str) -> bool {
    s.is_empty()
}

/// Host-to-container port mapping.
///
/// Neither the port range nor the protocol is validated here; the compose
/// CLI rejects bad values when the topology is brought up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PortSpec")]
pub struct PortMapping {
    #[serde(rename = "host")]
    pub host_port: u32,
    #[serde(rename = "container")]
    pub container_port: u32,
    /// "tcp" or "udp"
    pub protocol: String,
}

impl PortMapping {
    pub fn new(host_port: u32, container_port: u32, protocol: impl Into<String>) -> Self {
        Self {
            host_port,
            container_port,
            protocol: protocol.into(),
        }
    }

    pub fn tcp(host_port: u32, container_port: u32) -> Self {
        Self::new(host_port, container_port, "tcp")
    }

    pub fn udp(host_port: u32, container_port: u32) -> Self {
        Self::new(host_port, container_port, "udp")
    }
}

/// Compose short syntax: `host:container/protocol`
impl fmt::Display for PortMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}/{}",
            self.host_port, self.container_port, self.protocol
        )
    }
}

/// Parses `host:container` or `host:container/protocol`.
impl FromStr for PortMapping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ports, protocol) = match s.split_once('/') {
            Some((ports, proto)) => (ports, proto.to_string()),
            None => (s, default_protocol()),
        };
        let (host, container) = ports
            .split_once(':')
            .ok_or_else(|| format!("Invalid port mapping '{}': expected host:container", s))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|e| format!("Invalid port '{}' in '{}': {}", part, s, e))
        };
        Ok(Self {
            host_port: parse(host)?,
            container_port: parse(container)?,
            protocol,
        })
    }
}

/// Accepted YAML spellings for a port mapping.
#[derive(Deserialize)]
#[serde(untagged)]
enum PortSpec {
    Short(String),
    Long {
        host: u32,
        container: u32,
        #[serde(default = "default_protocol")]
        protocol: String,
    },
}

impl TryFrom<PortSpec> for PortMapping {
    type Error = String;

    fn try_from(spec: PortSpec) -> Result<Self, Self::Error> {
        match spec {
            PortSpec::Short(s) => s.parse(),
            PortSpec::Long {
                host,
                container,
                protocol,
            } => Ok(PortMapping::new(host, container, protocol)),
        }
    }
}

/// Host path bound into a container. Both paths are opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "VolumeSpec")]
pub struct VolumeMapping {
    #[serde(rename = "host")]
    pub host_path: String,
    #[serde(rename = "container")]
    pub container_path: String,
}

impl VolumeMapping {
    pub fn new(host_path: impl Into<String>, container_path: impl Into<String>) -> Self {
        Self {
            host_path: host_path.into(),
            container_path: container_path.into(),
        }
    }
}

impl fmt::Display for VolumeMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host_path, self.container_path)
    }
}

impl FromStr for VolumeMapping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_once(':')
            .map(|(host, container)| VolumeMapping::new(host, container))
            .ok_or_else(|| format!("Invalid volume mapping '{}': expected host:container", s))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum VolumeSpec {
    Short(String),
    Long { host: String, container: String },
}

impl TryFrom<VolumeSpec> for VolumeMapping {
    type Error = String;

    fn try_from(spec: VolumeSpec) -> Result<Self, Self::Error> {
        match spec {
            VolumeSpec::Short(s) => s.parse(),
            VolumeSpec::Long { host, container } => Ok(VolumeMapping::new(host, container)),
        }
    }
}

/// Container resource ceilings. An empty string means "unset".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Memory limit (e.g., "512m", "2g")
    #[serde(default, skip_serializing_if = "is_empty")]
    pub memory: String,

    /// CPU share as decimal (e.g., "0.5" = half a CPU)
    #[serde(default, alias = "cpu_share", skip_serializing_if = "is_empty")]
    pub cpus: String,
}

impl ResourceLimits {
    pub fn is_set(&self) -> bool {
        !self.memory.is_empty() || !self.cpus.is_empty()
    }
}

/// One deployable unit of a topology.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    #[serde(rename = "image", default)]
    pub image_name: String,

    #[serde(rename = "tag", default, skip_serializing_if = "is_empty")]
    pub image_tag: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<PortMapping>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<VolumeMapping>,

    /// Names of other services. Passed through to compose unchecked.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    /// Restart policy keyword (e.g., "always"); empty means unset.
    #[serde(default, skip_serializing_if = "is_empty")]
    pub restart: String,

    #[serde(default, skip_serializing_if = "is_default_limits")]
    pub resources: ResourceLimits,
}

fn is_default_limits(limits: &ResourceLimits) -> bool {
    !limits.is_set()
}

impl ServiceDefinition {
    pub fn new(image_name: impl Into<String>, image_tag: impl Into<String>) -> Self {
        Self {
            image_name: image_name.into(),
            image_tag: image_tag.into(),
            ..Default::default()
        }
    }

    /// Build from a full reference such as `postgres:13` or
    /// `registry:5000/team/app:1.2`.
    pub fn from_image(reference: &str) -> Self {
        let (name, tag) = split_image_reference(reference);
        Self::new(name, tag)
    }

    /// `name:tag`, or just `name` when no tag is set.
    pub fn image_reference(&self) -> String {
        if self.image_tag.is_empty() {
            self.image_name.clone()
        } else {
            format!("{}:{}", self.image_name, self.image_tag)
        }
    }

    pub fn port(mut self, mapping: PortMapping) -> Self {
        self.ports.push(mapping);
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn volume(mut self, mapping: VolumeMapping) -> Self {
        self.volumes.push(mapping);
        self
    }

    pub fn depends_on(mut self, service: impl Into<String>) -> Self {
        self.depends_on.push(service.into());
        self
    }

    pub fn restart(mut self, policy: impl Into<String>) -> Self {
        self.restart = policy.into();
        self
    }

    pub fn memory(mut self, limit: impl Into<String>) -> Self {
        self.resources.memory = limit.into();
        self
    }

    pub fn cpus(mut self, limit: impl Into<String>) -> Self {
        self.resources.cpus = limit.into();
        self
    }
}

/// Split `name[:tag]` at the last colon that follows the final `/`, so a
/// registry port (`localhost:5000/app`) is not mistaken for a tag.
pub fn split_image_reference(reference: &str) -> (String, String) {
    let name_start = reference.rfind('/').map(|i| i + 1).unwrap_or(0);
    match reference[name_start..].rfind(':') {
        Some(i) => {
            let split = name_start + i;
            (
                reference[..split].to_string(),
                reference[split + 1..].to_string(),
            )
        }
        None => (reference.to_string(), String::new()),
    }
}

/// A multi-service application: the unit handed to a provider.
///
/// The project name namespaces everything the orchestrator creates and has
/// no setter; build a new `Topology` to change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(rename = "project")]
    project_name: String,

    /// Network to declare; empty means compose's default network.
    #[serde(default, skip_serializing_if = "is_empty")]
    pub network: String,

    #[serde(default)]
    pub services: BTreeMap<String, ServiceDefinition>,

    /// Recorded for callers; never read or validated here.
    #[serde(default, skip_serializing_if = "is_empty")]
    pub env_file: String,
}

impl Topology {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            network: String::new(),
            services: BTreeMap::new(),
            env_file: String::new(),
        }
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }

    pub fn with_env_file(mut self, path: impl Into<String>) -> Self {
        self.env_file = path.into();
        self
    }

    pub fn with_service(mut self, name: impl Into<String>, service: ServiceDefinition) -> Self {
        self.services.insert(name.into(), service);
        self
    }

    /// Declared service names in sorted order.
    pub fn service_names(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }

    pub fn has_service(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }
}
