use super::{split_image_reference, Topology};
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "compose-stack.yaml";
const ALT_CONFIG_FILE_NAME: &str = "compose-stack.yml";

/// Loads [`Topology`] descriptions from YAML.
pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Self
    }

    /// Find config file starting from current directory
    pub fn find_config_file(&self) -> Result<PathBuf> {
        let current_dir = std::env::current_dir()?;
        Self::find_config_in_dir(&current_dir)
    }

    pub fn find_config_in_dir(dir: &Path) -> Result<PathBuf> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Ok(config_path);
        }

        // Try alternate name
        let alt_path = dir.join(ALT_CONFIG_FILE_NAME);
        if alt_path.exists() {
            return Ok(alt_path);
        }

        // Try parent directory
        if let Some(parent) = dir.parent() {
            return Self::find_config_in_dir(parent);
        }

        Err(Error::Config(format!(
            "Could not find {} in current directory or any parent",
            CONFIG_FILE_NAME
        )))
    }

    /// Load topology from file path
    pub fn load_topology<P: AsRef<Path>>(&self, path: P) -> Result<Topology> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "Failed to read topology file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        self.parse_topology(&content)
    }

    /// Parse topology from YAML string.
    ///
    /// `image: name:tag` is split into name and tag unless a separate `tag`
    /// key is present.
    pub fn parse_topology(&self, content: &str) -> Result<Topology> {
        let mut topology: Topology = serde_yaml::from_str(content)
            .map_err(|e| Error::Parse(format!("Failed to parse YAML topology: {}", e)))?;

        for service in topology.services.values_mut() {
            if service.image_tag.is_empty() {
                let (name, tag) = split_image_reference(&service.image_name);
                service.image_name = name;
                service.image_tag = tag;
            }
        }

        Ok(topology)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{PortMapping, VolumeMapping};

    #[test]
    fn test_parse_full_topology() {
        let yaml = r#"
project: fider
network: fider-net
env_file: .env

services:
  app:
    image: getfider/fider:stable
    restart: always
    ports:
      - "8080:3000"
      - host: 5353
        container: 53
        protocol: udp
    environment:
      BASE_URL: http://localhost:8080
    depends_on:
      - db
    resources:
      memory: 512m
      cpus: "0.5"

  db:
    image: postgres
    tag: "13"
    volumes:
      - /var/fider/pg_data:/var/lib/postgresql/data
      - host: ./init
        container: /docker-entrypoint-initdb.d
"#;

        let topology = Parser::new().parse_topology(yaml).unwrap();

        assert_eq!(topology.project_name(), "fider");
        assert_eq!(topology.network, "fider-net");
        assert_eq!(topology.env_file, ".env");
        assert_eq!(topology.services.len(), 2);

        let app = &topology.services["app"];
        assert_eq!(app.image_name, "getfider/fider");
        assert_eq!(app.image_tag, "stable");
        assert_eq!(
            app.ports,
            vec![PortMapping::tcp(8080, 3000), PortMapping::udp(5353, 53)]
        );
        assert_eq!(app.environment["BASE_URL"], "http://localhost:8080");
        assert_eq!(app.depends_on, vec!["db".to_string()]);
        assert_eq!(app.resources.memory, "512m");
        assert_eq!(app.resources.cpus, "0.5");

        let db = &topology.services["db"];
        assert_eq!(db.image_reference(), "postgres:13");
        assert_eq!(
            db.volumes[1],
            VolumeMapping::new("./init", "/docker-entrypoint-initdb.d")
        );
    }

    #[test]
    fn test_parse_minimal_topology() {
        let topology = Parser::new()
            .parse_topology("project: empty\n")
            .unwrap();
        assert_eq!(topology.project_name(), "empty");
        assert!(topology.services.is_empty());
        assert!(topology.network.is_empty());
    }

    #[test]
    fn test_missing_project_is_parse_error() {
        let err = Parser::new()
            .parse_topology("services: {}\n")
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_bad_port_is_parse_error() {
        let yaml = r#"
project: demo
services:
  web:
    image: nginx
    ports: ["eighty:80"]
"#;
        assert!(matches!(
            Parser::new().parse_topology(yaml),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_out_of_range_port_is_kept() {
        let yaml = r#"
project: demo
services:
  web:
    image: nginx
    ports:
      - "70000:80"
      - host: 8080
        container: 65536
"#;
        let topology = Parser::new().parse_topology(yaml).unwrap();
        let ports = &topology.services["web"].ports;
        assert_eq!(ports[0], PortMapping::tcp(70000, 80));
        assert_eq!(ports[1], PortMapping::tcp(8080, 65536));
    }

    #[test]
    fn test_find_config_walks_up() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join(ALT_CONFIG_FILE_NAME), "project: x\n").unwrap();

        let found = Parser::find_config_in_dir(&nested).unwrap();
        assert_eq!(found, temp.path().join(ALT_CONFIG_FILE_NAME));
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let temp = tempfile::tempdir().unwrap();
        let err = Parser::new()
            .load_topology(temp.path().join("nope.yaml"))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
