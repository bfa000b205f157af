//! Configuration
//!
//! Tango reads a static YAML file describing the Docker Hub organization,
//! default SSH credentials and the Tango nodes:
//!
//! ```yaml
//! docker_hub_org: myorg
//! ssh_key_path: ~/.ssh/id_ed25519
//! ssh_username: deploy
//! volumes_path: /srv/volumes
//! tango_nodes:
//!   alpha:
//!     fqdn: alpha.example.com
//!   beta:
//!     fqdn: beta.example.com
//!     ssh_username: root
//! ```
//!
//! Nodes keep the order in which they appear in the file.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{Result, TangoError};
use crate::image::validate_component;
use crate::selector::{ALL_NODES, NodeSelector};
use crate::ssh::SshTarget;

/// Tango configuration
///
/// Unknown keys are ignored so files can carry extra annotations.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Docker Hub organization that built images are published under
    pub docker_hub_org: String,

    /// Default SSH private key used for every node without an override
    pub ssh_key_path: String,

    /// Default SSH username used for every node without an override
    pub ssh_username: String,

    /// Default directory holding volumes on each node
    #[serde(default)]
    pub volumes_path: Option<String>,

    /// Configured nodes, in file order
    #[serde(deserialize_with = "nodes_in_order")]
    pub tango_nodes: Vec<TangoNode>,
}

/// A remote machine that receives deployed images
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TangoNode {
    /// Name used to select the node on the command line
    pub name: String,
    pub fqdn: String,
    pub ssh_key_path: Option<String>,
    pub ssh_username: Option<String>,
    pub volumes_path: Option<String>,
}

/// Node entry as written in the file, keyed by name
#[derive(Deserialize)]
struct NodeEntry {
    fqdn: String,
    #[serde(default)]
    ssh_key_path: Option<String>,
    #[serde(default)]
    ssh_username: Option<String>,
    #[serde(default)]
    volumes_path: Option<String>,
}

/// Command-line overrides applied on top of the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub docker_hub_org: Option<String>,
    pub ssh_key_path: Option<String>,
    pub ssh_username: Option<String>,
}

fn nodes_in_order<'de, D>(deserializer: D) -> std::result::Result<Vec<TangoNode>, D::Error>
where
    D: Deserializer<'de>,
{
    struct NodesVisitor;

    impl<'de> Visitor<'de> for NodesVisitor {
        type Value = Vec<TangoNode>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a mapping of node names to nodes")
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut nodes = Vec::new();
            while let Some((name, entry)) = map.next_entry::<String, NodeEntry>()? {
                if nodes.iter().any(|n: &TangoNode| n.name == name) {
                    return Err(serde::de::Error::custom(format!(
                        "duplicate node '{}'",
                        name
                    )));
                }
                nodes.push(TangoNode {
                    name,
                    fqdn: entry.fqdn,
                    ssh_key_path: entry.ssh_key_path,
                    ssh_username: entry.ssh_username,
                    volumes_path: entry.volumes_path,
                });
            }
            Ok(nodes)
        }
    }

    deserializer.deserialize_any(NodesVisitor)
}

impl Config {
    /// Loads configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TangoError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Parses configuration from YAML text
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Applies command-line overrides; unset overrides leave fields unchanged
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(org) = overrides.docker_hub_org {
            self.docker_hub_org = org;
        }
        if let Some(key) = overrides.ssh_key_path {
            self.ssh_key_path = key;
        }
        if let Some(user) = overrides.ssh_username {
            self.ssh_username = user;
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        validate_component(&self.docker_hub_org, &self.docker_hub_org)
            .map_err(|e| TangoError::InvalidConfig(format!("docker_hub_org: {}", e)))?;

        if self.ssh_key_path.is_empty() {
            return Err(TangoError::InvalidConfig(
                "ssh_key_path cannot be empty".to_string(),
            ));
        }

        if self.ssh_username.is_empty() {
            return Err(TangoError::InvalidConfig(
                "ssh_username cannot be empty".to_string(),
            ));
        }

        for node in &self.tango_nodes {
            if node.name == ALL_NODES {
                return Err(TangoError::InvalidConfig(format!(
                    "'{}' is reserved and cannot be used as a node name",
                    ALL_NODES
                )));
            }
            if node.name.is_empty() || node.name.contains(',') {
                return Err(TangoError::InvalidConfig(format!(
                    "node name '{}' must be non-empty and contain no commas",
                    node.name
                )));
            }
            if node.fqdn.is_empty() {
                return Err(TangoError::InvalidConfig(format!(
                    "node '{}' has an empty fqdn",
                    node.name
                )));
            }
        }

        Ok(())
    }

    /// Looks up a node by name
    pub fn node(&self, name: &str) -> Result<&TangoNode> {
        self.tango_nodes
            .iter()
            .find(|node| node.name == name)
            .ok_or_else(|| TangoError::UnknownNode {
                name: name.to_string(),
                known: self.node_names().join(", "),
            })
    }

    /// Names of all configured nodes, in order
    pub fn node_names(&self) -> Vec<&str> {
        self.tango_nodes.iter().map(|n| n.name.as_str()).collect()
    }

    /// Resolves a selector to nodes
    ///
    /// `All` yields nodes in configuration order; named selections keep the
    /// order given, with repeated names collapsed to their first occurrence.
    pub fn select_nodes(&self, selector: &NodeSelector) -> Result<Vec<&TangoNode>> {
        match selector {
            NodeSelector::All => Ok(self.tango_nodes.iter().collect()),
            NodeSelector::Named(names) => {
                let mut selected: Vec<&TangoNode> = Vec::with_capacity(names.len());
                for name in names {
                    let node = self.node(name)?;
                    if !selected.iter().any(|n| n.name == node.name) {
                        selected.push(node);
                    }
                }
                Ok(selected)
            }
        }
    }

    /// Effective SSH settings for a node
    ///
    /// Empty per-node overrides count as unset.
    pub fn ssh_target(&self, node: &TangoNode) -> SshTarget {
        SshTarget {
            fqdn: node.fqdn.clone(),
            username: non_empty(&node.ssh_username)
                .unwrap_or(&self.ssh_username)
                .to_string(),
            key_path: non_empty(&node.ssh_key_path)
                .unwrap_or(&self.ssh_key_path)
                .to_string(),
        }
    }

    /// Effective volumes directory for a node, if any is configured
    pub fn volumes_path_for<'a>(&'a self, node: &'a TangoNode) -> Option<&'a str> {
        non_empty(&node.volumes_path).or(non_empty(&self.volumes_path))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
docker_hub_org: myorg
ssh_key_path: /keys/default
ssh_username: deploy
volumes_path: /srv/volumes
tango_nodes:
  zulu:
    fqdn: zulu.example.com
  alpha:
    fqdn: alpha.example.com
    ssh_username: root
    ssh_key_path: /keys/alpha
    volumes_path: /data/volumes
"#;

    fn sample() -> Config {
        Config::from_yaml_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_parse_keeps_file_order() {
        let config = sample();
        assert_eq!(config.docker_hub_org, "myorg");
        assert_eq!(config.node_names(), vec!["zulu", "alpha"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_volumes_path_is_optional() {
        let config = Config::from_yaml_str(
            "docker_hub_org: o\nssh_key_path: k\nssh_username: u\ntango_nodes:\n  a:\n    fqdn: a.example.com\n",
        )
        .unwrap();
        assert_eq!(config.volumes_path, None);
        assert_eq!(config.volumes_path_for(&config.tango_nodes[0]), None);
    }

    #[test]
    fn test_empty_node_map() {
        let config = Config::from_yaml_str(
            "docker_hub_org: o\nssh_key_path: k\nssh_username: u\ntango_nodes:\n",
        )
        .unwrap();
        assert!(config.tango_nodes.is_empty());
    }

    #[test]
    fn test_ignores_unknown_fields() {
        let annotated = SAMPLE
            .replace("ssh_username: deploy", "ssh_username: deploy\ncomment: staging fleet")
            .replace(
                "fqdn: zulu.example.com",
                "fqdn: zulu.example.com\n    rack: b2",
            );
        let config = Config::from_yaml_str(&annotated).unwrap();
        assert_eq!(config.node_names(), vec!["zulu", "alpha"]);
    }

    #[test]
    fn test_rejects_duplicate_nodes() {
        let duplicate = format!("{}  zulu:\n    fqdn: other.example.com\n", SAMPLE);
        assert!(Config::from_yaml_str(&duplicate).is_err());
    }

    #[test]
    fn test_ssh_target_overrides() {
        let config = sample();
        let zulu = config.node("zulu").unwrap();
        let alpha = config.node("alpha").unwrap();

        let target = config.ssh_target(zulu);
        assert_eq!(target.username, "deploy");
        assert_eq!(target.key_path, "/keys/default");

        let target = config.ssh_target(alpha);
        assert_eq!(target.username, "root");
        assert_eq!(target.key_path, "/keys/alpha");
        assert_eq!(target.fqdn, "alpha.example.com");
    }

    #[test]
    fn test_cli_overrides_replace_globals_only() {
        let mut config = sample();
        config.apply_overrides(Overrides {
            docker_hub_org: Some("other".to_string()),
            ssh_key_path: None,
            ssh_username: Some("ops".to_string()),
        });

        assert_eq!(config.docker_hub_org, "other");
        assert_eq!(config.ssh_key_path, "/keys/default");

        // Per-node settings still take precedence over the overridden default
        assert_eq!(config.ssh_target(config.node("zulu").unwrap()).username, "ops");
        assert_eq!(config.ssh_target(config.node("alpha").unwrap()).username, "root");
    }

    #[test]
    fn test_empty_node_overrides_fall_back_to_globals() {
        let config = Config::from_yaml_str(
            r#"
docker_hub_org: o
ssh_key_path: /keys/default
ssh_username: deploy
volumes_path: /srv/volumes
tango_nodes:
  a:
    fqdn: a.example.com
    ssh_username: ''
    ssh_key_path: ''
    volumes_path: ''
"#,
        )
        .unwrap();
        assert!(config.validate().is_ok());

        let node = config.node("a").unwrap();
        let target = config.ssh_target(node);
        assert_eq!(target.username, "deploy");
        assert_eq!(target.key_path, "/keys/default");
        assert_eq!(target.argv("docker pull o/x")[3], "/keys/default");
        assert_eq!(target.argv("docker pull o/x")[4], "deploy@a.example.com");
        assert_eq!(config.volumes_path_for(node), Some("/srv/volumes"));
    }

    #[test]
    fn test_empty_global_volumes_path_is_unset() {
        let mut config = sample();
        config.volumes_path = Some(String::new());
        assert_eq!(config.volumes_path_for(config.node("zulu").unwrap()), None);
    }

    #[test]
    fn test_volumes_path_for() {
        let config = sample();
        assert_eq!(
            config.volumes_path_for(config.node("zulu").unwrap()),
            Some("/srv/volumes")
        );
        assert_eq!(
            config.volumes_path_for(config.node("alpha").unwrap()),
            Some("/data/volumes")
        );
    }

    #[test]
    fn test_select_nodes() {
        let config = sample();

        let all = config.select_nodes(&NodeSelector::All).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "zulu");

        let named = config
            .select_nodes(&NodeSelector::parse("alpha,zulu,alpha").unwrap())
            .unwrap();
        let names: Vec<&str> = named.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zulu"]);
    }

    #[test]
    fn test_unknown_node_lists_known_names() {
        let config = sample();
        let err = config
            .select_nodes(&NodeSelector::parse("alpha,nope").unwrap())
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("nope"));
        assert!(message.contains("zulu, alpha"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = sample();
        assert!(config.validate().is_ok());

        config.docker_hub_org = "My Org".to_string();
        assert!(config.validate().is_err());
        config.docker_hub_org = "myorg".to_string();

        config.ssh_username = String::new();
        assert!(config.validate().is_err());
        config.ssh_username = "deploy".to_string();

        config.tango_nodes[0].fqdn = String::new();
        assert!(config.validate().is_err());
        config.tango_nodes[0].fqdn = "zulu.example.com".to_string();

        config.tango_nodes[0].name = "all".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.tango_nodes.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/tango/config.yaml").unwrap_err();
        assert!(matches!(err, TangoError::ConfigRead { .. }));
        assert!(err.is_config_error());
    }
}
