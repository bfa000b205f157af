//! Tango Client
//!
//! Drives the local `docker` CLI and `ssh` to build images and deploy them
//! to Tango nodes.
//!
//! All operations run sequentially: one process at a time, one node at a
//! time. Failures on a node are collected into reports so the remaining
//! nodes are still processed.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tango_client::{SystemRunner, TangoClient};
//! use tango_core::{Config, NodeSelector};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let client = TangoClient::new(config, Arc::new(SystemRunner));
//!
//!     let built = client.build("./web", "web").await?;
//!     let report = client.deploy(&built.latest, &NodeSelector::All).await?;
//!     println!("{} node(s) failed", report.failures().count());
//!     Ok(())
//! }
//! ```

pub mod docker;
pub mod error;
pub mod process;
pub mod remote;

// Re-export commonly used types
pub use docker::{BuiltImage, DockerClient};
pub use error::{ClientError, Result};
pub use process::{DryRunRunner, Invocation, ProcessOutput, ProcessRunner, SystemRunner};
pub use remote::RemoteExecutor;

use serde::Serialize;
use std::sync::Arc;
use tango_core::{Config, ImageRef, NodeSelector, TangoNode};
use tracing::{error, info, warn};

/// High-level Tango operations over a loaded configuration
pub struct TangoClient {
    config: Config,
    docker: DockerClient,
    remote: RemoteExecutor,
}

/// Result of an operation on one node
#[derive(Debug)]
pub struct NodeOutcome<T> {
    pub node: String,
    pub fqdn: String,
    pub result: Result<T>,
}

impl<T> NodeOutcome<T> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-node results of a deployment
#[derive(Debug)]
pub struct DeployReport {
    pub image: String,
    pub outcomes: Vec<NodeOutcome<()>>,
}

impl DeployReport {
    /// Outcomes that failed
    pub fn failures(&self) -> impl Iterator<Item = &NodeOutcome<()>> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// What an `images` or `volumes` query found on one node
#[derive(Debug, Serialize)]
pub struct NodeListing {
    pub node: String,
    pub fqdn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<NodeOutcome<Vec<String>>> for NodeListing {
    fn from(outcome: NodeOutcome<Vec<String>>) -> Self {
        let (entries, error) = match outcome.result {
            Ok(entries) => (Some(entries), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            node: outcome.node,
            fqdn: outcome.fqdn,
            entries,
            error,
        }
    }
}

impl TangoClient {
    /// Create a client over a validated configuration
    ///
    /// # Arguments
    /// * `config` - Configuration with command-line overrides already applied
    /// * `runner` - Process runner used for every docker and ssh invocation
    pub fn new(config: Config, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            config,
            docker: DockerClient::new(runner.clone()),
            remote: RemoteExecutor::new(runner),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build an image locally under the configured organization
    ///
    /// # Arguments
    /// * `dockerfile` - Local directory containing a Dockerfile, or a URL to one
    /// * `image_name` - Bare image name, without org or tag
    pub async fn build(&self, dockerfile: &str, image_name: &str) -> Result<BuiltImage> {
        let image = ImageRef::new(&self.config.docker_hub_org, image_name)?;
        self.docker.check_available().await?;
        self.docker.build(dockerfile, &image).await
    }

    /// Deploy an image from Docker Hub to the selected nodes
    ///
    /// # Arguments
    /// * `image` - Full reference including org, e.g. `myorg/web:latest`
    /// * `selector` - Nodes to deploy to
    pub async fn deploy(&self, image: &str, selector: &NodeSelector) -> Result<DeployReport> {
        let image = ImageRef::parse(image)?;
        let nodes = self.config.select_nodes(selector)?;
        Ok(self.deploy_to(&image, nodes).await)
    }

    /// All-in-one: build, push `latest`, and deploy it to every node
    pub async fn aio(&self, dockerfile: &str, image_name: &str) -> Result<(BuiltImage, DeployReport)> {
        let built = self.build(dockerfile, image_name).await?;
        self.docker.push(&built.latest).await?;

        let image = ImageRef::parse(&built.latest)?;
        let nodes = self.config.select_nodes(&NodeSelector::All)?;
        let report = self.deploy_to(&image, nodes).await;

        Ok((built, report))
    }

    /// List installed images on the selected nodes
    pub async fn images(&self, selector: &NodeSelector) -> Result<Vec<NodeListing>> {
        let nodes = self.config.select_nodes(selector)?;
        let mut listings: Vec<NodeListing> = Vec::with_capacity(nodes.len());

        for node in nodes {
            let target = self.config.ssh_target(node);
            let result = self.remote.list_images(&target).await;
            listings.push(outcome(node, result).into());
        }

        Ok(listings)
    }

    /// List volumes on the selected nodes
    ///
    /// A node without a configured volumes directory is reported as failed.
    pub async fn volumes(&self, selector: &NodeSelector) -> Result<Vec<NodeListing>> {
        let nodes = self.config.select_nodes(selector)?;
        let mut listings: Vec<NodeListing> = Vec::with_capacity(nodes.len());

        for node in nodes {
            let result = match self.config.volumes_path_for(node) {
                Some(path) => {
                    let target = self.config.ssh_target(node);
                    self.remote.list_volumes(&target, path).await
                }
                None => {
                    warn!("Node {} has no volumes_path configured", node.name);
                    Err(ClientError::NoVolumesPath(node.name.clone()))
                }
            };
            listings.push(outcome(node, result).into());
        }

        Ok(listings)
    }

    async fn deploy_to(&self, image: &ImageRef, nodes: Vec<&TangoNode>) -> DeployReport {
        if nodes.is_empty() {
            warn!("No nodes selected, nothing to deploy");
        }

        let mut outcomes = Vec::with_capacity(nodes.len());
        for node in nodes {
            let target = self.config.ssh_target(node);
            let result = self.remote.deploy_image(image, &target).await;
            if let Err(e) = &result {
                error!("Deployment to {} failed: {}", node.name, e);
            }
            outcomes.push(outcome(node, result));
        }

        let report = DeployReport {
            image: image.to_string(),
            outcomes,
        };
        info!(
            "Deployed {} to {}/{} node(s)",
            report.image,
            report.outcomes.len() - report.failures().count(),
            report.outcomes.len()
        );
        report
    }
}

fn outcome<T>(node: &TangoNode, result: Result<T>) -> NodeOutcome<T> {
    NodeOutcome {
        node: node.name.clone(),
        fqdn: node.fqdn.clone(),
        result,
    }
}
