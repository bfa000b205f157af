//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod build;
mod deploy;
mod inventory;

use anyhow::Result;
use clap::Subcommand;
use tango_client::TangoClient;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Build a Docker image locally without deploying it
    Build {
        /// Path to a local directory containing a Dockerfile or a URL to a Dockerfile
        dockerfile: String,

        /// Name of the Docker image to build, without an org or tag
        image_name: String,
    },
    /// Deploy a Docker image from Docker Hub to Tango nodes
    Deploy {
        /// Name of the Docker image to deploy, including an org and tag
        image_name: String,

        /// Tango node names separated by commas (no spaces), or 'all' for all nodes
        nodes: String,
    },
    /// All-in-one: build, push and deploy a Docker image to all Tango nodes
    Aio {
        /// Path to a local directory containing a Dockerfile or a URL to a Dockerfile
        dockerfile: String,

        /// Name of the Docker image to build and deploy, without an org or tag
        image_name: String,
    },
    /// List the Docker images installed on Tango nodes
    Images {
        /// Tango node names separated by commas, or 'all'
        #[arg(default_value = "all")]
        nodes: String,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the volumes present on Tango nodes
    Volumes {
        /// Tango node names separated by commas, or 'all'
        #[arg(default_value = "all")]
        nodes: String,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `client` - Client over the loaded configuration
pub async fn handle_command(command: Commands, client: &TangoClient) -> Result<()> {
    match command {
        Commands::Build {
            dockerfile,
            image_name,
        } => build::build(client, &dockerfile, &image_name).await,
        Commands::Deploy { image_name, nodes } => {
            deploy::deploy(client, &image_name, &nodes).await
        }
        Commands::Aio {
            dockerfile,
            image_name,
        } => build::aio(client, &dockerfile, &image_name).await,
        Commands::Images { nodes, json } => inventory::images(client, &nodes, json).await,
        Commands::Volumes { nodes, json } => inventory::volumes(client, &nodes, json).await,
    }
}
