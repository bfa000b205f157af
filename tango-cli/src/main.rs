//! Tango CLI
//!
//! Builds Docker images locally and deploys them to Tango nodes over SSH.

mod commands;
mod config;

use anyhow::Result;
use clap::{ArgAction, Parser};
use colored::*;
use commands::{Commands, handle_command};
use std::sync::Arc;
use tango_client::{DryRunRunner, ProcessRunner, SystemRunner, TangoClient};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tango")]
#[command(about = "Build Docker images and deploy them to Tango nodes", long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, env = "TANGO_CONFIG", default_value = config::DEFAULT_CONFIG_PATH)]
    config: String,

    /// Override the configuration's Docker Hub organization
    #[arg(long)]
    org: Option<String>,

    /// Override the configuration's default SSH key path
    #[arg(long)]
    ssh_key_path: Option<String>,

    /// Override the configuration's default SSH username
    #[arg(long)]
    ssh_username: Option<String>,

    /// Print the docker and ssh commands instead of running them
    #[arg(long)]
    dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = config::load(&cli.config, cli.overrides())?;

    let runner: Arc<dyn ProcessRunner> = if cli.dry_run {
        Arc::new(DryRunRunner)
    } else {
        Arc::new(SystemRunner)
    };
    let client = TangoClient::new(config, runner);

    handle_command(cli.command, &client).await
}

impl Cli {
    fn overrides(&self) -> tango_core::Overrides {
        tango_core::Overrides {
            docker_hub_org: self.org.clone(),
            ssh_key_path: self.ssh_key_path.clone(),
            ssh_username: self.ssh_username.clone(),
        }
    }
}

/// Logs go to stderr; RUST_LOG takes precedence over -v
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_overrides_parse_before_subcommand() {
        let cli = Cli::parse_from([
            "tango",
            "--org",
            "other",
            "--ssh-username",
            "ops",
            "deploy",
            "other/web:latest",
            "alpha,beta",
        ]);

        let overrides = cli.overrides();
        assert_eq!(overrides.docker_hub_org.as_deref(), Some("other"));
        assert_eq!(overrides.ssh_username.as_deref(), Some("ops"));
        assert_eq!(overrides.ssh_key_path, None);
        assert!(matches!(cli.command, Commands::Deploy { .. }));
    }

    #[test]
    fn test_images_defaults_to_all_nodes() {
        let cli = Cli::parse_from(["tango", "-vv", "images"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Images { nodes, json } => {
                assert_eq!(nodes, "all");
                assert!(!json);
            }
            _ => panic!("expected images command"),
        }
    }
}
