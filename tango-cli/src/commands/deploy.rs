//! Deploy command handlers

use anyhow::{Context, Result};
use colored::*;
use tango_client::{DeployReport, TangoClient};
use tango_core::NodeSelector;

/// Deploy an image to the selected nodes
pub async fn deploy(client: &TangoClient, image_name: &str, nodes: &str) -> Result<()> {
    let selector = NodeSelector::parse(nodes)?;
    let report = client
        .deploy(image_name, &selector)
        .await
        .with_context(|| format!("Failed to deploy {}", image_name))?;

    print_deploy_report(&report)
}

/// Print one line per node and fail if any node failed
pub fn print_deploy_report(report: &DeployReport) -> Result<()> {
    if report.outcomes.is_empty() {
        println!("{}", "No Tango nodes configured.".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "Deployment of {} to {} node(s):",
            report.image,
            report.outcomes.len()
        )
        .bold()
    );
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(()) => println!(
                "  {} {} ({})",
                "✓".green(),
                outcome.node.bold(),
                outcome.fqdn.dimmed()
            ),
            Err(e) => println!(
                "  {} {} ({}): {}",
                "✗".red(),
                outcome.node.bold(),
                outcome.fqdn.dimmed(),
                e.to_string().red()
            ),
        }
    }

    let failed = report.failures().count();
    if failed > 0 {
        anyhow::bail!(
            "Deployment failed on {} of {} node(s)",
            failed,
            report.outcomes.len()
        );
    }

    Ok(())
}
