//! Build command handlers
//!
//! Handles `build` and the all-in-one `aio` command.

use anyhow::{Context, Result};
use colored::*;
use tango_client::{BuiltImage, TangoClient};

use super::deploy::print_deploy_report;

/// Build an image locally
pub async fn build(client: &TangoClient, dockerfile: &str, image_name: &str) -> Result<()> {
    let built = client
        .build(dockerfile, image_name)
        .await
        .with_context(|| format!("Failed to build image {}", image_name))?;

    print_built_image(&built);
    Ok(())
}

/// Build, push and deploy to every node
pub async fn aio(client: &TangoClient, dockerfile: &str, image_name: &str) -> Result<()> {
    let (built, report) = client
        .aio(dockerfile, image_name)
        .await
        .with_context(|| format!("All-in-one deployment of {} failed", image_name))?;

    print_built_image(&built);
    println!("{} {}", "✓ Pushed".green().bold(), built.latest.cyan());
    println!();

    print_deploy_report(&report)
}

fn print_built_image(built: &BuiltImage) {
    println!("{}", "✓ Image built!".green().bold());
    println!("  Tagged: {}", built.timestamped.cyan());
    println!("  Tagged: {}", built.latest.cyan());
}
