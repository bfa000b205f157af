//! Inventory command handlers
//!
//! Handles `images` and `volumes`, which query what is installed on each
//! node.

use anyhow::{Context, Result};
use colored::*;
use tango_client::{NodeListing, TangoClient};
use tango_core::NodeSelector;

/// List images on the selected nodes
pub async fn images(client: &TangoClient, nodes: &str, json: bool) -> Result<()> {
    let selector = NodeSelector::parse(nodes)?;
    let listings = client
        .images(&selector)
        .await
        .context("Failed to list images")?;

    report(&listings, "image", json)
}

/// List volumes on the selected nodes
pub async fn volumes(client: &TangoClient, nodes: &str, json: bool) -> Result<()> {
    let selector = NodeSelector::parse(nodes)?;
    let listings = client
        .volumes(&selector)
        .await
        .context("Failed to list volumes")?;

    report(&listings, "volume", json)
}

fn report(listings: &[NodeListing], noun: &str, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(listings)?);
    } else {
        print_listings(listings, noun);
    }

    let failed = listings.iter().filter(|l| l.error.is_some()).count();
    if failed > 0 {
        anyhow::bail!("Failed to list {}s on {} node(s)", noun, failed);
    }

    Ok(())
}

fn print_listings(listings: &[NodeListing], noun: &str) {
    if listings.is_empty() {
        println!("{}", "No Tango nodes configured.".yellow());
        return;
    }

    for listing in listings {
        println!(
            "  {} {} ({})",
            "▸".cyan(),
            listing.node.bold(),
            listing.fqdn.dimmed()
        );

        match (&listing.entries, &listing.error) {
            (_, Some(error)) => println!("    {}", error.red()),
            (Some(entries), None) if entries.is_empty() => {
                println!("    {}", format!("No {}s found.", noun).yellow())
            }
            (Some(entries), None) => {
                for entry in entries {
                    println!("    {}", entry);
                }
            }
            (None, None) => {}
        }
        println!();
    }
}
