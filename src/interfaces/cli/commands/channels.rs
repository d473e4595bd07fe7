//! Lead channel management commands

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::metrics::{ChannelId, ChannelScope};
use crate::services::{KpiService, RequestContext};

pub async fn add_channel(
    service: &KpiService,
    ctx: &RequestContext,
    name: &str,
    is_active: bool,
) -> Result<(), CliError> {
    let channel = service.create_channel(ctx, name, is_active).await?;
    println!(
        "{} Added channel {} {}",
        "✓".bold().green(),
        channel.name.cyan(),
        format!("(id: {}, key: {})", channel.id, channel.key()).dimmed()
    );
    if !channel.is_active {
        println!(
            "  {}",
            "Channel is inactive and hidden from the entry form".yellow()
        );
    }
    Ok(())
}

pub async fn list_channels(
    service: &KpiService,
    ctx: &RequestContext,
    scope: ChannelScope,
) -> Result<(), CliError> {
    let channels = service.list_channels(ctx, scope).await?;

    if channels.is_empty() {
        println!("{} No channels found", "ℹ".bold().blue());
        return Ok(());
    }

    println!("{}", "Lead channels:".bold().green());
    println!();
    for channel in &channels {
        let status = if channel.is_active {
            "active".green()
        } else {
            "inactive".dimmed()
        };
        println!(
            "  {}  {:<28} {}",
            format!("{:>6}", channel.id).cyan(),
            channel.name,
            status
        );
    }
    println!();
    println!(
        "{} Total {} channels",
        "ℹ".bold().blue(),
        channels.len().to_string().green()
    );
    Ok(())
}

pub async fn toggle_channel(
    service: &KpiService,
    ctx: &RequestContext,
    id: i64,
    is_active: bool,
) -> Result<(), CliError> {
    let channel = service
        .set_channel_active(ctx, ChannelId(id), is_active)
        .await?;
    let status = if channel.is_active {
        "active".green()
    } else {
        "inactive".yellow()
    };
    println!(
        "{} Channel {} is now {}",
        "✓".bold().green(),
        channel.name.cyan(),
        status
    );
    Ok(())
}
