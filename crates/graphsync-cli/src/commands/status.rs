//! Engine status command.

use anyhow::Result;
use colored::Colorize;
use graphsync_core::ConnectionState;

use crate::config::ConnectionArgs;
use crate::engine::Engine;

/// Show watermarks per stream and graph counts.
pub async fn execute(connections: &ConnectionArgs) -> Result<()> {
    let engine = Engine::build(connections).await?;

    println!("{}", "Sync Status".bold());
    println!("{}", "─".repeat(56));

    for status in engine.orchestrator.status().await {
        let connection = match status.connection {
            ConnectionState::Connected => status.connection.to_string().green(),
            ConnectionState::Disconnected => status.connection.to_string().yellow(),
        };
        println!(
            "  {:<13} {}  ({} {})",
            status.stream.as_str().cyan(),
            status.watermark,
            status.source.dimmed(),
            connection
        );
    }

    println!("{}", "─".repeat(56));

    match engine.graph.get_counts().await {
        Ok(counts) => {
            println!("  Users:         {}", counts.users.to_string().cyan());
            println!("  Devices:       {}", counts.devices.to_string().cyan());
            println!("  Transfers:     {}", counts.transfers.to_string().cyan());
        }
        Err(e) => println!("  Graph:         {} ({:#})", "unavailable".red(), e),
    }

    engine.orchestrator.shutdown().await;
    Ok(())
}
