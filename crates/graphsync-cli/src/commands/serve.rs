//! Trigger service command.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tracing::{info, warn};

use crate::config::ConnectionArgs;
use crate::engine::Engine;

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, default_value = "8000")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Also write logs to this file
    #[arg(long = "log")]
    pub log_file: Option<PathBuf>,

    /// Skip creating graph indexes on startup
    #[arg(long)]
    pub skip_schema: bool,
}

pub async fn execute(args: ServeArgs, connections: &ConnectionArgs) -> Result<()> {
    let engine = Engine::build(connections).await?;
    engine.connect().await;

    if !args.skip_schema {
        if let Err(e) = graphsync_graph::schema::initialize_schema(&engine.graph).await {
            warn!(error = %format!("{e:#}"), "Graph schema bootstrap failed");
        }
    }

    println!();
    println!("  {} {}", "graphsync".cyan().bold(), "Sync Engine".bold());
    println!();
    println!("  {}    POST http://{}:{}/sync/{{users,devices,transactions,all}}", "Triggers".green(), args.host, args.port);
    println!("  {}      GET  http://{}:{}/status", "Status".green(), args.host, args.port);
    println!("  {}      GET  http://{}:{}/health", "Health".green(), args.host, args.port);
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    graphsync_web::run_server(
        engine.orchestrator.clone(),
        &args.host,
        args.port,
        shutdown_signal(),
    )
    .await?;

    engine.orchestrator.shutdown().await;
    info!("graphsync stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
