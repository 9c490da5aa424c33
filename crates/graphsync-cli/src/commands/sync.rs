//! One-off sync passes.

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use graphsync_core::{PassOutcome, StreamKind};

use crate::config::ConnectionArgs;
use crate::engine::Engine;

#[derive(Args)]
pub struct SyncArgs {
    /// Stream to sync: users, devices, transactions or all
    #[arg(default_value = "all")]
    pub stream: String,
}

pub async fn execute(args: SyncArgs, connections: &ConnectionArgs) -> Result<()> {
    let streams = if args.stream.eq_ignore_ascii_case("all") {
        StreamKind::ALL.to_vec()
    } else {
        vec![args.stream.parse::<StreamKind>()?]
    };

    let engine = Engine::build(connections).await?;

    println!("{}", "Syncing to graph...".bold());
    let mut failed = 0;
    for stream in streams {
        let outcome = engine.orchestrator.run_now(stream).await?;
        match &outcome {
            PassOutcome::Idle => {
                println!("  {:<13} {}", stream.as_str().cyan(), "up to date".dimmed());
            }
            PassOutcome::Synced { records, watermark } => {
                println!(
                    "  {:<13} {} records, watermark {}",
                    stream.as_str().cyan(),
                    records.to_string().green(),
                    watermark.to_string().green()
                );
            }
            PassOutcome::Aborted { error } => {
                failed += 1;
                println!("  {:<13} {} {}", stream.as_str().cyan(), "failed:".red(), error);
            }
        }
    }

    engine.orchestrator.shutdown().await;

    if failed > 0 {
        bail!("{} stream(s) failed to sync", failed);
    }
    Ok(())
}
