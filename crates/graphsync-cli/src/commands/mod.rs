//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::ConnectionArgs;

pub mod schema;
pub mod serve;
pub mod status;
pub mod sync;

/// Incremental sync of relational records into the fraud graph
#[derive(Parser)]
#[command(name = "graphsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub connections: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP trigger service
    Serve(serve::ServeArgs),

    /// Run sync passes now and print their outcome
    Sync(sync::SyncArgs),

    /// Show watermarks, source connections and graph counts
    Status,

    /// Create graph indexes and constraints
    Schema,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Serve(args) => serve::execute(args, &self.connections).await,
            Commands::Sync(args) => sync::execute(args, &self.connections).await,
            Commands::Status => status::execute(&self.connections).await,
            Commands::Schema => schema::execute(&self.connections).await,
        }
    }
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
    fn test_parse_sync_all_with_overrides() {
        let cli = Cli::try_parse_from([
            "graphsync",
            "sync",
            "all",
            "--batch-size",
            "50",
            "--rds-host",
            "db.internal",
        ])
        .unwrap();
        assert_eq!(cli.connections.batch_size, 50);
        assert_eq!(cli.connections.rds_host, "db.internal");
        assert!(matches!(cli.command, Commands::Sync(ref a) if a.stream == "all"));
    }

    #[test]
    fn test_batch_size_must_be_positive() {
        for arg in ["--batch-size=0", "--batch-size=-5"] {
            let parsed = Cli::try_parse_from(["graphsync", "sync", "users", arg]);
            assert!(parsed.is_err(), "{arg} should be rejected");
        }
        let cli = Cli::try_parse_from(["graphsync", "sync", "users", "--batch-size=1"]).unwrap();
        assert_eq!(cli.connections.batch_size, 1);
    }
}
