//! Graph schema bootstrap command.

use anyhow::Result;
use colored::Colorize;
use graphsync_graph::GraphClient;

use crate::config::ConnectionArgs;

pub async fn execute(connections: &ConnectionArgs) -> Result<()> {
    let client = GraphClient::connect(&connections.graph_config()).await?;
    graphsync_graph::schema::initialize_schema(&client).await?;
    println!("{}", "Graph schema ready.".green().bold());
    Ok(())
}
