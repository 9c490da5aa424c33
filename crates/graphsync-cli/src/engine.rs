//! Composition root: builds the engine from configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use graphsync_core::{
    Checkpoints, ConnectionManager, GraphSink, Orchestrator, SourceId, StreamKind, StreamWorker,
};
use graphsync_graph::{GraphClient, Neo4jSink};
use graphsync_postgres::PgConnector;
use graphsync_redis::RedisCheckpoints;
use tracing::warn;

use crate::config::ConnectionArgs;

/// Every long-lived handle the process owns.
pub struct Engine {
    pub orchestrator: Arc<Orchestrator>,
    pub graph: GraphClient,
    pub sources: Vec<Arc<ConnectionManager>>,
}

impl Engine {
    /// Wire sources, checkpoints and the graph sink into one worker per stream.
    ///
    /// Nothing here dials a store; connections are made on first use.
    pub async fn build(args: &ConnectionArgs) -> Result<Self> {
        let sync_config = args.sync_config();
        let source_config = args.source_config();

        let gateway = Arc::new(ConnectionManager::new(
            SourceId::Gateway.as_str(),
            Arc::new(PgConnector::gateway(&source_config)),
        ));
        let switch = Arc::new(ConnectionManager::new(
            SourceId::Switch.as_str(),
            Arc::new(PgConnector::switch(&source_config)),
        ));

        let graph = GraphClient::connect_lazy(&args.graph_config()).await?;
        let sink: Arc<dyn GraphSink> = Arc::new(Neo4jSink::new(graph.clone()));

        let backend = RedisCheckpoints::open(&args.redis_url())
            .context("Invalid Redis checkpoint configuration")?;
        let checkpoints = Checkpoints::new(Arc::new(backend), sync_config.namespace.clone());

        let workers = StreamKind::ALL
            .into_iter()
            .map(|stream| {
                let connections = match stream.source() {
                    SourceId::Gateway => gateway.clone(),
                    SourceId::Switch => switch.clone(),
                };
                StreamWorker::new(
                    stream,
                    connections,
                    checkpoints.clone(),
                    sink.clone(),
                    sync_config.batch_size,
                )
            })
            .collect();

        let orchestrator = Arc::new(Orchestrator::new(workers, sync_config.queue_capacity));

        Ok(Self {
            orchestrator,
            graph,
            sources: vec![gateway, switch],
        })
    }

    /// Startup connects. Failures are logged and retried on first use.
    pub async fn connect(&self) {
        for source in &self.sources {
            source.connect().await;
        }
        if let Err(e) = self.graph.ping().await {
            warn!(error = %format!("{e:#}"), "Neo4j not reachable yet");
        }
    }
}
