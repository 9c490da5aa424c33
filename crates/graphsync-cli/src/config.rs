//! Connection settings, read from flags or the environment.

use clap::Args;
use graphsync_core::config::{DEFAULT_BATCH_SIZE, DEFAULT_NAMESPACE, DEFAULT_QUEUE_CAPACITY};
use graphsync_core::SyncConfig;
use graphsync_graph::GraphConfig;
use graphsync_postgres::SourceConfig;

/// Settings for every store the engine talks to.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// PostgreSQL host serving both source databases
    #[arg(long, env = "RDS_HOST", default_value = "localhost", global = true)]
    pub rds_host: String,

    #[arg(long, env = "RDS_PORT", default_value_t = 5432, global = true)]
    pub rds_port: u16,

    #[arg(long, env = "RDS_USER", default_value = "postgres", global = true)]
    pub rds_user: String,

    #[arg(long, env = "RDS_PASSWORD", default_value = "password", global = true, hide_env_values = true)]
    pub rds_password: String,

    /// Database holding users and devices
    #[arg(long, env = "GATEWAY_DB", default_value = "gateway_db", global = true)]
    pub gateway_db: String,

    /// Database holding transactions
    #[arg(long, env = "SWITCH_DB", default_value = "switch_db", global = true)]
    pub switch_db: String,

    #[arg(long, env = "NEO4J_URI", default_value = "bolt://localhost:7687", global = true)]
    pub neo4j_uri: String,

    #[arg(long, env = "NEO4J_USER", default_value = "neo4j", global = true)]
    pub neo4j_user: String,

    #[arg(long, env = "NEO4J_PASSWORD", default_value = "password", global = true, hide_env_values = true)]
    pub neo4j_password: String,

    #[arg(long, env = "REDIS_HOST", default_value = "localhost", global = true)]
    pub redis_host: String,

    #[arg(long, env = "REDIS_PORT", default_value_t = 6379, global = true)]
    pub redis_port: u16,

    /// Maximum rows merged per pass
    #[arg(
        long,
        env = "SYNC_BATCH_SIZE",
        default_value_t = DEFAULT_BATCH_SIZE,
        value_parser = clap::value_parser!(i64).range(1..),
        global = true
    )]
    pub batch_size: i64,

    /// Prefix for checkpoint keys in Redis
    #[arg(long, env = "SYNC_CHECKPOINT_NAMESPACE", default_value = DEFAULT_NAMESPACE, global = true)]
    pub checkpoint_namespace: String,

    /// Pending trigger jobs held before further triggers are dropped
    #[arg(long, env = "SYNC_QUEUE_CAPACITY", default_value_t = DEFAULT_QUEUE_CAPACITY, global = true)]
    pub queue_capacity: usize,
}

impl ConnectionArgs {
    pub fn source_config(&self) -> SourceConfig {
        SourceConfig {
            host: self.rds_host.clone(),
            port: self.rds_port,
            user: self.rds_user.clone(),
            password: self.rds_password.clone(),
            gateway_db: self.gateway_db.clone(),
            switch_db: self.switch_db.clone(),
        }
    }

    pub fn graph_config(&self) -> GraphConfig {
        GraphConfig {
            uri: self.neo4j_uri.clone(),
            user: self.neo4j_user.clone(),
            password: self.neo4j_password.clone(),
            ..GraphConfig::default()
        }
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            batch_size: self.batch_size,
            namespace: self.checkpoint_namespace.clone(),
            queue_capacity: self.queue_capacity,
        }
    }

    pub fn redis_url(&self) -> String {
        graphsync_redis::redis_url(&self.redis_host, self.redis_port)
    }
}
