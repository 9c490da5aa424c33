//! Neo4j connection client.

use anyhow::{Context, Result};
use neo4rs::{ConfigBuilder, Graph, Query};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "password".to_string(),
            database: "neo4j".to_string(),
            max_connections: 8,
        }
    }
}

/// Client for Neo4j graph operations.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Create the connection pool without touching the server.
    ///
    /// neo4rs pools lazily: `Graph::connect` only builds the pool, and bolt
    /// connections are opened (and re-opened after failures) on demand. Use
    /// [`GraphClient::ping`] to check reachability.
    pub async fn connect_lazy(config: &GraphConfig) -> Result<Self> {
        let neo4j_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .db(config.database.as_str())
            .max_connections(config.max_connections)
            .fetch_size(200)
            .build()
            .context("Failed to build Neo4j config")?;

        let graph = Graph::connect(neo4j_config)
            .await
            .context("Failed to create Neo4j connection pool")?;

        Ok(Self { graph })
    }

    /// Create the pool and verify the server answers.
    pub async fn connect(config: &GraphConfig) -> Result<Self> {
        let client = Self::connect_lazy(config).await?;
        client.ping().await?;
        Ok(client)
    }

    /// Force a bolt handshake with a trivial query.
    pub async fn ping(&self) -> Result<()> {
        self.graph
            .run(Query::new("RETURN 1".to_string()))
            .await
            .context("Neo4j is not responding to queries")
    }

    /// Execute a Cypher query that returns no results.
    pub async fn execute(&self, query: Query) -> Result<()> {
        self.graph.run(query).await.context("Neo4j query execution failed")?;
        Ok(())
    }

    /// Execute a Cypher query and return results as rows.
    pub async fn query(&self, query: Query) -> Result<Vec<neo4rs::Row>> {
        let mut result = self.graph.execute(query).await
            .context("Neo4j query failed")?;

        let mut rows = Vec::new();
        while let Some(row) = result.next().await.context("Failed to read Neo4j result")? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute a Cypher query and return a single scalar value.
    pub async fn query_scalar<T: DeserializeOwned>(&self, query: Query, field: &str) -> Result<Option<T>> {
        let rows = self.query(query).await?;
        if let Some(row) = rows.into_iter().next() {
            let val: T = row.get(field)
                .map_err(|e| anyhow::anyhow!("Failed to get field '{}': {:?}", field, e))?;
            Ok(Some(val))
        } else {
            Ok(None)
        }
    }

    /// Node and relationship counts for the replicated model.
    pub async fn get_counts(&self) -> Result<GraphCounts> {
        let count = |cypher: &str| Query::new(cypher.to_string());

        let users: i64 = self
            .query_scalar(count("MATCH (u:User) RETURN count(u) AS count"), "count")
            .await?
            .unwrap_or(0);
        let devices: i64 = self
            .query_scalar(count("MATCH (d:Device) RETURN count(d) AS count"), "count")
            .await?
            .unwrap_or(0);
        let transfers: i64 = self
            .query_scalar(count("MATCH ()-[r:SENT_MONEY]->() RETURN count(r) AS count"), "count")
            .await?
            .unwrap_or(0);

        Ok(GraphCounts {
            users: users as usize,
            devices: devices as usize,
            transfers: transfers as usize,
        })
    }
}

/// Node and relationship counts.
#[derive(Debug, Clone)]
pub struct GraphCounts {
    pub users: usize,
    pub devices: usize,
    pub transfers: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GraphConfig::default();
        assert_eq!(config.uri, "bolt://localhost:7687");
        assert_eq!(config.user, "neo4j");
        assert_eq!(config.database, "neo4j");
    }
}
