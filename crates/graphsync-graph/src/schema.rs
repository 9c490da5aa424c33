//! Neo4j schema initialization (indexes and constraints).

use anyhow::Result;
use neo4rs::Query;
use tracing::info;

use crate::GraphClient;

/// Cypher statements for schema initialization.
///
/// `User` gets plain indexes on both merge keys rather than uniqueness
/// constraints: the Users stream merges on `userId` and the Transactions
/// stream on `vpa`, so a node may exist with only one of the two set.
const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE INDEX user_id IF NOT EXISTS FOR (u:User) ON (u.userId)",
    "CREATE INDEX user_vpa IF NOT EXISTS FOR (u:User) ON (u.vpa)",
    "CREATE CONSTRAINT device_id IF NOT EXISTS FOR (d:Device) REQUIRE d.deviceId IS UNIQUE",
    "CREATE INDEX sent_money_txn IF NOT EXISTS FOR ()-[t:SENT_MONEY]-() ON (t.txnId)",
];

/// Initialize Neo4j schema with constraints and indexes.
///
/// Safe to run multiple times - uses IF NOT EXISTS clauses.
pub async fn initialize_schema(client: &GraphClient) -> Result<()> {
    info!("Initializing Neo4j schema...");

    for statement in SCHEMA_STATEMENTS {
        client.execute(Query::new(statement.to_string())).await?;
    }

    info!("Neo4j schema initialized ({} statements)", SCHEMA_STATEMENTS.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statements_are_idempotent() {
        assert!(SCHEMA_STATEMENTS.iter().all(|s| s.contains("IF NOT EXISTS")));
    }
}
