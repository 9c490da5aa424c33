//! Transaction synchronization to Neo4j.
//!
//! Creates nodes and relationships:
//! - (:User {vpa}) for payer and payee
//! - (:User)-[:SENT_MONEY {txnId}]->(:User)
//!
//! Payer and payee are keyed by payment handle, not by `userId` as in the
//! user merge. Whether both keys always land on the same node is an open
//! data-modeling question; the two merges are kept as they are.

use graphsync_core::TransactionRecord;
use neo4rs::Query;

pub const MERGE_TRANSFER: &str = "MERGE (s:User {vpa: $payer})
     MERGE (r:User {vpa: $payee})
     MERGE (s)-[t:SENT_MONEY {txnId: $tid}]->(r)
     SET t.amount = toFloat($amt),
         t.timestamp = $ts";

/// Build the merge for one transaction row.
pub fn merge_transfer_query(txn: &TransactionRecord) -> Query {
    Query::new(MERGE_TRANSFER.to_string())
        .param("payer", txn.payer_vpa.as_str())
        .param("payee", txn.payee_vpa.as_str())
        .param("tid", txn.global_txn_id.as_str())
        .param("amt", txn.amount)
        .param("ts", txn.created_at.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_keyed_by_txn_id() {
        assert!(MERGE_TRANSFER.contains("MERGE (s)-[t:SENT_MONEY {txnId: $tid}]->(r)"));
        // Mutable properties are SET, not part of the merge pattern.
        assert!(MERGE_TRANSFER.contains("SET t.amount = toFloat($amt)"));
    }
}
