//! User synchronization to Neo4j.
//!
//! Creates or updates `(:User {userId})` with contact, KYC and risk
//! properties plus the derived payment handle.

use graphsync_core::graph::PAYMENT_HANDLE_SUFFIX;
use graphsync_core::UserRecord;
use neo4rs::Query;

pub const MERGE_USER: &str = "MERGE (u:User {userId: toString($uid)})
     SET u.phone = $phone,
         u.kyc = $kyc,
         u.riskScore = toFloat($risk),
         u.vpa = $phone + $suffix";

/// Build the merge for one user row.
pub fn merge_user_query(user: &UserRecord) -> Query {
    Query::new(MERGE_USER.to_string())
        .param("uid", user.user_id.as_str())
        .param("phone", user.phone_number.as_str())
        .param("kyc", user.kyc_status.clone())
        .param("risk", user.risk_score)
        .param("suffix", PAYMENT_HANDLE_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_merge_is_keyed_and_parameterised() {
        assert!(MERGE_USER.starts_with("MERGE (u:User {userId: toString($uid)})"));
        for param in ["$phone", "$kyc", "$risk", "$suffix"] {
            assert!(MERGE_USER.contains(param), "missing {param}");
        }
        assert!(!MERGE_USER.contains("CREATE"));
    }
}
