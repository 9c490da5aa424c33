//! Device synchronization to Neo4j.
//!
//! Creates nodes and relationships:
//! - (:Device {deviceId})
//! - (:User {userId})-[:USES_DEVICE]->(:Device)

use graphsync_core::DeviceRecord;
use neo4rs::Query;

pub const MERGE_DEVICE: &str = "MERGE (u:User {userId: toString($uid)})
     MERGE (d:Device {deviceId: $did})
     SET d.model = $model,
         d.os = $os,
         d.trusted = $trusted,
         d.lastLoginIp = $ip,
         d.firstSeenAt = $seen
     MERGE (u)-[:USES_DEVICE]->(d)";

/// Build the merge for one device row.
pub fn merge_device_query(device: &DeviceRecord) -> Query {
    Query::new(MERGE_DEVICE.to_string())
        .param("uid", device.user_id.as_str())
        .param("did", device.device_id.as_str())
        .param("model", device.model_name.clone())
        .param("os", device.os_version.clone())
        .param("trusted", device.is_trusted)
        .param("ip", device.last_login_ip.clone())
        .param("seen", device.first_seen_at.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_merge_is_keyed_and_parameterised() {
        assert!(MERGE_DEVICE.starts_with("MERGE (u:User {userId: toString($uid)})"));
        assert!(MERGE_DEVICE.contains("MERGE (d:Device {deviceId: $did})"));
        assert!(MERGE_DEVICE.contains("MERGE (u)-[:USES_DEVICE]->(d)"));
        for param in ["$model", "$os", "$trusted", "$ip", "$seen"] {
            assert!(MERGE_DEVICE.contains(param), "missing {param}");
        }
        assert!(!MERGE_DEVICE.contains("CREATE"));
    }
}
