//! Replication lanes and the source databases they read from.

pub mod model;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// One independent source-to-graph replication lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Users,
    Devices,
    Transactions,
}

impl StreamKind {
    /// Every stream, in the order a full pass runs them.
    pub const ALL: [StreamKind; 3] = [Self::Users, Self::Devices, Self::Transactions];

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Devices => "devices",
            Self::Transactions => "transactions",
        }
    }

    /// Checkpoint field name, prefixed with the namespace to form the key.
    pub fn checkpoint_field(&self) -> &'static str {
        match self {
            Self::Users => "last_user_time",
            Self::Devices => "last_device_time",
            Self::Transactions => "last_txn_time",
        }
    }

    /// Source database the stream reads from.
    pub fn source(&self) -> SourceId {
        match self {
            Self::Users | Self::Devices => SourceId::Gateway,
            Self::Transactions => SourceId::Switch,
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamKind {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "users" => Ok(Self::Users),
            "devices" => Ok(Self::Devices),
            "transactions" => Ok(Self::Transactions),
            other => Err(SyncError::UnknownStream(other.to_string())),
        }
    }
}

/// Relational source database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    /// Onboarding database: users and their devices.
    Gateway,
    /// Payment switch database: transactions.
    Switch,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gateway => "gateway",
            Self::Switch => "switch",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stream_names() {
        assert_eq!("users".parse::<StreamKind>().unwrap(), StreamKind::Users);
        assert_eq!(" Transactions ".parse::<StreamKind>().unwrap(), StreamKind::Transactions);
        assert!(matches!(
            "ledger".parse::<StreamKind>(),
            Err(SyncError::UnknownStream(name)) if name == "ledger"
        ));
    }

    #[test]
    fn test_streams_map_to_sources() {
        assert_eq!(StreamKind::Users.source(), SourceId::Gateway);
        assert_eq!(StreamKind::Devices.source(), SourceId::Gateway);
        assert_eq!(StreamKind::Transactions.source(), SourceId::Switch);
    }

    #[test]
    fn test_checkpoint_fields_are_distinct() {
        let fields: std::collections::HashSet<_> =
            StreamKind::ALL.iter().map(|s| s.checkpoint_field()).collect();
        assert_eq!(fields.len(), StreamKind::ALL.len());
    }
}
