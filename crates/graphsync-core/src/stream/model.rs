//! Source record models, one per stream.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Status a transaction must carry to be replicated.
pub const ELIGIBLE_TXN_STATUS: &str = "SUCCESS";

/// A row read from a relational source.
pub trait SourceRecord: Send + Sync {
    /// Value of the column the stream's watermark tracks.
    fn created_at(&self) -> NaiveDateTime;
}

/// Row of the gateway `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub phone_number: String,
    pub kyc_status: Option<String>,
    pub risk_score: Option<f64>,
    pub created_at: NaiveDateTime,
}

/// Row of the gateway `user_devices` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub device_id: String,
    pub user_id: String,
    pub model_name: Option<String>,
    pub os_version: Option<String>,
    pub is_trusted: bool,
    pub last_login_ip: Option<String>,
    pub first_seen_at: NaiveDateTime,
}

/// Row of the switch `transactions` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub global_txn_id: String,
    pub payer_vpa: String,
    pub payee_vpa: String,
    pub amount: f64,
    pub status: String,
    pub created_at: NaiveDateTime,
}

impl SourceRecord for UserRecord {
    fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }
}

impl SourceRecord for DeviceRecord {
    fn created_at(&self) -> NaiveDateTime {
        self.first_seen_at
    }
}

impl SourceRecord for TransactionRecord {
    fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }
}

impl TransactionRecord {
    /// Whether the switch settled this transaction.
    pub fn is_eligible(&self) -> bool {
        self.status == ELIGIBLE_TXN_STATUS
    }
}
