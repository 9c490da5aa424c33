//! Graph store seam.

use async_trait::async_trait;

use crate::error::SyncResult;
use crate::stream::model::{DeviceRecord, TransactionRecord, UserRecord};

/// Suffix appended to a phone number to derive the user's payment handle.
pub const PAYMENT_HANDLE_SUFFIX: &str = "@upibank";

/// Payment handle derived from a contact handle, e.g. `9990001111@upibank`.
pub fn payment_handle(phone_number: &str) -> String {
    format!("{phone_number}{PAYMENT_HANDLE_SUFFIX}")
}

/// Merge-by-key mutations against the graph store.
///
/// Each call is one independent upsert: create if the key is absent, update
/// mutable properties otherwise, never duplicate. Applying the same record
/// twice leaves the graph unchanged.
#[async_trait]
pub trait GraphSink: Send + Sync {
    /// Merge a `User` keyed by `userId`; set phone, KYC, risk score and payment handle.
    async fn merge_user(&self, user: &UserRecord) -> SyncResult<()>;

    /// Merge a `Device` keyed by `deviceId` and link it to its `User` (keyed by `userId`).
    async fn merge_device(&self, device: &DeviceRecord) -> SyncResult<()>;

    /// Merge payer and payee `User` nodes keyed by `vpa` and a `SENT_MONEY`
    /// relationship between them keyed by transaction id.
    async fn merge_transfer(&self, txn: &TransactionRecord) -> SyncResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_handle() {
        assert_eq!(payment_handle("9990001111"), "9990001111@upibank");
    }
}
