//! Batch selects, one per stream.
//!
//! `$1` is the watermark, `$2` the batch size. Rows come back strictly newer
//! than the watermark, oldest first.

use anyhow::{Context, Result};
use graphsync_core::{DeviceRecord, TransactionRecord, UserRecord};
use tokio_postgres::Row;

pub const SELECT_USERS: &str = "SELECT user_id::text AS user_id, phone_number, \
     kyc_status::text AS kyc_status, risk_score::float8 AS risk_score, created_at \
     FROM users \
     WHERE created_at > $1 \
     ORDER BY created_at ASC \
     LIMIT $2";

pub const SELECT_DEVICES: &str = "SELECT device_id, user_id::text AS user_id, model_name, \
     os_version, is_trusted, last_login_ip, first_seen_at \
     FROM user_devices \
     WHERE first_seen_at > $1 \
     ORDER BY first_seen_at ASC \
     LIMIT $2";

pub const SELECT_TRANSACTIONS: &str = "SELECT global_txn_id, payer_vpa, payee_vpa, \
     amount::float8 AS amount, status::text AS status, created_at \
     FROM transactions \
     WHERE created_at > $1 AND status = 'SUCCESS' \
     ORDER BY created_at ASC \
     LIMIT $2";

pub fn user_from_row(row: &Row) -> Result<UserRecord> {
    Ok(UserRecord {
        user_id: row.try_get("user_id").context("users.user_id")?,
        phone_number: row.try_get("phone_number").context("users.phone_number")?,
        kyc_status: row.try_get("kyc_status").context("users.kyc_status")?,
        risk_score: row.try_get("risk_score").context("users.risk_score")?,
        created_at: row.try_get("created_at").context("users.created_at")?,
    })
}

pub fn device_from_row(row: &Row) -> Result<DeviceRecord> {
    Ok(DeviceRecord {
        device_id: row.try_get("device_id").context("user_devices.device_id")?,
        user_id: row.try_get("user_id").context("user_devices.user_id")?,
        model_name: row.try_get("model_name").context("user_devices.model_name")?,
        os_version: row.try_get("os_version").context("user_devices.os_version")?,
        is_trusted: row
            .try_get::<_, Option<bool>>("is_trusted")
            .context("user_devices.is_trusted")?
            .unwrap_or(true),
        last_login_ip: row
            .try_get("last_login_ip")
            .context("user_devices.last_login_ip")?,
        first_seen_at: row
            .try_get("first_seen_at")
            .context("user_devices.first_seen_at")?,
    })
}

pub fn transaction_from_row(row: &Row) -> Result<TransactionRecord> {
    Ok(TransactionRecord {
        global_txn_id: row
            .try_get("global_txn_id")
            .context("transactions.global_txn_id")?,
        payer_vpa: row.try_get("payer_vpa").context("transactions.payer_vpa")?,
        payee_vpa: row.try_get("payee_vpa").context("transactions.payee_vpa")?,
        amount: row.try_get("amount").context("transactions.amount")?,
        status: row.try_get("status").context("transactions.status")?,
        created_at: row.try_get("created_at").context("transactions.created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries_bind_watermark_and_limit() {
        for sql in [SELECT_USERS, SELECT_DEVICES, SELECT_TRANSACTIONS] {
            assert!(sql.contains("> $1"), "{sql}");
            assert!(sql.contains("LIMIT $2"), "{sql}");
            assert!(sql.contains("ASC"), "{sql}");
        }
    }

    #[test]
    fn test_only_successful_transactions_selected() {
        assert!(SELECT_TRANSACTIONS.contains("status = 'SUCCESS'"));
        assert!(!SELECT_USERS.contains("status ="));
    }
}
