//! In-memory checkpoint, source and graph doubles.
//!
//! They follow the contracts of the real adapters closely enough to exercise
//! the engine: the source filters and orders like the SQL queries do, and
//! the graph merges by key like the Cypher statements do.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};

use crate::checkpoint::{epoch, CheckpointBackend};
use crate::error::{SyncError, SyncResult};
use crate::graph::{payment_handle, GraphSink};
use crate::source::{SourceClient, SourceConnector};
use crate::stream::model::{
    DeviceRecord, SourceRecord, TransactionRecord, UserRecord,
};

/// Timestamp `secs` seconds after the default epoch.
pub fn ts(secs: i64) -> NaiveDateTime {
    epoch() + Duration::seconds(secs)
}

pub fn user(n: i64) -> UserRecord {
    UserRecord {
        user_id: n.to_string(),
        phone_number: format!("99900{n:05}"),
        kyc_status: Some("VERIFIED".to_string()),
        risk_score: Some(n as f64 / 100.0),
        created_at: ts(n),
    }
}

pub fn device(n: i64, user_id: i64) -> DeviceRecord {
    DeviceRecord {
        device_id: format!("dev-{n}"),
        user_id: user_id.to_string(),
        model_name: Some("Pixel 8".to_string()),
        os_version: Some("Android 14".to_string()),
        is_trusted: true,
        last_login_ip: Some("10.0.0.1".to_string()),
        first_seen_at: ts(n),
    }
}

pub fn txn(n: i64, status: &str) -> TransactionRecord {
    TransactionRecord {
        global_txn_id: format!("TXN{n:06}"),
        payer_vpa: format!("payer{}@upibank", n % 7),
        payee_vpa: format!("payee{}@upibank", n % 5),
        amount: 100.0 + n as f64,
        status: status.to_string(),
        created_at: ts(n),
    }
}

// ---------------------------------------------------------------------------
// Checkpoints
// ---------------------------------------------------------------------------

/// Checkpoint backend over a hash map, with an outage switch.
#[derive(Default)]
pub struct MemoryCheckpoints {
    values: Mutex<HashMap<String, String>>,
    failing: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryCheckpoints {
    pub fn insert(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check(&self) -> SyncResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(SyncError::checkpoint("connection refused"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CheckpointBackend for MemoryCheckpoints {
    async fn load(&self, key: &str) -> SyncResult<Option<String>> {
        self.check()?;
        Ok(self.value(key))
    }

    async fn store(&self, key: &str, value: &str) -> SyncResult<()> {
        self.check()?;
        self.insert(key, value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

#[derive(Default)]
struct SourceTables {
    users: Vec<UserRecord>,
    devices: Vec<DeviceRecord>,
    transactions: Vec<TransactionRecord>,
    lower_bounds: Vec<NaiveDateTime>,
}

/// Relational source over in-memory tables.
#[derive(Default)]
pub struct MemorySource {
    tables: Mutex<SourceTables>,
    closed: AtomicBool,
    failing: AtomicBool,
    fetches: AtomicUsize,
}

impl MemorySource {
    pub fn add_users(&self, users: impl IntoIterator<Item = UserRecord>) {
        self.tables.lock().unwrap().users.extend(users);
    }

    pub fn add_devices(&self, devices: impl IntoIterator<Item = DeviceRecord>) {
        self.tables.lock().unwrap().devices.extend(devices);
    }

    pub fn add_transactions(&self, txns: impl IntoIterator<Item = TransactionRecord>) {
        self.tables.lock().unwrap().transactions.extend(txns);
    }

    /// Simulate the server dropping the connection.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Make every query fail until switched off.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// The `after` bound of every query issued, in order.
    pub fn lower_bounds(&self) -> Vec<NaiveDateTime> {
        self.tables.lock().unwrap().lower_bounds.clone()
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn reopen(&self) {
        self.closed.store(false, Ordering::SeqCst);
    }

    fn select<R: SourceRecord + Clone>(
        &self,
        rows: impl Fn(&SourceTables) -> Vec<R>,
        after: NaiveDateTime,
        limit: i64,
    ) -> SyncResult<Vec<R>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.closed.load(Ordering::SeqCst) {
            return Err(SyncError::query("connection closed"));
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(SyncError::query("relation does not exist"));
        }
        let mut tables = self.tables.lock().unwrap();
        tables.lower_bounds.push(after);
        let mut selected: Vec<R> = rows(&tables)
            .into_iter()
            .filter(|r| r.created_at() > after)
            .collect();
        selected.sort_by_key(|r| r.created_at());
        selected.truncate(limit.max(0) as usize);
        Ok(selected)
    }
}

#[async_trait]
impl SourceClient for MemorySource {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn fetch_users(&self, after: NaiveDateTime, limit: i64) -> SyncResult<Vec<UserRecord>> {
        self.select(|t| t.users.clone(), after, limit)
    }

    async fn fetch_devices(
        &self,
        after: NaiveDateTime,
        limit: i64,
    ) -> SyncResult<Vec<DeviceRecord>> {
        self.select(|t| t.devices.clone(), after, limit)
    }

    async fn fetch_transactions(
        &self,
        after: NaiveDateTime,
        limit: i64,
    ) -> SyncResult<Vec<TransactionRecord>> {
        self.select(
            |t| {
                t.transactions
                    .iter()
                    .filter(|r| r.is_eligible())
                    .cloned()
                    .collect()
            },
            after,
            limit,
        )
    }
}

/// Connector handing out (and reopening) one [`MemorySource`].
pub struct MemoryConnector {
    source: Arc<MemorySource>,
    refusing: AtomicBool,
    hanging: AtomicBool,
    attempts: AtomicUsize,
    connects: AtomicUsize,
}

impl MemoryConnector {
    pub fn new(source: Arc<MemorySource>) -> Self {
        Self {
            source,
            refusing: AtomicBool::new(false),
            hanging: AtomicBool::new(false),
            attempts: AtomicUsize::new(0),
            connects: AtomicUsize::new(0),
        }
    }

    pub fn set_refusing(&self, refusing: bool) {
        self.refusing.store(refusing, Ordering::SeqCst);
    }

    /// Make every later connect call wait forever, like a host that
    /// accepts the TCP handshake and then goes silent.
    pub fn set_hanging(&self, hanging: bool) {
        self.hanging.store(hanging, Ordering::SeqCst);
    }

    /// Connect calls, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Successful connects.
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceConnector for MemoryConnector {
    async fn connect(&self) -> SyncResult<Arc<dyn SourceClient>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.hanging.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.refusing.load(Ordering::SeqCst) {
            return Err(SyncError::query("connection refused"));
        }
        self.source.reopen();
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.source.clone())
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// `(label, key property, key value)`.
pub type NodeKey = (&'static str, &'static str, String);

pub type Properties = BTreeMap<&'static str, String>;

/// Full contents of a [`MemoryGraph`], comparable across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphSnapshot {
    pub nodes: BTreeMap<NodeKey, Properties>,
    /// `SENT_MONEY` keyed by transaction id: `(payer, payee, properties)`.
    pub transfers: BTreeMap<String, (NodeKey, NodeKey, Properties)>,
    /// `USES_DEVICE` pairs.
    pub device_links: BTreeSet<(NodeKey, NodeKey)>,
}

/// Graph store applying merges to in-memory maps.
#[derive(Default)]
pub struct MemoryGraph {
    state: Mutex<GraphSnapshot>,
    mutations: AtomicUsize,
    fail_at: Mutex<Option<usize>>,
}

impl MemoryGraph {
    /// Fail the mutation with this zero-based index (counting all mutations).
    pub fn fail_at(&self, index: usize) {
        *self.fail_at.lock().unwrap() = Some(index);
    }

    pub fn clear_failure(&self) {
        *self.fail_at.lock().unwrap() = None;
    }

    /// Mutations attempted so far, including the failed one.
    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        self.state.lock().unwrap().clone()
    }

    pub fn node(&self, key: &NodeKey) -> Option<Properties> {
        self.state.lock().unwrap().nodes.get(key).cloned()
    }

    fn begin(&self) -> SyncResult<()> {
        let index = self.mutations.fetch_add(1, Ordering::SeqCst);
        if *self.fail_at.lock().unwrap() == Some(index) {
            return Err(SyncError::graph(format!("mutation {index} rejected")));
        }
        Ok(())
    }
}

fn merge_node(state: &mut GraphSnapshot, key: NodeKey) -> &mut Properties {
    state.nodes.entry(key).or_default()
}

pub fn user_key(user_id: &str) -> NodeKey {
    ("User", "userId", user_id.to_string())
}

pub fn vpa_key(vpa: &str) -> NodeKey {
    ("User", "vpa", vpa.to_string())
}

pub fn device_key(device_id: &str) -> NodeKey {
    ("Device", "deviceId", device_id.to_string())
}

#[async_trait]
impl GraphSink for MemoryGraph {
    async fn merge_user(&self, user: &UserRecord) -> SyncResult<()> {
        self.begin()?;
        let mut state = self.state.lock().unwrap();
        let props = merge_node(&mut state, user_key(&user.user_id));
        props.insert("phone", user.phone_number.clone());
        props.insert("kyc", user.kyc_status.clone().unwrap_or_default());
        props.insert(
            "riskScore",
            user.risk_score.map(|r| r.to_string()).unwrap_or_default(),
        );
        props.insert("vpa", payment_handle(&user.phone_number));
        Ok(())
    }

    async fn merge_device(&self, device: &DeviceRecord) -> SyncResult<()> {
        self.begin()?;
        let mut state = self.state.lock().unwrap();
        let owner = user_key(&device.user_id);
        let key = device_key(&device.device_id);
        merge_node(&mut state, owner.clone());
        let props = merge_node(&mut state, key.clone());
        props.insert("model", device.model_name.clone().unwrap_or_default());
        props.insert("os", device.os_version.clone().unwrap_or_default());
        props.insert("trusted", device.is_trusted.to_string());
        props.insert("lastLoginIp", device.last_login_ip.clone().unwrap_or_default());
        props.insert("firstSeenAt", device.first_seen_at.to_string());
        state.device_links.insert((owner, key));
        Ok(())
    }

    async fn merge_transfer(&self, txn: &TransactionRecord) -> SyncResult<()> {
        self.begin()?;
        let mut state = self.state.lock().unwrap();
        let payer = vpa_key(&txn.payer_vpa);
        let payee = vpa_key(&txn.payee_vpa);
        merge_node(&mut state, payer.clone());
        merge_node(&mut state, payee.clone());
        let rel = state
            .transfers
            .entry(txn.global_txn_id.clone())
            .or_insert_with(|| (payer, payee, Properties::new()));
        rel.2.insert("amount", txn.amount.to_string());
        rel.2.insert("timestamp", txn.created_at.to_string());
        Ok(())
    }
}
