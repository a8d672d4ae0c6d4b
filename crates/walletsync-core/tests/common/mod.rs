#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, U256};
use serde_json::Value;
use tokio::sync::Semaphore;

use walletsync_core::{
    ApprovedNetworks, BalancePort, NetworkDescriptor, PortError, Profile, ProfilePort,
    StoragePort, SyncEngine, TransportEvent, TransportEventKind, TransportPort, WalletSession,
    WalletSyncConfig,
};

pub const ONE_ETH: u128 = 1_000_000_000_000_000_000;

pub fn account() -> Address {
    "0x000000000000000000000000000000000000dEaD"
        .parse()
        .expect("valid account")
}

pub fn other_account() -> Address {
    "0x000000000000000000000000000000000000bEEF"
        .parse()
        .expect("valid account")
}

pub fn config() -> WalletSyncConfig {
    WalletSyncConfig {
        project_id: "test-project".to_owned(),
        supported_chains: vec![1, 137],
        default_chain: Some(1),
        ..WalletSyncConfig::default()
    }
}

#[derive(Debug)]
pub struct MockTransport {
    available: bool,
    session: Mutex<Option<WalletSession>>,
    live: Mutex<bool>,
    events: Mutex<Vec<TransportEvent>>,
    next_sequence: AtomicU64,
    switch_error: Mutex<Option<PortError>>,
    approved: Mutex<ApprovedNetworks>,
    requests: Mutex<Vec<(String, Value)>>,
    connects: AtomicUsize,
    disconnects: AtomicUsize,
    connect_gate: Option<Arc<Semaphore>>,
}

impl MockTransport {
    pub fn with_session(accounts: Vec<Address>, chain_id: u64) -> Self {
        Self {
            available: true,
            session: Mutex::new(Some(WalletSession { accounts, chain_id })),
            live: Mutex::new(false),
            events: Mutex::new(Vec::new()),
            next_sequence: AtomicU64::new(0),
            switch_error: Mutex::new(None),
            approved: Mutex::new(ApprovedNetworks::all()),
            requests: Mutex::new(Vec::new()),
            connects: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
            connect_gate: None,
        }
    }

    pub fn rejecting() -> Self {
        let t = Self::with_session(Vec::new(), 1);
        *t.session.lock().expect("session lock") = None;
        t
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::with_session(vec![account()], 1)
        }
    }

    /// Marks the session as authorized before the engine starts.
    pub fn already_live(self) -> Self {
        *self.live.lock().expect("live lock") = true;
        self
    }

    /// Holds `connect` until the gate hands out a permit.
    pub fn gated_connect(self, gate: Arc<Semaphore>) -> Self {
        Self {
            connect_gate: Some(gate),
            ..self
        }
    }

    pub fn push_event(&self, kind: TransportEventKind) {
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.events
            .lock()
            .expect("events lock")
            .push(TransportEvent { sequence, kind });
    }

    pub fn fail_switch_with(&self, error: PortError) {
        *self.switch_error.lock().expect("switch lock") = Some(error);
    }

    pub fn restrict_to(&self, approved: ApprovedNetworks) {
        *self.approved.lock().expect("approved lock") = approved;
    }

    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

impl TransportPort for MockTransport {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn connect(&self) -> Result<WalletSession, PortError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.connect_gate {
            let _permit = gate
                .acquire()
                .await
                .map_err(|e| PortError::Transport(e.to_string()))?;
        }
        let session = self.session.lock().expect("session lock").clone();
        match session {
            Some(session) => {
                *self.live.lock().expect("live lock") = true;
                Ok(session)
            }
            None => Err(PortError::Rpc {
                code: 4001,
                message: "User rejected the request.".to_owned(),
            }),
        }
    }

    async fn restore_session(&self) -> Result<Option<WalletSession>, PortError> {
        if *self.live.lock().expect("live lock") {
            Ok(self.session.lock().expect("session lock").clone())
        } else {
            Ok(None)
        }
    }

    async fn disconnect(&self) -> Result<(), PortError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        *self.live.lock().expect("live lock") = false;
        Ok(())
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, PortError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push((method.to_owned(), params));
        if method == "wallet_switchEthereumChain" {
            if let Some(error) = self.switch_error.lock().expect("switch lock").clone() {
                return Err(error);
            }
        }
        Ok(Value::Null)
    }

    fn drain_events(&self) -> Result<Vec<TransportEvent>, PortError> {
        Ok(std::mem::take(&mut *self.events.lock().expect("events lock")))
    }

    fn approved_networks(&self) -> ApprovedNetworks {
        self.approved.lock().expect("approved lock").clone()
    }
}

/// Balance resolver that counts calls and can be held back by a gate.
#[derive(Debug, Clone)]
pub struct CountingBalance {
    pub calls: Arc<AtomicUsize>,
    pub gate: Option<Arc<Semaphore>>,
    pub wei: U256,
}

impl CountingBalance {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            gate: None,
            wei: U256::from(ONE_ETH),
        }
    }

    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new()
        }
    }
}

impl BalancePort for CountingBalance {
    async fn balance(
        &self,
        _network: &NetworkDescriptor,
        _address: Address,
    ) -> Result<U256, PortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let _permit = gate
                .acquire()
                .await
                .map_err(|e| PortError::Transport(e.to_string()))?;
        }
        Ok(self.wei)
    }
}

#[derive(Debug, Clone)]
pub struct CountingProfile {
    pub calls: Arc<AtomicUsize>,
    pub gate: Option<Arc<Semaphore>>,
    pub name: Option<String>,
}

impl CountingProfile {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            gate: None,
            name: Some("dead.eth".to_owned()),
        }
    }

    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new()
        }
    }
}

impl ProfilePort for CountingProfile {
    async fn lookup<T: TransportPort>(
        &self,
        _transport: &T,
        _address: Address,
    ) -> Result<Profile, PortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let _permit = gate
                .acquire()
                .await
                .map_err(|e| PortError::Transport(e.to_string()))?;
        }
        Ok(Profile {
            name: self.name.clone(),
            avatar: None,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SharedStorage {
    pub entries: Arc<Mutex<HashMap<String, String>>>,
}

impl SharedStorage {
    pub fn with_marker(value: &str) -> Self {
        let storage = Self::default();
        storage
            .entries
            .lock()
            .expect("storage lock")
            .insert("WALLET_ID".to_owned(), value.to_owned());
        storage
    }

    pub fn marker(&self) -> Option<String> {
        self.entries
            .lock()
            .expect("storage lock")
            .get("WALLET_ID")
            .cloned()
    }
}

impl StoragePort for SharedStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PortError> {
        Ok(self.entries.lock().expect("storage lock").get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PortError> {
        self.entries
            .lock()
            .expect("storage lock")
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PortError> {
        self.entries.lock().expect("storage lock").remove(key);
        Ok(())
    }
}

pub type TestEngine =
    SyncEngine<MockTransport, MockTransport, CountingBalance, CountingProfile, SharedStorage>;

pub struct Harness {
    pub engine: TestEngine,
    pub balance_calls: Arc<AtomicUsize>,
    pub profile_calls: Arc<AtomicUsize>,
    pub storage: SharedStorage,
}

pub fn harness_with(
    injected: Option<MockTransport>,
    relay: Option<MockTransport>,
    balance: CountingBalance,
    profile: CountingProfile,
    storage: SharedStorage,
) -> Harness {
    let balance_calls = Arc::clone(&balance.calls);
    let profile_calls = Arc::clone(&profile.calls);
    let engine = SyncEngine::new(config(), injected, relay, balance, profile, storage.clone())
        .expect("valid engine config");
    Harness {
        engine,
        balance_calls,
        profile_calls,
        storage,
    }
}

/// Injected wallet holding `account()` on chain 1, plus an idle relay.
pub fn harness() -> Harness {
    harness_with(
        Some(MockTransport::with_session(vec![account()], 1)),
        Some(MockTransport::with_session(vec![other_account()], 137)),
        CountingBalance::new(),
        CountingProfile::new(),
        SharedStorage::default(),
    )
}

impl Harness {
    pub fn injected(&self) -> &MockTransport {
        self.engine.injected().expect("injected transport")
    }

    pub fn relay(&self) -> &MockTransport {
        self.engine.relay().expect("relay transport")
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }
}
