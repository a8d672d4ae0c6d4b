use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use alloy::primitives::utils::format_ether;
use alloy::primitives::Address;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::WalletSyncConfig;
use crate::domain::{
    caip_address, ApprovedNetworks, CaipNetwork, Connector, DerivedAccountState, Profile,
    ProviderHandle, StateSnapshot, Token, TransportEvent, TransportEventKind, WalletKind,
    WalletSession,
};
use crate::error::{ConfigError, WalletError};
use crate::networks;
use crate::ports::{
    BalancePort, PortError, ProfilePort, StoragePort, TransportPort, UNRECOGNIZED_CHAIN_CODE,
    UNSUPPORTED_CHAINS_CODE,
};
use crate::store::{ConnectionStore, FieldChange, StoreField};

pub const SWITCH_CHAIN_METHOD: &str = "wallet_switchEthereumChain";

type StateListener = Arc<dyn Fn(&StateSnapshot) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateSubscription(u64);

enum ActiveTransport<'a, I, R> {
    Injected(&'a I),
    Relay(&'a R),
}

impl<I: TransportPort, R: TransportPort> ActiveTransport<'_, I, R> {
    fn is_available(&self) -> bool {
        match self {
            ActiveTransport::Injected(t) => t.is_available(),
            ActiveTransport::Relay(t) => t.is_available(),
        }
    }

    async fn connect(&self) -> Result<WalletSession, PortError> {
        match self {
            ActiveTransport::Injected(t) => t.connect().await,
            ActiveTransport::Relay(t) => t.connect().await,
        }
    }

    async fn restore_session(&self) -> Result<Option<WalletSession>, PortError> {
        match self {
            ActiveTransport::Injected(t) => t.restore_session().await,
            ActiveTransport::Relay(t) => t.restore_session().await,
        }
    }

    async fn disconnect(&self) -> Result<(), PortError> {
        match self {
            ActiveTransport::Injected(t) => t.disconnect().await,
            ActiveTransport::Relay(t) => t.disconnect().await,
        }
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, PortError> {
        match self {
            ActiveTransport::Injected(t) => t.request(method, params).await,
            ActiveTransport::Relay(t) => t.request(method, params).await,
        }
    }

    fn approved_networks(&self) -> ApprovedNetworks {
        match self {
            ActiveTransport::Injected(t) => t.approved_networks(),
            ActiveTransport::Relay(t) => t.approved_networks(),
        }
    }
}

#[derive(Debug)]
struct EngineState {
    store: ConnectionStore,
    derived: DerivedAccountState,
    derived_address: Option<Address>,
    selected_network: Option<CaipNetwork>,
    epoch: u64,
    sync_seq: u64,
    /// Set once the profile lookup for this connection has been started.
    profile_requested: bool,
    resolved_profile: Option<(Address, Profile)>,
    /// Transport whose `connect` is awaiting the wallet.
    connecting: Option<WalletKind>,
    pairing_uri: Option<String>,
    last_published: Option<StateSnapshot>,
}

impl EngineState {
    fn snapshot(&self) -> StateSnapshot {
        let s = self.store.state();
        StateSnapshot {
            address: s.address,
            chain_id: s.chain_id,
            is_connected: s.is_connected,
            provider_kind: s.provider_kind,
            caip_address: self.derived.caip_address.clone(),
            profile_name: self.derived.profile_name.clone(),
            profile_image: self.derived.profile_image.clone(),
            balance: self.derived.balance.clone(),
            balance_symbol: self.derived.balance_symbol.clone(),
            explorer_url: self.derived.explorer_url.clone(),
            selected_network_id: self.selected_network.as_ref().and_then(|n| n.chain_id()),
            pairing_uri: self.pairing_uri.clone(),
        }
    }

    fn clear_derived(&mut self, default_network: Option<CaipNetwork>) {
        self.sync_seq = self.sync_seq.saturating_add(1);
        self.derived = DerivedAccountState::default();
        self.derived_address = None;
        self.profile_requested = false;
        self.resolved_profile = None;
        self.selected_network = default_network;
    }

    fn profile_for(&self, address: Address) -> Profile {
        match &self.resolved_profile {
            Some((owner, profile)) if *owner == address => profile.clone(),
            _ => Profile::default(),
        }
    }
}

struct SyncPlan {
    seq: u64,
    handle: ProviderHandle,
    address: Address,
    chain_id: u64,
    fetch_profile: bool,
}

#[derive(Default)]
struct StateListeners {
    next_id: u64,
    entries: Vec<(u64, StateListener)>,
}

pub struct SyncEngine<I, R, B, P, S>
where
    I: TransportPort,
    R: TransportPort,
    B: BalancePort,
    P: ProfilePort,
    S: StoragePort,
{
    config: WalletSyncConfig,
    injected: Option<I>,
    relay: Option<R>,
    balance: B,
    profile: P,
    storage: S,
    inner: Mutex<EngineState>,
    pending: Arc<Mutex<VecDeque<FieldChange>>>,
    listeners: Mutex<StateListeners>,
}

impl<I, R, B, P, S> SyncEngine<I, R, B, P, S>
where
    I: TransportPort,
    R: TransportPort,
    B: BalancePort,
    P: ProfilePort,
    S: StoragePort,
{
    pub fn new(
        config: WalletSyncConfig,
        injected: Option<I>,
        relay: Option<R>,
        balance: B,
        profile: P,
        storage: S,
    ) -> Result<Self, ConfigError> {
        config.validate(injected.is_some(), relay.is_some())?;

        let pending = Arc::new(Mutex::new(VecDeque::new()));
        let mut store = ConnectionStore::new();
        for field in [StoreField::Address, StoreField::ChainId, StoreField::IsConnected] {
            let queue = Arc::clone(&pending);
            store.subscribe(field, move |change: &FieldChange| {
                if let Ok(mut q) = queue.lock() {
                    q.push_back(*change);
                }
            });
        }

        let state = EngineState {
            store,
            derived: DerivedAccountState::default(),
            derived_address: None,
            selected_network: config.default_network(),
            epoch: 0,
            sync_seq: 0,
            profile_requested: false,
            resolved_profile: None,
            connecting: None,
            pairing_uri: None,
            last_published: None,
        };

        Ok(Self {
            config,
            injected,
            relay,
            balance,
            profile,
            storage,
            inner: Mutex::new(state),
            pending,
            listeners: Mutex::new(StateListeners::default()),
        })
    }

    pub fn config(&self) -> &WalletSyncConfig {
        &self.config
    }

    pub fn injected(&self) -> Option<&I> {
        self.injected.as_ref()
    }

    pub fn relay(&self) -> Option<&R> {
        self.relay.as_ref()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn state(&self) -> Result<MutexGuard<'_, EngineState>, WalletError> {
        self.inner
            .lock()
            .map_err(|e| WalletError::Internal(format!("engine lock poisoned: {e}")))
    }

    fn transport(&self, kind: WalletKind) -> Result<ActiveTransport<'_, I, R>, WalletError> {
        let transport = match kind {
            WalletKind::Injected => self.injected.as_ref().map(ActiveTransport::Injected),
            WalletKind::Relay => self.relay.as_ref().map(ActiveTransport::Relay),
        };
        transport.ok_or_else(|| {
            WalletError::AdapterUnavailable(format!("{kind} transport is not configured"))
        })
    }

    pub fn snapshot(&self) -> Result<StateSnapshot, WalletError> {
        Ok(self.state()?.snapshot())
    }

    pub fn connected_account(&self) -> Result<Option<(Address, u64)>, WalletError> {
        let g = self.state()?;
        let s = g.store.state();
        Ok(match (s.is_connected, s.address, s.chain_id) {
            (true, Some(address), Some(chain_id)) => Some((address, chain_id)),
            _ => None,
        })
    }

    pub fn subscribe_state<F>(&self, callback: F) -> Result<StateSubscription, WalletError>
    where
        F: Fn(&StateSnapshot) + Send + Sync + 'static,
    {
        let mut l = self
            .listeners
            .lock()
            .map_err(|e| WalletError::Internal(format!("listener lock poisoned: {e}")))?;
        l.next_id = l.next_id.saturating_add(1);
        let id = l.next_id;
        l.entries.push((id, Arc::new(callback)));
        Ok(StateSubscription(id))
    }

    pub fn unsubscribe_state(&self, subscription: StateSubscription) -> Result<bool, WalletError> {
        let mut l = self
            .listeners
            .lock()
            .map_err(|e| WalletError::Internal(format!("listener lock poisoned: {e}")))?;
        let before = l.entries.len();
        l.entries.retain(|(id, _)| *id != subscription.0);
        Ok(l.entries.len() != before)
    }

    pub fn requested_networks(&self) -> Vec<CaipNetwork> {
        self.config.requested_networks()
    }

    pub fn tokens(&self) -> std::collections::BTreeMap<String, Token> {
        self.config.caip_tokens()
    }

    pub fn connectors(&self) -> Vec<Connector> {
        let mut connectors = Vec::new();
        if self.relay.is_some() {
            connectors.push(networks::connector_preset(WalletKind::Relay));
        }
        if self.injected.is_some() {
            connectors.push(networks::connector_preset(WalletKind::Injected));
        }
        connectors
    }

    /// Networks the active session accepts; unrestricted when disconnected.
    pub fn approved_networks(&self) -> Result<ApprovedNetworks, WalletError> {
        let kind = self.state()?.store.state().provider_kind;
        match kind {
            Some(kind) => Ok(self.transport(kind)?.approved_networks()),
            None => Ok(ApprovedNetworks::all()),
        }
    }

    /// Silently re-establishes the session named by the persisted marker.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn restore(&self) -> Result<StateSnapshot, WalletError> {
        let marker = match self.storage.get(&self.config.storage_key) {
            Ok(marker) => marker,
            Err(e) => {
                warn!(error = %e, "failed to read wallet marker");
                None
            }
        };
        let Some(raw) = marker else {
            return self.snapshot();
        };
        let kind = match raw.parse::<WalletKind>() {
            Ok(kind) => kind,
            Err(e) => {
                warn!(error = %e, "dropping unrecognized wallet marker");
                self.forget_marker();
                return self.snapshot();
            }
        };
        let transport = match self.transport(kind) {
            Ok(t) if t.is_available() => t,
            _ => {
                info!(%kind, "persisted wallet is not available, dropping marker");
                self.forget_marker();
                return self.snapshot();
            }
        };

        let epoch = self.state()?.epoch;
        match transport.restore_session().await {
            Ok(Some(session)) => {
                let Some(address) = session.accounts.first().copied() else {
                    self.forget_marker();
                    return self.snapshot();
                };
                {
                    let mut g = self.state()?;
                    if g.epoch != epoch || g.store.state().is_connected {
                        debug!("restore superseded by a newer connection change");
                        return Ok(g.snapshot());
                    }
                    apply_session(&mut g, kind, address, session.chain_id);
                }
                info!(%kind, %address, chain_id = session.chain_id, "restored wallet session");
                self.reconcile().await?;
            }
            Ok(None) => {
                info!(%kind, "no live session for persisted wallet");
                self.forget_marker();
            }
            Err(e) => warn!(%kind, error = %e, "session restore failed"),
        }
        self.snapshot()
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn connect(&self, kind: WalletKind) -> Result<StateSnapshot, WalletError> {
        let transport = self.transport(kind)?;
        if !transport.is_available() {
            return Err(WalletError::AdapterUnavailable(format!(
                "{kind} transport is not present"
            )));
        }

        let current = self.state()?.store.state().provider_kind;
        match current {
            Some(active) if active == kind => return self.snapshot(),
            Some(active) => {
                info!(from = %active, to = %kind, "switching wallet transport");
                self.teardown(true).await?;
            }
            None => {}
        }

        let epoch = {
            let mut g = self.state()?;
            g.connecting = Some(kind);
            g.epoch
        };
        let result = transport.connect().await;

        let session = match result {
            Ok(session) => session,
            Err(e) => {
                let superseded = self.settle_failed_connect(kind, epoch)?;
                debug!(%kind, error = %e, "connect failed");
                if superseded {
                    return Err(WalletError::Superseded);
                }
                return Err(e.into());
            }
        };
        let Some(address) = session.accounts.first().copied() else {
            self.settle_failed_connect(kind, epoch)?;
            return Err(WalletError::ConnectionRejected(
                "wallet returned no accounts".to_owned(),
            ));
        };

        let superseded_by = {
            let mut g = self.state()?;
            if g.connecting == Some(kind) {
                g.connecting = None;
            }
            if g.epoch != epoch || g.store.state().is_connected {
                Some(g.store.state().provider_kind)
            } else {
                apply_session(&mut g, kind, address, session.chain_id);
                None
            }
        };
        if let Some(active) = superseded_by {
            // a reset already cancelled the prompt; only a different live
            // transport leaves this session orphaned
            if active.is_some() && active != Some(kind) {
                if let Err(e) = transport.disconnect().await {
                    warn!(%kind, error = %e, "failed to drop superseded session");
                }
            }
            return Err(WalletError::Superseded);
        }

        info!(%kind, %address, chain_id = session.chain_id, "wallet connected");
        if let Err(e) = self
            .storage
            .set(&self.config.storage_key, kind.connector_id())
        {
            warn!(error = %e, "failed to persist wallet marker");
        }
        self.reconcile().await?;
        self.snapshot()
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn switch_network(&self, chain_id: u64) -> Result<StateSnapshot, WalletError> {
        if !self.config.supports_chain(chain_id) {
            return Err(WalletError::UnsupportedChain(chain_id));
        }
        let (handle, current_chain) = {
            let g = self.state()?;
            let s = g.store.state();
            match (s.is_connected, s.provider) {
                (true, Some(handle)) => (handle, s.chain_id),
                _ => return Err(WalletError::NotConnected),
            }
        };
        if current_chain == Some(chain_id) {
            return self.snapshot();
        }

        let transport = self.transport(handle.kind)?;
        if !transport.approved_networks().allows(chain_id) {
            return Err(WalletError::UnsupportedChain(chain_id));
        }

        let params = serde_json::json!([{ "chainId": format!("0x{chain_id:x}") }]);
        match transport.request(SWITCH_CHAIN_METHOD, params).await {
            Ok(_) => {}
            Err(e)
                if matches!(
                    e.rpc_code(),
                    Some(UNRECOGNIZED_CHAIN_CODE) | Some(UNSUPPORTED_CHAINS_CODE)
                ) =>
            {
                return Err(WalletError::UnsupportedChain(chain_id));
            }
            Err(e) => return Err(e.into()),
        }

        {
            let mut g = self.state()?;
            if g.store.state().provider != Some(handle) {
                return Err(WalletError::Superseded);
            }
            g.store.set_chain_id(Some(chain_id));
        }
        self.reconcile().await?;
        self.snapshot()
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn disconnect(&self) -> Result<StateSnapshot, WalletError> {
        self.teardown(true).await?;
        self.snapshot()
    }

    pub async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        let kind = self
            .state()?
            .store
            .state()
            .provider_kind
            .ok_or(WalletError::NotConnected)?;
        let transport = self.transport(kind)?;
        Ok(transport.request(method, params).await?)
    }

    /// Drains both transports and applies their events in order. Returns the
    /// number of events seen. A transport that fails to poll or drain is
    /// skipped for this round.
    pub async fn process_events(&self) -> Result<usize, WalletError> {
        let mut processed = 0;
        if let Some(t) = &self.injected {
            if let Err(e) = t.poll().await {
                warn!(error = %e, "injected transport poll failed");
            }
            match t.drain_events() {
                Ok(events) => {
                    for event in events {
                        self.handle_event(WalletKind::Injected, event).await?;
                        processed += 1;
                    }
                }
                Err(e) => warn!(error = %e, "injected transport drain failed"),
            }
        }
        if let Some(t) = &self.relay {
            if let Err(e) = t.poll().await {
                warn!(error = %e, "relay transport poll failed");
            }
            match t.drain_events() {
                Ok(events) => {
                    for event in events {
                        self.handle_event(WalletKind::Relay, event).await?;
                        processed += 1;
                    }
                }
                Err(e) => warn!(error = %e, "relay transport drain failed"),
            }
        }
        Ok(processed)
    }

    async fn handle_event(
        &self,
        source: WalletKind,
        event: TransportEvent,
    ) -> Result<(), WalletError> {
        debug!(%source, sequence = event.sequence, kind = ?event.kind, "transport event");
        let active = self.state()?.store.state().provider_kind == Some(source);
        match event.kind {
            TransportEventKind::DisplayUri(uri) => {
                let mut g = self.state()?;
                if g.connecting == Some(source) {
                    g.pairing_uri = Some(uri);
                } else {
                    debug!(%source, "dropping pairing uri with no connect in flight");
                }
            }
            TransportEventKind::SessionDisconnected if active => {
                info!(%source, "session disconnected by wallet");
                return self.teardown(false).await;
            }
            TransportEventKind::AccountsChanged(accounts) if active => match accounts.first() {
                Some(address) => self.state()?.store.set_address(Some(*address)),
                None if source == WalletKind::Injected => {
                    info!("injected wallet revoked all accounts");
                    return self.teardown(false).await;
                }
                None => debug!(%source, "ignoring empty account list"),
            },
            TransportEventKind::ChainChanged(0) if active => {
                debug!(%source, "ignoring chain change to chain id 0");
            }
            TransportEventKind::ChainChanged(chain_id) if active => {
                self.state()?.store.set_chain_id(Some(chain_id));
            }
            _ => debug!(%source, "ignoring event from inactive transport"),
        }
        self.reconcile().await
    }

    /// Resets local state, then tears the remote session down best-effort.
    async fn teardown(&self, notify_transport: bool) -> Result<(), WalletError> {
        let (kind, in_flight) = {
            let mut g = self.state()?;
            let kind = g.store.state().provider_kind;
            g.epoch = g.epoch.saturating_add(1);
            g.store.reset();
            g.pairing_uri = None;
            g.clear_derived(self.config.default_network());
            (kind, g.connecting.take())
        };
        if let Some(pending) = in_flight.filter(|k| Some(*k) != kind) {
            debug!(kind = %pending, "cancelling connect in flight");
            if let Ok(transport) = self.transport(pending) {
                if let Err(e) = transport.disconnect().await {
                    warn!(kind = %pending, error = %e, "failed to cancel pending connect");
                }
            }
        }
        if let Some(kind) = kind {
            if notify_transport {
                if let Ok(transport) = self.transport(kind) {
                    if let Err(e) = transport.disconnect().await {
                        warn!(
                            %kind,
                            error = %e,
                            "transport disconnect failed, local state reset anyway"
                        );
                    }
                }
            }
            info!(%kind, "wallet disconnected");
        }
        self.forget_marker();
        self.reconcile().await
    }

    /// Clears the in-flight markers of a connect that produced no session.
    /// Returns whether a reset happened while it was pending.
    fn settle_failed_connect(&self, kind: WalletKind, epoch: u64) -> Result<bool, WalletError> {
        let superseded = {
            let mut g = self.state()?;
            if g.connecting == Some(kind) {
                g.connecting = None;
                g.pairing_uri = None;
            }
            g.epoch != epoch
        };
        self.publish()?;
        Ok(superseded)
    }

    fn forget_marker(&self) {
        if let Err(e) = self.storage.remove(&self.config.storage_key) {
            warn!(error = %e, "failed to clear wallet marker");
        }
    }

    async fn reconcile(&self) -> Result<(), WalletError> {
        let changes: Vec<FieldChange> = {
            let mut q = self
                .pending
                .lock()
                .map_err(|e| WalletError::Internal(format!("change queue poisoned: {e}")))?;
            q.drain(..).collect()
        };
        {
            let g = self.state()?;
            let s = g.store.state();
            if !s.invariant_holds() {
                error!(state = ?s, "connection state invariant violated");
                debug_assert!(s.invariant_holds(), "connection state invariant violated");
            }
        }
        if !changes.is_empty() {
            self.sync().await?;
        }
        self.publish()
    }

    async fn sync(&self) -> Result<(), WalletError> {
        let plan = {
            let mut g = self.state()?;
            let s = g.store.state().clone();
            match (s.is_connected, s.address, s.chain_id, s.provider) {
                (true, Some(address), Some(chain_id), Some(handle)) => {
                    g.sync_seq = g.sync_seq.saturating_add(1);
                    g.selected_network = Some(self.config.caip_network(chain_id));
                    let fetch_profile = !g.profile_requested;
                    g.profile_requested = true;
                    SyncPlan {
                        seq: g.sync_seq,
                        handle,
                        address,
                        chain_id,
                        fetch_profile,
                    }
                }
                _ => {
                    g.clear_derived(self.config.default_network());
                    return Ok(());
                }
            }
        };

        let caip = caip_address(plan.chain_id, plan.address);
        let explorer_url = networks::address_explorer_url(plan.chain_id, &plan.address.to_string());

        let (profile, balance) = tokio::join!(
            async {
                if plan.fetch_profile {
                    Some(self.resolve_profile(plan.handle.kind, plan.address).await)
                } else {
                    None
                }
            },
            self.resolve_balance(plan.chain_id, plan.address),
        );

        let mut g = self.state()?;
        let (same_account, same_chain) = {
            let s = g.store.state();
            (
                s.provider == Some(plan.handle) && s.address == Some(plan.address),
                s.chain_id == Some(plan.chain_id),
            )
        };
        // one profile lookup per connection; keep it even if this sync lost the race
        if let (true, Some(resolved)) = (same_account, profile) {
            g.resolved_profile = Some((plan.address, resolved.unwrap_or_default()));
            if g.sync_seq != plan.seq && g.derived_address == Some(plan.address) {
                let late = g.profile_for(plan.address);
                g.derived.profile_name = late.name;
                g.derived.profile_image = late.avatar;
            }
        }
        if g.sync_seq != plan.seq || !same_account || !same_chain {
            debug!(seq = plan.seq, "discarding stale sync result");
            return Ok(());
        }

        let profile = g.profile_for(plan.address);
        let (balance, balance_symbol) = match balance {
            Some((amount, symbol)) => (Some(amount), Some(symbol)),
            None => (None, None),
        };
        g.derived = DerivedAccountState {
            caip_address: Some(caip),
            profile_name: profile.name,
            profile_image: profile.avatar,
            balance,
            balance_symbol,
            explorer_url,
        };
        g.derived_address = Some(plan.address);
        Ok(())
    }

    async fn resolve_profile(&self, kind: WalletKind, address: Address) -> Option<Profile> {
        let result = match self.transport(kind) {
            Ok(ActiveTransport::Injected(t)) => self.profile.lookup(t, address).await,
            Ok(ActiveTransport::Relay(t)) => self.profile.lookup(t, address).await,
            Err(e) => Err(PortError::NotFound(e.to_string())),
        };
        match result {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(%address, error = %e, "profile resolution failed");
                None
            }
        }
    }

    async fn resolve_balance(&self, chain_id: u64, address: Address) -> Option<(String, String)> {
        let Some(network) = networks::lookup(chain_id) else {
            debug!(chain_id, "no rpc endpoint for chain, skipping balance");
            return None;
        };
        match self.balance.balance(network, address).await {
            Ok(wei) => Some((format_ether(wei), network.currency_symbol.to_owned())),
            Err(e) => {
                warn!(%address, chain_id, error = %e, "balance resolution failed");
                None
            }
        }
    }

    fn publish(&self) -> Result<(), WalletError> {
        let snapshot = {
            let mut g = self.state()?;
            let snapshot = g.snapshot();
            if g.last_published.as_ref() == Some(&snapshot) {
                return Ok(());
            }
            g.last_published = Some(snapshot.clone());
            snapshot
        };
        let listeners: Vec<StateListener> = self
            .listeners
            .lock()
            .map_err(|e| WalletError::Internal(format!("listener lock poisoned: {e}")))?
            .entries
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
        Ok(())
    }
}

fn apply_session(g: &mut EngineState, kind: WalletKind, address: Address, chain_id: u64) {
    g.epoch = g.epoch.saturating_add(1);
    let handle = ProviderHandle {
        kind,
        epoch: g.epoch,
    };
    g.profile_requested = false;
    g.resolved_profile = None;
    g.pairing_uri = None;
    g.store.set_address(Some(address));
    g.store.set_chain_id(Some(chain_id));
    g.store.set_provider_kind(Some(kind));
    g.store.set_provider(Some(handle));
    g.store.set_is_connected(true);
}
