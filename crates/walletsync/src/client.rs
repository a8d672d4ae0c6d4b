//! The object a host application constructs and holds.
//!
//! [`WalletSync`] owns one [`SyncEngine`]; independent instances share
//! nothing, so a host can run several side by side.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use walletsync_core::{
    ApprovedNetworks, AuthPort, BalancePort, CaipNetwork, ConfigError, Connector, NoAuth,
    ProfilePort, StateSnapshot, StateSubscription, StoragePort, SyncEngine, Token,
    TransportPort, WalletError, WalletKind, WalletSyncConfig,
};

/// Everything the host plugs in.
#[derive(Debug, Clone)]
pub struct WalletPorts<I, R, B, P, S, A = NoAuth> {
    pub injected: Option<I>,
    pub relay: Option<R>,
    pub balance: B,
    pub profile: P,
    pub storage: S,
    pub auth: A,
}

impl<I, R, B, P, S> WalletPorts<I, R, B, P, S, NoAuth> {
    /// Attaches sign-in callbacks.
    pub fn with_auth<A: AuthPort>(self, auth: A) -> WalletPorts<I, R, B, P, S, A> {
        WalletPorts {
            injected: self.injected,
            relay: self.relay,
            balance: self.balance,
            profile: self.profile,
            storage: self.storage,
            auth,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("startup reconciliation failed: {0}")]
    Restore(#[from] WalletError),
}

pub struct WalletSync<I, R, B, P, S, A = NoAuth>
where
    I: TransportPort,
    R: TransportPort,
    B: BalancePort,
    P: ProfilePort,
    S: StoragePort,
    A: AuthPort,
{
    pub(crate) engine: SyncEngine<I, R, B, P, S>,
    pub(crate) auth: A,
}

impl<I, R, B, P, S, A> WalletSync<I, R, B, P, S, A>
where
    I: TransportPort,
    R: TransportPort,
    B: BalancePort,
    P: ProfilePort,
    S: StoragePort,
    A: AuthPort,
{
    /// Validates `config` and silently restores the last-used wallet if its
    /// session is still live.
    pub async fn new(
        config: WalletSyncConfig,
        ports: WalletPorts<I, R, B, P, S, A>,
    ) -> Result<Self, InitError> {
        let engine = SyncEngine::new(
            config,
            ports.injected,
            ports.relay,
            ports.balance,
            ports.profile,
            ports.storage,
        )?;
        let state = engine.restore().await?;
        info!(
            connected = state.is_connected,
            kind = ?state.provider_kind,
            "wallet sync ready"
        );
        Ok(Self {
            engine,
            auth: ports.auth,
        })
    }

    pub fn engine(&self) -> &SyncEngine<I, R, B, P, S> {
        &self.engine
    }

    pub async fn connect(&self, kind: WalletKind) -> Result<StateSnapshot, WalletError> {
        self.engine.connect(kind).await
    }

    pub async fn switch_network(&self, chain_id: u64) -> Result<StateSnapshot, WalletError> {
        self.engine.switch_network(chain_id).await
    }

    pub async fn disconnect(&self) -> Result<StateSnapshot, WalletError> {
        self.engine.disconnect().await
    }

    pub fn get_state(&self) -> Result<StateSnapshot, WalletError> {
        self.engine.snapshot()
    }

    /// `callback` runs after every change that alters the snapshot, on the
    /// task that caused it.
    pub fn subscribe_state<F>(&self, callback: F) -> Result<StateSubscription, WalletError>
    where
        F: Fn(&StateSnapshot) + Send + Sync + 'static,
    {
        self.engine.subscribe_state(callback)
    }

    pub fn unsubscribe_state(&self, subscription: StateSubscription) -> Result<bool, WalletError> {
        self.engine.unsubscribe_state(subscription)
    }

    pub async fn process_events(&self) -> Result<usize, WalletError> {
        self.engine.process_events().await
    }

    /// Raw RPC through the active wallet.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        self.engine.request(method, params).await
    }

    pub fn requested_networks(&self) -> Vec<CaipNetwork> {
        self.engine.requested_networks()
    }

    pub fn connectors(&self) -> Vec<Connector> {
        self.engine.connectors()
    }

    pub fn tokens(&self) -> BTreeMap<String, Token> {
        self.engine.tokens()
    }

    pub fn approved_networks(&self) -> Result<ApprovedNetworks, WalletError> {
        self.engine.approved_networks()
    }

    /// Applies transport events every `interval` until an engine error.
    #[cfg(not(target_arch = "wasm32"))]
    pub async fn watch(&self, interval: std::time::Duration) -> Result<(), WalletError> {
        loop {
            let processed = self.process_events().await?;
            if processed > 0 {
                tracing::debug!(processed, "applied transport events");
            }
            tokio::time::sleep(interval).await;
        }
    }
}
