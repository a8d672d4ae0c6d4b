//! In-memory relay transport with WalletConnect-style pairing.
//!
//! `connect` publishes a pairing URI as a `DisplayUri` event and then waits
//! for the wallet side to approve or reject it. The wallet side is driven
//! through the `approve_pairing`/`reject_pairing`/`wallet_*` methods, which a
//! bridge or a test harness calls on a clone of the adapter.

use std::sync::{Arc, Mutex, MutexGuard};

use alloy::primitives::{keccak256, Address};
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, info};

use walletsync_core::{
    caip_network_id, ApprovedNetworks, PortError, TransportEvent, TransportEventKind,
    TransportPort, WalletSession, SWITCH_CHAIN_METHOD, UNSUPPORTED_CHAINS_CODE,
};

use crate::config::AdapterConfig;
use crate::eip1193::{deterministic_signature, UNSUPPORTED_METHOD_CODE};
use crate::rpc;

/// What the wallet grants when it approves a pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionApproval {
    pub accounts: Vec<Address>,
    pub chain_id: u64,
    /// Chains in the session namespace; `chain_id` is always included.
    pub chains: Vec<u64>,
    /// Whether the wallet accepts `wallet_addEthereumChain`.
    pub allow_add_chain: bool,
}

#[derive(Debug, Clone)]
pub struct RelayAdapter {
    project_id: String,
    inner: Arc<Mutex<RelayState>>,
}

#[derive(Debug)]
struct PendingPairing {
    topic: String,
    responder: oneshot::Sender<Result<WalletSession, PortError>>,
}

#[derive(Debug, Clone)]
struct RelaySession {
    topic: String,
    accounts: Vec<Address>,
    chain_id: u64,
    chains: Vec<u64>,
    allow_add_chain: bool,
}

impl RelaySession {
    fn wallet_session(&self) -> WalletSession {
        WalletSession {
            accounts: self.accounts.clone(),
            chain_id: self.chain_id,
        }
    }
}

#[derive(Debug, Default)]
struct RelayState {
    pending: Option<PendingPairing>,
    session: Option<RelaySession>,
    pairings: u64,
    event_seq: u64,
    events: Vec<TransportEvent>,
}

impl RelayState {
    fn record(&mut self, kind: TransportEventKind) {
        self.event_seq = self.event_seq.saturating_add(1);
        self.events.push(TransportEvent {
            sequence: self.event_seq,
            kind,
        });
    }

    fn session_mut(&mut self) -> Result<&mut RelaySession, PortError> {
        self.session
            .as_mut()
            .ok_or_else(|| PortError::NotFound("no relay session".to_owned()))
    }
}

impl RelayAdapter {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            inner: Arc::new(Mutex::new(RelayState::default())),
        }
    }

    pub fn with_config(config: &AdapterConfig) -> Self {
        Self::new(config.project_id.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, RelayState>, PortError> {
        self.inner
            .lock()
            .map_err(|e| PortError::Transport(format!("relay lock poisoned: {e}")))
    }

    fn check_available(&self) -> Result<(), PortError> {
        if !self.is_available() {
            return Err(PortError::Policy(
                "relay project id is not configured".to_owned(),
            ));
        }
        Ok(())
    }

    /// Topic of the pairing currently awaiting the wallet.
    pub fn pending_topic(&self) -> Result<Option<String>, PortError> {
        Ok(self.lock()?.pending.as_ref().map(|p| p.topic.clone()))
    }

    pub fn session_topic(&self) -> Result<Option<String>, PortError> {
        Ok(self.lock()?.session.as_ref().map(|s| s.topic.clone()))
    }

    pub fn approve_pairing(&self, approval: SessionApproval) -> Result<(), PortError> {
        let mut g = self.lock()?;
        let pending = g
            .pending
            .take()
            .ok_or_else(|| PortError::NotFound("no pairing in progress".to_owned()))?;
        let mut chains = approval.chains;
        if !chains.contains(&approval.chain_id) {
            chains.push(approval.chain_id);
        }
        let session = RelaySession {
            topic: pending.topic,
            accounts: approval.accounts,
            chain_id: approval.chain_id,
            chains,
            allow_add_chain: approval.allow_add_chain,
        };
        let wallet_session = session.wallet_session();
        info!(topic = %session.topic, "relay pairing approved");
        g.session = Some(session);
        if pending.responder.send(Ok(wallet_session)).is_err() {
            g.session = None;
            return Err(PortError::NotFound(
                "pairing requester is gone".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn reject_pairing(&self) -> Result<(), PortError> {
        let pending = self
            .lock()?
            .pending
            .take()
            .ok_or_else(|| PortError::NotFound("no pairing in progress".to_owned()))?;
        info!(topic = %pending.topic, "relay pairing rejected");
        let _ = pending
            .responder
            .send(Err(PortError::Rejected("user rejected pairing".to_owned())));
        Ok(())
    }

    pub fn wallet_emit_accounts_changed(&self, accounts: Vec<Address>) -> Result<(), PortError> {
        let mut g = self.lock()?;
        g.session_mut()?.accounts = accounts.clone();
        g.record(TransportEventKind::AccountsChanged(accounts));
        Ok(())
    }

    pub fn wallet_emit_chain_changed(&self, chain_id: u64) -> Result<(), PortError> {
        let mut g = self.lock()?;
        let session = g.session_mut()?;
        if !session.chains.contains(&chain_id) {
            session.chains.push(chain_id);
        }
        session.chain_id = chain_id;
        g.record(TransportEventKind::ChainChanged(chain_id));
        Ok(())
    }

    pub fn wallet_end_session(&self) -> Result<(), PortError> {
        let mut g = self.lock()?;
        if g.session.take().is_some() {
            g.record(TransportEventKind::SessionDisconnected);
        }
        Ok(())
    }
}

impl TransportPort for RelayAdapter {
    fn is_available(&self) -> bool {
        !self.project_id.trim().is_empty()
    }

    async fn connect(&self) -> Result<WalletSession, PortError> {
        self.check_available()?;
        let rx = {
            let mut g = self.lock()?;
            if let Some(session) = &g.session {
                return Ok(session.wallet_session());
            }
            g.pairings = g.pairings.saturating_add(1);
            let topic = alloy::hex::encode(keccak256(format!(
                "{}:{}",
                self.project_id, g.pairings
            )));
            let sym_key = alloy::hex::encode(keccak256(topic.as_bytes()));
            let uri = format!("wc:{topic}@2?relay-protocol=irn&symKey={sym_key}");
            let (tx, rx) = oneshot::channel();
            let replaced = g.pending.replace(PendingPairing {
                topic,
                responder: tx,
            });
            if let Some(previous) = replaced {
                let _ = previous.responder.send(Err(PortError::Rejected(
                    "pairing replaced by a newer request".to_owned(),
                )));
            }
            g.record(TransportEventKind::DisplayUri(uri));
            rx
        };
        debug!("awaiting relay pairing approval");
        rx.await
            .map_err(|_| PortError::Rejected("pairing abandoned".to_owned()))?
    }

    async fn restore_session(&self) -> Result<Option<WalletSession>, PortError> {
        self.check_available()?;
        Ok(self.lock()?.session.as_ref().map(RelaySession::wallet_session))
    }

    async fn disconnect(&self) -> Result<(), PortError> {
        let mut g = self.lock()?;
        if let Some(session) = g.session.take() {
            info!(topic = %session.topic, "relay session closed");
        }
        if let Some(pending) = g.pending.take() {
            let _ = pending
                .responder
                .send(Err(PortError::Rejected("pairing cancelled".to_owned())));
        }
        Ok(())
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, PortError> {
        self.check_available()?;
        let mut g = self.lock()?;
        let session = g.session_mut()?;
        match method {
            "eth_accounts" => Ok(serde_json::json!(session
                .accounts
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>())),
            "eth_chainId" => Ok(serde_json::json!(format!("0x{:x}", session.chain_id))),
            SWITCH_CHAIN_METHOD => {
                let requested = params
                    .get(0)
                    .and_then(|p| p.get("chainId"))
                    .ok_or_else(|| PortError::Validation("chainId param missing".to_owned()))?;
                let chain_id = rpc::json_chain_id_to_u64(requested)?;
                if !session.chains.contains(&chain_id) {
                    if !session.allow_add_chain {
                        return Err(PortError::Rpc {
                            code: UNSUPPORTED_CHAINS_CODE,
                            message: format!("Unsupported chains: {}", caip_network_id(chain_id)),
                        });
                    }
                    session.chains.push(chain_id);
                }
                if session.chain_id != chain_id {
                    session.chain_id = chain_id;
                    g.record(TransportEventKind::ChainChanged(chain_id));
                }
                Ok(Value::Null)
            }
            "personal_sign" => {
                let message = params
                    .get(0)
                    .and_then(Value::as_str)
                    .ok_or_else(|| PortError::Validation("message param missing".to_owned()))?;
                let signer: Address = params
                    .get(1)
                    .and_then(Value::as_str)
                    .ok_or_else(|| PortError::Validation("signer param missing".to_owned()))?
                    .parse()
                    .map_err(|e| PortError::Validation(format!("invalid signer: {e}")))?;
                if !session.accounts.contains(&signer) {
                    return Err(PortError::Rejected(format!(
                        "{signer} is not part of the session"
                    )));
                }
                Ok(serde_json::json!(deterministic_signature(
                    message.as_bytes(),
                    signer
                )))
            }
            "eth_call" => Ok(serde_json::json!("0x")),
            other => Err(PortError::Rpc {
                code: UNSUPPORTED_METHOD_CODE,
                message: format!("unsupported method: {other}"),
            }),
        }
    }

    fn drain_events(&self) -> Result<Vec<TransportEvent>, PortError> {
        Ok(std::mem::take(&mut self.lock()?.events))
    }

    fn approved_networks(&self) -> ApprovedNetworks {
        let session = self.lock().ok().and_then(|g| g.session.clone());
        match session {
            Some(session) => ApprovedNetworks {
                approved_caip_network_ids: Some(
                    session.chains.iter().map(|c| caip_network_id(*c)).collect(),
                ),
                supports_all_networks: session.allow_add_chain,
            },
            None => ApprovedNetworks::all(),
        }
    }
}
