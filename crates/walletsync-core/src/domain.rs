use std::fmt;
use std::str::FromStr;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// CAIP-2 namespace for EVM chains.
pub const NAMESPACE: &str = "eip155";

/// Which transport a connection goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalletKind {
    Injected,
    Relay,
}

impl WalletKind {
    /// Identifier persisted in storage and used as the connector id.
    pub fn connector_id(self) -> &'static str {
        match self {
            WalletKind::Injected => "injected",
            WalletKind::Relay => "walletConnect",
        }
    }
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.connector_id())
    }
}

impl FromStr for WalletKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "injected" => Ok(WalletKind::Injected),
            "walletConnect" => Ok(WalletKind::Relay),
            other => Err(format!("unknown wallet kind: {other}")),
        }
    }
}

/// Opaque reference to the adapter backing the current connection.
///
/// `epoch` identifies the connection it was issued for; a new connect or any
/// reset moves the engine to a new epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderHandle {
    pub kind: WalletKind,
    pub epoch: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionState {
    pub address: Option<Address>,
    pub chain_id: Option<u64>,
    pub provider_kind: Option<WalletKind>,
    pub provider: Option<ProviderHandle>,
    pub is_connected: bool,
}

impl ConnectionState {
    /// Kind, handle and the connected flag agree, and a connection always
    /// carries an address and a chain.
    pub fn invariant_holds(&self) -> bool {
        let kind_matches_handle = self.provider_kind.is_none() == self.provider.is_none();
        let handle_matches_flag = self.provider.is_some() == self.is_connected;
        let complete = !self.is_connected || (self.address.is_some() && self.chain_id.is_some());
        let same_kind = match (self.provider_kind, self.provider) {
            (Some(kind), Some(handle)) => kind == handle.kind,
            _ => true,
        };
        kind_matches_handle && handle_matches_flag && complete && same_kind
    }
}

/// Secondary state rebuilt from [`ConnectionState`] on every sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAccountState {
    pub caip_address: Option<String>,
    pub profile_name: Option<String>,
    pub profile_image: Option<String>,
    pub balance: Option<String>,
    pub balance_symbol: Option<String>,
    pub explorer_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaipNetwork {
    pub id: String,
    pub name: Option<String>,
    pub image_id: Option<String>,
    pub image_url: Option<String>,
}

impl CaipNetwork {
    pub fn chain_id(&self) -> Option<u64> {
        caip_network_id_to_number(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectorType {
    WalletConnect,
    Injected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub id: String,
    pub name: String,
    pub image_id: String,
    pub explorer_id: Option<String>,
    #[serde(rename = "type")]
    pub connector_type: ConnectorType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub address: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Result of a successful connect or session restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSession {
    pub accounts: Vec<Address>,
    pub chain_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportEventKind {
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
    SessionDisconnected,
    DisplayUri(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportEvent {
    pub sequence: u64,
    pub kind: TransportEventKind,
}

/// Chains a wallet session accepts switching to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedNetworks {
    pub approved_caip_network_ids: Option<Vec<String>>,
    pub supports_all_networks: bool,
}

impl ApprovedNetworks {
    pub fn all() -> Self {
        Self {
            approved_caip_network_ids: None,
            supports_all_networks: true,
        }
    }

    pub fn allows(&self, chain_id: u64) -> bool {
        if self.supports_all_networks {
            return true;
        }
        let id = caip_network_id(chain_id);
        self.approved_caip_network_ids
            .as_ref()
            .map(|ids| ids.iter().any(|x| *x == id))
            .unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub name: Option<String>,
    pub avatar: Option<String>,
}

/// Immutable view handed to the UI layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub address: Option<Address>,
    pub chain_id: Option<u64>,
    pub is_connected: bool,
    pub provider_kind: Option<WalletKind>,
    pub caip_address: Option<String>,
    pub profile_name: Option<String>,
    pub profile_image: Option<String>,
    pub balance: Option<String>,
    pub balance_symbol: Option<String>,
    pub explorer_url: Option<String>,
    pub selected_network_id: Option<u64>,
    pub pairing_uri: Option<String>,
}

pub fn caip_network_id(chain_id: u64) -> String {
    format!("{NAMESPACE}:{chain_id}")
}

pub fn caip_address(chain_id: u64, address: Address) -> String {
    format!("{NAMESPACE}:{chain_id}:{address}")
}

pub fn caip_network_id_to_number(id: &str) -> Option<u64> {
    let (namespace, reference) = id.split_once(':')?;
    if namespace != NAMESPACE {
        return None;
    }
    reference.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caip_ids_round_trip_through_chain_number() {
        assert_eq!(caip_network_id(137), "eip155:137");
        assert_eq!(caip_network_id_to_number("eip155:137"), Some(137));
        assert_eq!(caip_network_id_to_number("solana:1"), None);
        assert_eq!(caip_network_id_to_number("eip155"), None);
    }

    #[test]
    fn empty_state_satisfies_invariant() {
        assert!(ConnectionState::default().invariant_holds());
        let half = ConnectionState {
            provider_kind: Some(WalletKind::Injected),
            ..ConnectionState::default()
        };
        assert!(!half.invariant_holds());
    }

    #[test]
    fn approved_networks_respect_session_chains() {
        let approved = ApprovedNetworks {
            approved_caip_network_ids: Some(vec!["eip155:1".to_owned()]),
            supports_all_networks: false,
        };
        assert!(approved.allows(1));
        assert!(!approved.allows(137));
        assert!(ApprovedNetworks::all().allows(137));
    }
}
