use alloy::primitives::{Address, U256};
use serde_json::Value;
use thiserror::Error;

use crate::domain::{ApprovedNetworks, Profile, TransportEvent, WalletSession};
use crate::error::AuthError;
use crate::networks::NetworkDescriptor;

/// EIP-1193 "user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;
/// EIP-1193 / EIP-3326 "unrecognized chain id".
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;
/// WalletConnect "unsupported chains".
pub const UNSUPPORTED_CHAINS_CODE: i64 = 5100;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PortError {
    #[error("port not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("policy error: {0}")]
    Policy(String),
    #[error("rejected: {0}")]
    Rejected(String),
}

impl PortError {
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            PortError::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// A wallet transport: injected EIP-1193 provider or relay session.
#[allow(async_fn_in_trait)]
pub trait TransportPort {
    /// Whether the underlying transport exists in this runtime.
    fn is_available(&self) -> bool;

    /// Prompts the wallet for account access.
    async fn connect(&self) -> Result<WalletSession, PortError>;

    /// Returns an already-authorized session without prompting.
    async fn restore_session(&self) -> Result<Option<WalletSession>, PortError>;

    /// Must succeed when there is nothing to tear down.
    async fn disconnect(&self) -> Result<(), PortError>;

    async fn request(&self, method: &str, params: Value) -> Result<Value, PortError>;

    /// Refreshes the event queue for transports that cannot push events.
    async fn poll(&self) -> Result<(), PortError> {
        Ok(())
    }

    fn drain_events(&self) -> Result<Vec<TransportEvent>, PortError>;

    fn approved_networks(&self) -> ApprovedNetworks {
        ApprovedNetworks::all()
    }
}

#[allow(async_fn_in_trait)]
pub trait BalancePort {
    async fn balance(&self, network: &NetworkDescriptor, address: Address)
        -> Result<U256, PortError>;
}

/// Reverse lookup of a display name and avatar through the connected wallet.
#[allow(async_fn_in_trait)]
pub trait ProfilePort {
    async fn lookup<T: TransportPort>(
        &self,
        transport: &T,
        address: Address,
    ) -> Result<Profile, PortError>;
}

pub trait StoragePort {
    fn get(&self, key: &str) -> Result<Option<String>, PortError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PortError>;
    fn remove(&self, key: &str) -> Result<(), PortError>;
}

/// Sign-in callbacks supplied by the host application.
#[allow(async_fn_in_trait)]
pub trait AuthPort {
    fn create_message(&self, nonce: &str, address: Address, chain_id: u64) -> String;
    async fn fetch_nonce(&self) -> Result<String, AuthError>;
    async fn verify(&self, message: &str, signature: &str) -> Result<bool, AuthError>;
}

/// Placeholder for hosts that do not authenticate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl AuthPort for NoAuth {
    fn create_message(&self, _nonce: &str, _address: Address, _chain_id: u64) -> String {
        String::new()
    }

    async fn fetch_nonce(&self) -> Result<String, AuthError> {
        Err(AuthError::NonceUnavailable("no auth configured".to_owned()))
    }

    async fn verify(&self, _message: &str, _signature: &str) -> Result<bool, AuthError> {
        Ok(false)
    }
}
