#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, U256};

use walletsync::{WalletPorts, WalletSync};
use walletsync_adapters::{Eip1193Adapter, MemoryStorage, RelayAdapter};
use walletsync_core::{
    AuthError, AuthPort, BalancePort, NetworkDescriptor, PortError, Profile, ProfilePort,
    TransportPort, WalletSyncConfig,
};

pub fn config() -> WalletSyncConfig {
    WalletSyncConfig {
        project_id: "test-project".to_owned(),
        supported_chains: vec![1, 137],
        default_chain: Some(1),
        ..WalletSyncConfig::default()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedBalance(pub u128);

impl BalancePort for FixedBalance {
    async fn balance(
        &self,
        _network: &NetworkDescriptor,
        _address: Address,
    ) -> Result<U256, PortError> {
        Ok(U256::from(self.0))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoProfile;

impl ProfilePort for NoProfile {
    async fn lookup<T: TransportPort>(
        &self,
        _transport: &T,
        _address: Address,
    ) -> Result<Profile, PortError> {
        Ok(Profile::default())
    }
}

/// Auth callbacks with a fixed nonce and verdict; records what it verified.
#[derive(Debug, Clone)]
pub struct ScriptedAuth {
    pub nonce: Option<String>,
    pub accept: bool,
    pub verified: Arc<Mutex<Vec<(String, String)>>>,
}

impl ScriptedAuth {
    pub fn accepting() -> Self {
        Self {
            nonce: Some("n0nce".to_owned()),
            accept: true,
            verified: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl AuthPort for ScriptedAuth {
    fn create_message(&self, nonce: &str, address: Address, chain_id: u64) -> String {
        format!("sign in {address} on {chain_id} with {nonce}")
    }

    async fn fetch_nonce(&self) -> Result<String, AuthError> {
        self.nonce
            .clone()
            .ok_or_else(|| AuthError::NonceUnavailable("nonce service down".to_owned()))
    }

    async fn verify(&self, message: &str, signature: &str) -> Result<bool, AuthError> {
        self.verified
            .lock()
            .expect("verified lock")
            .push((message.to_owned(), signature.to_owned()));
        Ok(self.accept)
    }
}

pub type TestPorts<A> =
    WalletPorts<Eip1193Adapter, RelayAdapter, FixedBalance, NoProfile, MemoryStorage, A>;

pub type TestWallet<A = walletsync_core::NoAuth> =
    WalletSync<Eip1193Adapter, RelayAdapter, FixedBalance, NoProfile, MemoryStorage, A>;

pub fn ports(storage: MemoryStorage) -> TestPorts<walletsync_core::NoAuth> {
    WalletPorts {
        injected: Some(Eip1193Adapter::deterministic()),
        relay: Some(RelayAdapter::new("test-project")),
        balance: FixedBalance(2_000_000_000_000_000_000),
        profile: NoProfile,
        storage,
        auth: walletsync_core::NoAuth,
    }
}

pub async fn wallet() -> TestWallet {
    WalletSync::new(config(), ports(MemoryStorage::new()))
        .await
        .expect("wallet")
}

pub async fn wallet_with_auth(auth: ScriptedAuth) -> TestWallet<ScriptedAuth> {
    WalletSync::new(config(), ports(MemoryStorage::new()).with_auth(auth))
        .await
        .expect("wallet")
}
