//! Adapter wiring for hosts that take the bundled ports.

use walletsync_adapters::{
    AdapterConfig, Eip1193Adapter, EnsProfileAdapter, JsonRpcBalanceAdapter, RelayAdapter,
};
use walletsync_core::NoAuth;

use crate::client::{WalletPorts, WalletSync};

#[cfg(not(target_arch = "wasm32"))]
pub type DefaultStorage = walletsync_adapters::FileStorage;

#[cfg(target_arch = "wasm32")]
pub type DefaultStorage = walletsync_adapters::BrowserStorage;

pub type DefaultWalletSync<S = DefaultStorage, A = NoAuth> =
    WalletSync<Eip1193Adapter, RelayAdapter, JsonRpcBalanceAdapter, EnsProfileAdapter, S, A>;

/// Both transports, the registry RPC balance resolver and ENS profiles.
/// The relay is left out when `config.project_id` is blank.
pub fn default_ports<S>(
    config: &AdapterConfig,
    storage: S,
) -> WalletPorts<Eip1193Adapter, RelayAdapter, JsonRpcBalanceAdapter, EnsProfileAdapter, S> {
    WalletPorts {
        injected: Some(Eip1193Adapter::with_config(config.clone())),
        relay: (!config.project_id.trim().is_empty()).then(|| RelayAdapter::with_config(config)),
        balance: JsonRpcBalanceAdapter::with_config(config),
        profile: EnsProfileAdapter::default(),
        storage,
        auth: NoAuth,
    }
}

#[cfg(test)]
mod tests {
    use walletsync_adapters::MemoryStorage;
    use walletsync_core::TransportPort;

    use super::*;

    #[test]
    fn blank_project_id_leaves_out_the_relay() {
        let ports = default_ports(&AdapterConfig::default(), MemoryStorage::new());
        assert!(ports.relay.is_none());
        assert!(ports.injected.as_ref().is_some_and(|t| t.is_available()));

        let config = AdapterConfig {
            project_id: "demo".to_owned(),
            ..AdapterConfig::default()
        };
        let ports = default_ports(&config, MemoryStorage::new());
        assert!(ports.relay.as_ref().is_some_and(|t| t.is_available()));
    }
}
