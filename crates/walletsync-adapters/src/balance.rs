use std::collections::HashMap;

use alloy::primitives::{Address, U256};

use walletsync_core::{BalancePort, NetworkDescriptor, PortError};

use crate::config::AdapterConfig;
use crate::rpc;

/// Native-currency balance over plain JSON-RPC (`eth_getBalance`).
#[derive(Debug, Clone)]
pub struct JsonRpcBalanceAdapter {
    client: reqwest::Client,
    endpoints: HashMap<u64, String>,
}

impl Default for JsonRpcBalanceAdapter {
    fn default() -> Self {
        Self::with_config(&AdapterConfig::default())
    }
}

impl JsonRpcBalanceAdapter {
    pub fn with_config(config: &AdapterConfig) -> Self {
        let client = rpc::build_client(config.rpc_timeout_ms).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default http client");
            reqwest::Client::new()
        });
        Self {
            client,
            endpoints: HashMap::new(),
        }
    }

    /// Routes one chain to a different RPC endpoint than the registry's.
    pub fn with_endpoint(mut self, chain_id: u64, url: impl Into<String>) -> Self {
        self.endpoints.insert(chain_id, url.into());
        self
    }

    fn endpoint<'a>(&'a self, network: &'a NetworkDescriptor) -> &'a str {
        self.endpoints
            .get(&network.chain_id)
            .map(String::as_str)
            .unwrap_or(network.rpc_url)
    }
}

impl BalancePort for JsonRpcBalanceAdapter {
    async fn balance(
        &self,
        network: &NetworkDescriptor,
        address: Address,
    ) -> Result<U256, PortError> {
        let result = rpc::call(
            &self.client,
            self.endpoint(network),
            "eth_getBalance",
            serde_json::json!([address.to_string(), "latest"]),
        )
        .await?;
        rpc::parse_quantity(&result)
    }
}
