use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::{caip_network_id, CaipNetwork, Token};
use crate::error::ConfigError;
use crate::networks;

pub const DEFAULT_STORAGE_KEY: &str = "WALLET_ID";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WalletSyncConfig {
    pub project_id: String,
    /// Empty means no restriction on switch targets.
    pub supported_chains: Vec<u64>,
    pub default_chain: Option<u64>,
    pub chain_images: HashMap<u64, String>,
    pub tokens: HashMap<u64, Token>,
    pub storage_key: String,
}

impl Default for WalletSyncConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            supported_chains: Vec::new(),
            default_chain: None,
            chain_images: HashMap::new(),
            tokens: HashMap::new(),
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
        }
    }
}

impl WalletSyncConfig {
    pub fn validate(&self, has_injected: bool, has_relay: bool) -> Result<(), ConfigError> {
        if self.project_id.trim().is_empty() {
            return Err(ConfigError::MissingProjectId);
        }
        if !has_injected && !has_relay {
            return Err(ConfigError::NoTransport);
        }
        if let Some(chain) = self.default_chain {
            if !self.supports_chain(chain) {
                return Err(ConfigError::DefaultChainNotSupported(chain));
            }
        }
        Ok(())
    }

    pub fn supports_chain(&self, chain_id: u64) -> bool {
        self.supported_chains.is_empty() || self.supported_chains.contains(&chain_id)
    }

    pub fn caip_network(&self, chain_id: u64) -> CaipNetwork {
        let preset = networks::lookup(chain_id);
        CaipNetwork {
            id: caip_network_id(chain_id),
            name: preset.map(|n| n.name.to_owned()),
            image_id: preset.map(|n| n.image_id.to_owned()),
            image_url: self.chain_images.get(&chain_id).cloned(),
        }
    }

    pub fn requested_networks(&self) -> Vec<CaipNetwork> {
        self.supported_chains
            .iter()
            .map(|chain| self.caip_network(*chain))
            .collect()
    }

    pub fn default_network(&self) -> Option<CaipNetwork> {
        self.default_chain.map(|chain| self.caip_network(chain))
    }

    /// Token overrides keyed by CAIP network id.
    pub fn caip_tokens(&self) -> BTreeMap<String, Token> {
        self.tokens
            .iter()
            .map(|(chain, token)| (caip_network_id(*chain), token.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WalletSyncConfig {
        WalletSyncConfig {
            project_id: "project".to_owned(),
            supported_chains: vec![1, 137],
            ..WalletSyncConfig::default()
        }
    }

    #[test]
    fn validation_requires_project_and_transport() {
        let mut cfg = config();
        assert_eq!(cfg.validate(true, false), Ok(()));
        assert_eq!(cfg.validate(false, false), Err(ConfigError::NoTransport));
        cfg.default_chain = Some(10);
        assert_eq!(
            cfg.validate(true, true),
            Err(ConfigError::DefaultChainNotSupported(10))
        );
        cfg.project_id = " ".to_owned();
        assert_eq!(cfg.validate(true, true), Err(ConfigError::MissingProjectId));
    }

    #[test]
    fn requested_networks_apply_image_overrides() {
        let mut cfg = config();
        cfg.chain_images
            .insert(137, "https://img.example/polygon.png".to_owned());
        let networks = cfg.requested_networks();
        assert_eq!(networks.len(), 2);
        assert_eq!(networks[0].id, "eip155:1");
        assert_eq!(networks[0].name.as_deref(), Some("Ethereum"));
        assert_eq!(
            networks[1].image_url.as_deref(),
            Some("https://img.example/polygon.png")
        );
    }

    #[test]
    fn deserializes_from_camel_case_json() {
        let cfg: WalletSyncConfig = serde_json::from_value(serde_json::json!({
            "projectId": "abc",
            "supportedChains": [1, 10],
            "defaultChain": 10,
            "tokens": { "1": { "address": "0x0000000000000000000000000000000000000001" } }
        }))
        .expect("config json");
        assert_eq!(cfg.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(cfg.default_chain, Some(10));
        assert!(cfg.caip_tokens().contains_key("eip155:1"));
    }
}
