//! Static chain metadata and connector presets.

use crate::domain::{Connector, ConnectorType, WalletKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkDescriptor {
    pub chain_id: u64,
    pub name: &'static str,
    pub image_id: &'static str,
    pub rpc_url: &'static str,
    pub explorer_url: Option<&'static str>,
    pub currency_symbol: &'static str,
}

const fn network(
    chain_id: u64,
    name: &'static str,
    image_id: &'static str,
    rpc_url: &'static str,
    explorer_url: &'static str,
    currency_symbol: &'static str,
) -> NetworkDescriptor {
    NetworkDescriptor {
        chain_id,
        name,
        image_id,
        rpc_url,
        explorer_url: Some(explorer_url),
        currency_symbol,
    }
}

#[rustfmt::skip]
pub const NETWORKS: &[NetworkDescriptor] = &[
    network(1, "Ethereum", "692ed6ba-e569-459a-556a-776476829e00", "https://cloudflare-eth.com", "https://etherscan.io", "ETH"),
    network(42161, "Arbitrum", "600a9a04-c1b9-42ca-6785-9b4b6ff85200", "https://arb1.arbitrum.io/rpc", "https://arbiscan.io", "ETH"),
    network(43114, "Avalanche", "30c46e53-e989-45fb-4549-be3bd4eb3b00", "https://api.avax.network/ext/bc/C/rpc", "https://snowtrace.io", "AVAX"),
    network(56, "Binance Smart Chain", "93564157-2e8e-4ce7-81df-b264dbee9b00", "https://rpc.ankr.com/bsc", "https://bscscan.com", "BNB"),
    network(250, "Fantom", "06b26297-fe0c-4733-5d6b-ffa5498aac00", "https://rpc.ftm.tools", "https://ftmscan.com", "FTM"),
    network(10, "Optimism", "ab9c186a-c52f-464b-2906-ca59d760a400", "https://mainnet.optimism.io", "https://optimistic.etherscan.io", "ETH"),
    network(137, "Polygon", "41d04d42-da3b-4453-8506-668cc0727900", "https://polygon-rpc.com", "https://polygonscan.com", "MATIC"),
    network(100, "Gnosis", "02b53f6a-e3d4-479e-1cb4-21178987d100", "https://rpc.gnosischain.com", "https://gnosisscan.io", "xDAI"),
    network(9001, "Evmos", "f926ff41-260d-4028-635e-91913fc28e00", "https://eth.bd.evmos.org:8545", "https://escan.live", "EVMOS"),
    network(324, "ZkSync", "b310f07f-4ef7-49f3-7073-2a0a39685800", "https://mainnet.era.zksync.io", "https://explorer.zksync.io", "ETH"),
    network(314, "Filecoin", "5a73b3dd-af74-424e-cae0-0de859ee9400", "https://api.node.glif.io/rpc/v1", "https://filfox.info/en", "FIL"),
    network(4689, "Iotx", "34e68754-e536-40da-c153-6ef2e7188a00", "https://babel-api.mainnet.iotex.io", "https://iotexscan.io", "IOTX"),
    network(1088, "Metis", "3897a66d-40b9-4833-162f-a2c90531c900", "https://andromeda.metis.io/?owner=1088", "https://andromeda-explorer.metis.io", "METIS"),
    network(1284, "Moonbeam", "161038da-44ae-4ec7-1208-0ea569454b00", "https://rpc.api.moonbeam.network", "https://moonscan.io", "GLMR"),
    network(1285, "Moonriver", "f1d73bb6-5450-4e18-38f7-fb6484264a00", "https://rpc.api.moonriver.moonbeam.network", "https://moonriver.moonscan.io", "MOVR"),
    network(7777777, "Zora", "845c60df-d429-4991-e687-91ae45791600", "https://rpc.zora.co", "https://explorer.zora.co", "ETH"),
    network(42220, "Celo", "ab781bbc-ccc6-418d-d32d-789b15da1f00", "https://forno.celo.org", "https://explorer.celo.org/mainnet", "CELO"),
    network(8453, "Base", "7289c336-3981-4081-c5f4-efc26ac64a00", "https://mainnet.base.org", "https://basescan.org", "ETH"),
    network(1313161554, "Aurora", "3ff73439-a619-4894-9262-4470c773a100", "https://mainnet.aurora.dev", "https://explorer.aurora.dev", "ETH"),
];

pub fn lookup(chain_id: u64) -> Option<&'static NetworkDescriptor> {
    NETWORKS.iter().find(|n| n.chain_id == chain_id)
}

/// `{explorer}/address/{address}` for chains with a known explorer.
pub fn address_explorer_url(chain_id: u64, address: &str) -> Option<String> {
    lookup(chain_id)
        .and_then(|n| n.explorer_url)
        .map(|base| format!("{base}/address/{address}"))
}

pub fn connector_preset(kind: WalletKind) -> Connector {
    match kind {
        WalletKind::Relay => Connector {
            id: kind.connector_id().to_owned(),
            name: "WalletConnect".to_owned(),
            image_id: "ef1a1fcf-7fe8-4d69-bd6d-fda1345b4400".to_owned(),
            explorer_id: None,
            connector_type: ConnectorType::WalletConnect,
        },
        WalletKind::Injected => Connector {
            id: kind.connector_id().to_owned(),
            name: "Browser Wallet".to_owned(),
            image_id: "07ba87ed-43aa-4adf-4540-9e6a2b9cae00".to_owned(),
            explorer_id: None,
            connector_type: ConnectorType::Injected,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_ids_are_unique() {
        for (i, a) in NETWORKS.iter().enumerate() {
            assert!(NETWORKS[i + 1..].iter().all(|b| b.chain_id != a.chain_id));
        }
    }

    #[test]
    fn explorer_url_uses_address_path() {
        assert_eq!(
            address_explorer_url(137, "0xabc").as_deref(),
            Some("https://polygonscan.com/address/0xabc")
        );
        assert_eq!(address_explorer_url(31337, "0xabc"), None);
    }
}
