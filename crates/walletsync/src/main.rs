//! walletsync-demo: drives the bundled adapters through a connect, a chain
//! switch, a relay pairing and a sign-in.

use std::time::Duration;

use alloy::primitives::Address;
use eyre::WrapErr;

use walletsync::walletsync_adapters::{AdapterConfig, FileStorage, SessionApproval};
use walletsync::walletsync_core::{AuthError, AuthPort, WalletKind, WalletSyncConfig};
use walletsync::{default_ports, WalletSync};

/// Accepts any signature; a real host verifies server-side.
struct DemoAuth;

impl AuthPort for DemoAuth {
    fn create_message(&self, nonce: &str, address: Address, chain_id: u64) -> String {
        format!(
            "walletsync-demo wants you to sign in with {address}\nChain ID: {chain_id}\nNonce: {nonce}"
        )
    }

    async fn fetch_nonce(&self) -> Result<String, AuthError> {
        Ok("demo-nonce".to_owned())
    }

    async fn verify(&self, _message: &str, signature: &str) -> Result<bool, AuthError> {
        Ok(signature.starts_with("0x"))
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting walletsync demo");

    let mut adapter_config = AdapterConfig::from_env();
    if adapter_config.project_id.trim().is_empty() {
        adapter_config.project_id = "walletsync-demo".to_owned();
    }
    let config = WalletSyncConfig {
        project_id: adapter_config.project_id.clone(),
        supported_chains: vec![1, 10, 137, 8453],
        default_chain: Some(1),
        ..WalletSyncConfig::default()
    };
    let storage = FileStorage::new(std::env::temp_dir().join("walletsync-demo.json"));
    let ports = default_ports(&adapter_config, storage).with_auth(DemoAuth);

    let wallet = WalletSync::new(config, ports)
        .await
        .wrap_err("failed to start wallet sync")?;
    wallet
        .subscribe_state(|state| {
            tracing::info!(
                connected = state.is_connected,
                address = ?state.address,
                chain_id = ?state.chain_id,
                balance = ?state.balance,
                pairing_uri = ?state.pairing_uri,
                "state changed"
            );
        })
        .wrap_err("subscribe")?;

    wallet
        .connect(WalletKind::Injected)
        .await
        .wrap_err("injected connect")?;
    wallet.switch_network(137).await.wrap_err("switch to polygon")?;

    let session = wallet.authenticate().await.wrap_err("sign-in")?;
    tracing::info!(address = %session.address, signature = %session.signature, "signed in");

    // answer the pairing from the wallet side once the uri is published
    if let Some(relay) = wallet.engine().relay().cloned() {
        let wallet_side = relay.clone();
        tokio::spawn(async move {
            loop {
                match wallet_side.pending_topic() {
                    Ok(Some(_)) => break,
                    Ok(None) => tokio::time::sleep(Duration::from_millis(50)).await,
                    Err(e) => {
                        tracing::warn!(error = %e, "relay unavailable");
                        return;
                    }
                }
            }
            let approval = SessionApproval {
                accounts: vec![Address::with_last_byte(0xbe)],
                chain_id: 10,
                chains: vec![1, 10],
                allow_add_chain: false,
            };
            if let Err(e) = wallet_side.approve_pairing(approval) {
                tracing::warn!(error = %e, "pairing approval failed");
            }
        });

        let (connected, _) = tokio::join!(wallet.connect(WalletKind::Relay), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            wallet.process_events().await
        });
        connected.wrap_err("relay connect")?;
        tracing::info!(approved = ?wallet.approved_networks()?, "relay session approved");

        if let Err(e) = wallet.switch_network(137).await {
            tracing::info!(error = %e, "relay session refused polygon as expected");
        }
    }

    wallet.disconnect().await.wrap_err("disconnect")?;
    Ok(())
}
