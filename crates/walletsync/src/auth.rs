//! Sign-in with the connected wallet.
//!
//! The message format and verification live with the host's [`AuthPort`];
//! this module only sequences nonce, message, signature and verification.

use alloy::primitives::Address;
use tracing::{info, warn};

use walletsync_core::{
    AuthError, AuthPort, BalancePort, ProfilePort, StoragePort, TransportPort,
};

use crate::client::WalletSync;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub address: Address,
    pub chain_id: u64,
    pub message: String,
    pub signature: String,
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
    /// Fails with [`AuthError::NotConnected`] without a live connection.
    /// Connection state is never touched.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn authenticate(&self) -> Result<AuthSession, AuthError> {
        let (address, chain_id) = self.current_account()?;

        let nonce = self.auth.fetch_nonce().await?;
        let message = self.auth.create_message(&nonce, address, chain_id);
        let params = serde_json::json!([
            format!("0x{}", alloy::hex::encode(message.as_bytes())),
            address.to_string(),
        ]);
        let signature = self
            .engine
            .request("personal_sign", params)
            .await
            .map_err(|e| AuthError::Signing(e.to_string()))?;
        let signature = signature
            .as_str()
            .ok_or_else(|| AuthError::Signing(format!("non-string signature: {signature}")))?
            .to_owned();

        if self.current_account()? != (address, chain_id) {
            warn!(%address, "connection changed while signing");
            return Err(AuthError::Signing(
                "connection changed while signing".to_owned(),
            ));
        }
        if !self.auth.verify(&message, &signature).await? {
            return Err(AuthError::VerificationFailed);
        }

        info!(%address, chain_id, "wallet authenticated");
        Ok(AuthSession {
            address,
            chain_id,
            message,
            signature,
        })
    }

    fn current_account(&self) -> Result<(Address, u64), AuthError> {
        self.engine
            .connected_account()
            .map_err(|e| AuthError::Backend(e.to_string()))?
            .ok_or(AuthError::NotConnected)
    }
}
