mod common;

use walletsync_adapters::eip1193::DETERMINISTIC_ACCOUNT;
use walletsync_core::{AuthError, WalletKind};

use common::{wallet, wallet_with_auth, ScriptedAuth};

#[tokio::test]
async fn sign_in_requires_a_connection() {
    let wallet = wallet_with_auth(ScriptedAuth::accepting()).await;
    assert_eq!(
        wallet.authenticate().await.expect_err("not connected"),
        AuthError::NotConnected
    );
}

#[tokio::test]
async fn sign_in_signs_the_host_message_with_the_connected_account() {
    let auth = ScriptedAuth::accepting();
    let verified = auth.verified.clone();
    let wallet = wallet_with_auth(auth).await;
    wallet.connect(WalletKind::Injected).await.expect("connect");
    wallet.switch_network(137).await.expect("switch");

    let session = wallet.authenticate().await.expect("authenticate");
    assert_eq!(session.address, DETERMINISTIC_ACCOUNT);
    assert_eq!(session.chain_id, 137);
    assert_eq!(
        session.message,
        format!("sign in {DETERMINISTIC_ACCOUNT} on 137 with n0nce")
    );
    assert!(session.signature.starts_with("0x"));
    assert_eq!(session.signature.len(), 132);

    let verified = verified.lock().expect("verified");
    assert_eq!(
        verified.as_slice(),
        [(session.message.clone(), session.signature.clone())]
    );

    // connection state is untouched
    let state = wallet.get_state().expect("state");
    assert!(state.is_connected);
    assert_eq!(state.chain_id, Some(137));
}

#[tokio::test]
async fn missing_nonce_is_reported_to_the_caller() {
    let wallet = wallet_with_auth(ScriptedAuth {
        nonce: None,
        ..ScriptedAuth::accepting()
    })
    .await;
    wallet.connect(WalletKind::Injected).await.expect("connect");
    assert!(matches!(
        wallet.authenticate().await,
        Err(AuthError::NonceUnavailable(_))
    ));

    let plain = common::wallet().await;
    plain.connect(WalletKind::Injected).await.expect("connect");
    assert!(matches!(
        plain.authenticate().await,
        Err(AuthError::NonceUnavailable(_))
    ));
}

#[tokio::test]
async fn rejected_verification_fails_sign_in() {
    let wallet = wallet_with_auth(ScriptedAuth {
        accept: false,
        ..ScriptedAuth::accepting()
    })
    .await;
    wallet.connect(WalletKind::Injected).await.expect("connect");
    assert_eq!(
        wallet.authenticate().await.expect_err("verification"),
        AuthError::VerificationFailed
    );
    assert!(wallet.get_state().expect("state").is_connected);
}

#[tokio::test]
async fn wallet_refusing_to_sign_is_a_signing_error() {
    let wallet = wallet_with_auth(ScriptedAuth::accepting()).await;
    wallet.connect(WalletKind::Injected).await.expect("connect");
    wallet
        .engine()
        .injected()
        .expect("injected")
        .debug_reject_requests(true)
        .expect("reject");

    assert!(matches!(
        wallet.authenticate().await,
        Err(AuthError::Signing(_))
    ));
    assert!(wallet.get_state().expect("state").is_connected);
}
