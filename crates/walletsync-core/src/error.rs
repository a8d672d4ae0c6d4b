use thiserror::Error;

use crate::ports::{PortError, USER_REJECTED_CODE};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("connection rejected: {0}")]
    ConnectionRejected(String),
    #[error("adapter unavailable: {0}")]
    AdapterUnavailable(String),
    #[error("transport error (code {code:?}): {message}")]
    Transport { code: Option<i64>, message: String },
    #[error("unsupported chain: {0}")]
    UnsupportedChain(u64),
    #[error("no wallet connected")]
    NotConnected,
    #[error("connection superseded by a newer state change")]
    Superseded,
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<PortError> for WalletError {
    fn from(e: PortError) -> Self {
        match e {
            PortError::Rejected(reason) => WalletError::ConnectionRejected(reason),
            PortError::Rpc { code, message } if code == USER_REJECTED_CODE => {
                WalletError::ConnectionRejected(message)
            }
            PortError::Rpc { code, message } => WalletError::Transport {
                code: Some(code),
                message,
            },
            PortError::Policy(reason) | PortError::NotFound(reason) => {
                WalletError::AdapterUnavailable(reason)
            }
            PortError::NotImplemented(what) => WalletError::AdapterUnavailable(what.to_owned()),
            PortError::Transport(message) | PortError::Validation(message) => {
                WalletError::Transport {
                    code: None,
                    message,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("nonce unavailable: {0}")]
    NonceUnavailable(String),
    #[error("signature verification failed")]
    VerificationFailed,
    #[error("no wallet connected")]
    NotConnected,
    #[error("signing failed: {0}")]
    Signing(String),
    #[error("authentication backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("projectId is undefined")]
    MissingProjectId,
    #[error("at least one transport (injected or relay) is required")]
    NoTransport,
    #[error("default chain {0} is not in supported chains")]
    DefaultChainNotSupported(u64),
}
