pub mod auth;
pub mod client;
pub mod defaults;

pub use auth::AuthSession;
pub use client::{InitError, WalletPorts, WalletSync};
pub use defaults::{default_ports, DefaultStorage, DefaultWalletSync};

pub use walletsync_adapters;
pub use walletsync_core;
