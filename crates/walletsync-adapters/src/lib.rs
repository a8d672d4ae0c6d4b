pub mod balance;
pub mod config;
pub mod eip1193;
pub mod profile;
pub mod relay;
mod rpc;
pub mod storage;

pub use balance::JsonRpcBalanceAdapter;
pub use config::{AdapterConfig, RuntimeProfile};
pub use eip1193::Eip1193Adapter;
pub use profile::EnsProfileAdapter;
pub use relay::{RelayAdapter, SessionApproval};
pub use storage::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;

#[cfg(target_arch = "wasm32")]
pub use storage::BrowserStorage;
