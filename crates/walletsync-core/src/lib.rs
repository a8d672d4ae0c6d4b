pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod networks;
pub mod ports;
pub mod store;

pub use config::{WalletSyncConfig, DEFAULT_STORAGE_KEY};
pub use domain::{
    caip_address, caip_network_id, caip_network_id_to_number, ApprovedNetworks, CaipNetwork,
    ConnectionState, Connector, ConnectorType, DerivedAccountState, Profile, ProviderHandle,
    StateSnapshot, Token, TransportEvent, TransportEventKind, WalletKind, WalletSession,
};
pub use engine::{StateSubscription, SyncEngine, SWITCH_CHAIN_METHOD};
pub use error::{AuthError, ConfigError, WalletError};
pub use networks::NetworkDescriptor;
pub use ports::{
    AuthPort, BalancePort, NoAuth, PortError, ProfilePort, StoragePort, TransportPort,
    UNRECOGNIZED_CHAIN_CODE, UNSUPPORTED_CHAINS_CODE, USER_REJECTED_CODE,
};
pub use store::{ConnectionStore, FieldChange, StoreField, Subscription};
