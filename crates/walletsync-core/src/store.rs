//! Setters notify only when the stored value actually changes.

use alloy::primitives::Address;

use crate::domain::{ConnectionState, ProviderHandle, WalletKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreField {
    Address,
    ChainId,
    Provider,
    ProviderKind,
    IsConnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldChange {
    Address(Option<Address>),
    ChainId(Option<u64>),
    Provider(Option<ProviderHandle>),
    ProviderKind(Option<WalletKind>),
    IsConnected(bool),
}

impl FieldChange {
    pub fn field(&self) -> StoreField {
        match self {
            FieldChange::Address(_) => StoreField::Address,
            FieldChange::ChainId(_) => StoreField::ChainId,
            FieldChange::Provider(_) => StoreField::Provider,
            FieldChange::ProviderKind(_) => StoreField::ProviderKind,
            FieldChange::IsConnected(_) => StoreField::IsConnected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Callback = Box<dyn FnMut(&FieldChange) + Send>;

struct Listener {
    id: u64,
    field: StoreField,
    callback: Callback,
}

#[derive(Default)]
pub struct ConnectionStore {
    state: ConnectionState,
    listeners: Vec<Listener>,
    next_id: u64,
}

impl std::fmt::Debug for ConnectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionStore")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn subscribe<F>(&mut self, field: StoreField, callback: F) -> Subscription
    where
        F: FnMut(&FieldChange) + Send + 'static,
    {
        self.next_id = self.next_id.saturating_add(1);
        let id = self.next_id;
        self.listeners.push(Listener {
            id,
            field,
            callback: Box::new(callback),
        });
        Subscription(id)
    }

    /// Returns false when the subscription was already removed.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != subscription.0);
        self.listeners.len() != before
    }

    pub fn set_address(&mut self, address: Option<Address>) {
        if self.state.address != address {
            self.state.address = address;
            self.notify(FieldChange::Address(address));
        }
    }

    pub fn set_chain_id(&mut self, chain_id: Option<u64>) {
        if self.state.chain_id != chain_id {
            self.state.chain_id = chain_id;
            self.notify(FieldChange::ChainId(chain_id));
        }
    }

    pub fn set_provider(&mut self, provider: Option<ProviderHandle>) {
        if self.state.provider != provider {
            self.state.provider = provider;
            self.notify(FieldChange::Provider(provider));
        }
    }

    pub fn set_provider_kind(&mut self, kind: Option<WalletKind>) {
        if self.state.provider_kind != kind {
            self.state.provider_kind = kind;
            self.notify(FieldChange::ProviderKind(kind));
        }
    }

    pub fn set_is_connected(&mut self, connected: bool) {
        if self.state.is_connected != connected {
            self.state.is_connected = connected;
            self.notify(FieldChange::IsConnected(connected));
        }
    }

    /// Clears every field before notifying, so callbacks never observe a
    /// half-reset state.
    pub fn reset(&mut self) {
        let previous = std::mem::take(&mut self.state);
        let mut changes = Vec::new();
        if previous.address.is_some() {
            changes.push(FieldChange::Address(None));
        }
        if previous.chain_id.is_some() {
            changes.push(FieldChange::ChainId(None));
        }
        if previous.provider_kind.is_some() {
            changes.push(FieldChange::ProviderKind(None));
        }
        if previous.provider.is_some() {
            changes.push(FieldChange::Provider(None));
        }
        if previous.is_connected {
            changes.push(FieldChange::IsConnected(false));
        }
        for change in changes {
            self.notify(change);
        }
    }

    fn notify(&mut self, change: FieldChange) {
        let field = change.field();
        for listener in self.listeners.iter_mut().filter(|l| l.field == field) {
            (listener.callback)(&change);
        }
    }
}
