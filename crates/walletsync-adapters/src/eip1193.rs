use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use alloy::primitives::{address, keccak256, Address};
use serde_json::Value;
use tracing::debug;

use walletsync_core::{
    networks, PortError, TransportEvent, TransportEventKind, TransportPort, WalletSession,
    SWITCH_CHAIN_METHOD, UNRECOGNIZED_CHAIN_CODE, USER_REJECTED_CODE,
};

use crate::config::AdapterConfig;
use crate::rpc;

/// Account held by the in-memory wallet.
pub const DETERMINISTIC_ACCOUNT: Address = address!("1000000000000000000000000000000000000001");

/// EIP-1193 "the requested method is not authorized".
pub const UNAUTHORIZED_CODE: i64 = 4100;
/// EIP-1193 "the provider does not support the requested method".
pub const UNSUPPORTED_METHOD_CODE: i64 = 4200;

#[derive(Debug, Clone)]
pub struct Eip1193Adapter {
    mode: ProviderMode,
    state: Arc<Mutex<ProviderState>>,
    #[cfg(target_arch = "wasm32")]
    hooks: Arc<Mutex<BrowserHooks>>,
}

#[derive(Debug, Clone)]
enum ProviderMode {
    Disabled(String),
    Deterministic,
    #[cfg(not(target_arch = "wasm32"))]
    Proxy(ProxyRuntime),
    #[cfg(target_arch = "wasm32")]
    Browser,
}

#[derive(Debug, Clone)]
#[cfg(not(target_arch = "wasm32"))]
struct ProxyRuntime {
    base_url: String,
    client: reqwest::Client,
}

#[cfg(not(target_arch = "wasm32"))]
impl ProxyRuntime {
    async fn call(&self, method: &str, params: Value) -> Result<Value, PortError> {
        rpc::call(&self.client, &self.base_url, method, params).await
    }
}

#[derive(Debug, Clone)]
struct ProviderState {
    /// Wallet accounts; for remote runtimes the last observed value.
    accounts: Vec<Address>,
    chain_id: u64,
    authorized: bool,
    observed: bool,
    reject_requests: bool,
    known_chains: BTreeSet<u64>,
    event_seq: u64,
    events: Vec<TransportEvent>,
}

impl Default for ProviderState {
    fn default() -> Self {
        Self {
            accounts: vec![DETERMINISTIC_ACCOUNT],
            chain_id: 1,
            authorized: false,
            observed: false,
            reject_requests: false,
            known_chains: networks::NETWORKS.iter().map(|n| n.chain_id).collect(),
            event_seq: 0,
            events: Vec::new(),
        }
    }
}

impl ProviderState {
    fn record(&mut self, kind: TransportEventKind) {
        self.event_seq = self.event_seq.saturating_add(1);
        self.events.push(TransportEvent {
            sequence: self.event_seq,
            kind,
        });
    }

    /// Records change events once a baseline has been observed.
    fn observe(&mut self, accounts: Option<Vec<Address>>, chain_id: Option<u64>) {
        let baseline = self.observed;
        if let Some(accounts) = accounts {
            if baseline && self.accounts != accounts {
                self.record(TransportEventKind::AccountsChanged(accounts.clone()));
            }
            self.accounts = accounts;
        }
        if let Some(chain_id) = chain_id {
            if baseline && self.chain_id != chain_id {
                self.record(TransportEventKind::ChainChanged(chain_id));
            }
            self.chain_id = chain_id;
        }
        self.observed = true;
    }
}

#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
struct BrowserHooks {
    accounts_changed: Option<wasm_bindgen::closure::Closure<dyn FnMut(wasm_bindgen::JsValue)>>,
    chain_changed: Option<wasm_bindgen::closure::Closure<dyn FnMut(wasm_bindgen::JsValue)>>,
    disconnect: Option<wasm_bindgen::closure::Closure<dyn FnMut(wasm_bindgen::JsValue)>>,
}

impl Default for Eip1193Adapter {
    fn default() -> Self {
        Self::with_config(AdapterConfig::from_env())
    }
}

impl Eip1193Adapter {
    pub fn with_config(config: AdapterConfig) -> Self {
        #[cfg(target_arch = "wasm32")]
        let mode = if browser_provider_available() {
            ProviderMode::Browser
        } else if config.strict_runtime_required() {
            ProviderMode::Disabled(
                "EIP-1193 browser provider not found in production runtime profile".to_owned(),
            )
        } else {
            ProviderMode::Deterministic
        };

        #[cfg(not(target_arch = "wasm32"))]
        let mode = if let Some(ref base_url) = config.eip1193_proxy_url {
            match rpc::build_client(config.rpc_timeout_ms) {
                Ok(client) => ProviderMode::Proxy(ProxyRuntime {
                    base_url: base_url.clone(),
                    client,
                }),
                Err(e) => {
                    if config.strict_runtime_required() {
                        ProviderMode::Disabled(format!(
                            "failed to initialize EIP-1193 proxy client in production profile: {e}"
                        ))
                    } else {
                        ProviderMode::Deterministic
                    }
                }
            }
        } else if config.strict_runtime_required() {
            ProviderMode::Disabled(
                "EIP-1193 proxy URL not configured in production runtime profile".to_owned(),
            )
        } else {
            ProviderMode::Deterministic
        };

        Self::with_mode(mode)
    }

    /// In-memory wallet holding one account on chain 1.
    pub fn deterministic() -> Self {
        Self::with_mode(ProviderMode::Deterministic)
    }

    fn with_mode(mode: ProviderMode) -> Self {
        Self {
            mode,
            state: Arc::new(Mutex::new(ProviderState::default())),
            #[cfg(target_arch = "wasm32")]
            hooks: Arc::new(Mutex::new(BrowserHooks::default())),
        }
    }

    fn check_mode(&self) -> Result<(), PortError> {
        if let ProviderMode::Disabled(reason) = &self.mode {
            return Err(PortError::Policy(reason.clone()));
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, ProviderState>, PortError> {
        self.state
            .lock()
            .map_err(|e| PortError::Transport(format!("provider lock poisoned: {e}")))
    }

    pub fn debug_inject_accounts_changed(&self, accounts: Vec<Address>) -> Result<(), PortError> {
        let mut g = self.lock()?;
        g.accounts = accounts.clone();
        g.record(TransportEventKind::AccountsChanged(accounts));
        Ok(())
    }

    pub fn debug_inject_chain_changed(&self, chain_id: u64) -> Result<(), PortError> {
        let mut g = self.lock()?;
        g.chain_id = chain_id;
        g.known_chains.insert(chain_id);
        g.record(TransportEventKind::ChainChanged(chain_id));
        Ok(())
    }

    pub fn debug_inject_disconnect(&self) -> Result<(), PortError> {
        let mut g = self.lock()?;
        g.authorized = false;
        g.record(TransportEventKind::SessionDisconnected);
        Ok(())
    }

    /// Grants account access as if the user had approved it in an earlier visit.
    pub fn debug_authorize(&self) -> Result<(), PortError> {
        self.lock()?.authorized = true;
        Ok(())
    }

    /// Makes the deterministic wallet decline every prompt.
    pub fn debug_reject_requests(&self, reject: bool) -> Result<(), PortError> {
        self.lock()?.reject_requests = reject;
        Ok(())
    }

    async fn dispatch(&self, method: &str, params: Value) -> Result<Value, PortError> {
        self.check_mode()?;
        debug!(method, "eip1193 request");

        #[cfg(not(target_arch = "wasm32"))]
        if let ProviderMode::Proxy(proxy) = &self.mode {
            return proxy.call(method, params).await;
        }

        #[cfg(target_arch = "wasm32")]
        if matches!(self.mode, ProviderMode::Browser) {
            return self.wasm_request(method, params).await;
        }

        self.deterministic_request(method, &params)
    }

    fn deterministic_request(&self, method: &str, params: &Value) -> Result<Value, PortError> {
        let mut g = self.lock()?;
        match method {
            "eth_requestAccounts" => {
                if g.reject_requests {
                    return Err(user_rejected());
                }
                g.authorized = true;
                Ok(accounts_json(&g.accounts))
            }
            "eth_accounts" => Ok(if g.authorized {
                accounts_json(&g.accounts)
            } else {
                serde_json::json!([])
            }),
            "eth_chainId" => Ok(serde_json::json!(format!("0x{:x}", g.chain_id))),
            SWITCH_CHAIN_METHOD => {
                let requested = params
                    .get(0)
                    .and_then(|p| p.get("chainId"))
                    .ok_or_else(|| PortError::Validation("chainId param missing".to_owned()))?;
                let chain_id = rpc::json_chain_id_to_u64(requested)?;
                if g.reject_requests {
                    return Err(user_rejected());
                }
                if !g.known_chains.contains(&chain_id) {
                    return Err(PortError::Rpc {
                        code: UNRECOGNIZED_CHAIN_CODE,
                        message: format!("Unrecognized chain ID \"0x{chain_id:x}\""),
                    });
                }
                if g.chain_id != chain_id {
                    g.chain_id = chain_id;
                    g.record(TransportEventKind::ChainChanged(chain_id));
                }
                Ok(Value::Null)
            }
            "personal_sign" => {
                let message = params
                    .get(0)
                    .and_then(Value::as_str)
                    .ok_or_else(|| PortError::Validation("message param missing".to_owned()))?;
                let signer: Address = params
                    .get(1)
                    .and_then(Value::as_str)
                    .ok_or_else(|| PortError::Validation("signer param missing".to_owned()))?
                    .parse()
                    .map_err(|e| PortError::Validation(format!("invalid signer: {e}")))?;
                if g.reject_requests {
                    return Err(user_rejected());
                }
                if !g.authorized || !g.accounts.contains(&signer) {
                    return Err(PortError::Rpc {
                        code: UNAUTHORIZED_CODE,
                        message: "signer is not an authorized account".to_owned(),
                    });
                }
                Ok(serde_json::json!(deterministic_signature(
                    message.as_bytes(),
                    signer
                )))
            }
            // no contracts behind the in-memory wallet
            "eth_call" => Ok(serde_json::json!("0x")),
            other => Err(PortError::Rpc {
                code: UNSUPPORTED_METHOD_CODE,
                message: format!("unsupported method: {other}"),
            }),
        }
    }

    async fn read_session(&self, accounts_method: &str) -> Result<WalletSession, PortError> {
        let accounts = rpc::parse_accounts(
            &self.dispatch(accounts_method, serde_json::json!([])).await?,
            accounts_method,
        )?;
        let chain_id =
            rpc::json_chain_id_to_u64(&self.dispatch("eth_chainId", serde_json::json!([])).await?)?;
        if !matches!(self.mode, ProviderMode::Deterministic) {
            self.lock()?.observe(Some(accounts.clone()), Some(chain_id));
        }
        Ok(WalletSession { accounts, chain_id })
    }

    #[cfg(target_arch = "wasm32")]
    async fn wasm_request(&self, method: &str, params: Value) -> Result<Value, PortError> {
        use wasm_bindgen::JsCast;

        let provider = browser_provider()?;
        let request_fn = get_prop(&provider, "request")
            .ok()
            .and_then(|v| v.dyn_into::<js_sys::Function>().ok())
            .ok_or(PortError::NotImplemented(
                "window.ethereum.request is unavailable",
            ))?;

        let request = serde_json::json!({
            "method": method,
            "params": params,
        });
        let request_js = serde_wasm_bindgen::to_value(&request)
            .map_err(|e| PortError::Transport(format!("failed to encode wasm request: {e}")))?;
        let promise_js = request_fn.call1(&provider, &request_js).map_err(|e| {
            PortError::Transport(format!("provider request dispatch failed: {e:?}"))
        })?;
        let promise = promise_js.dyn_into::<js_sys::Promise>().map_err(|_| {
            PortError::Transport("provider request did not return Promise".to_owned())
        })?;
        let result_js = wasm_bindgen_futures::JsFuture::from(promise)
            .await
            .map_err(js_rpc_error)?;
        serde_wasm_bindgen::from_value(result_js)
            .map_err(|e| PortError::Transport(format!("failed to decode wasm response: {e}")))
    }

    #[cfg(target_arch = "wasm32")]
    fn register_browser_hooks(&self) -> Result<(), PortError> {
        use wasm_bindgen::{closure::Closure, JsCast, JsValue};

        let provider = browser_provider()?;
        let on_fn = get_prop(&provider, "on")
            .ok()
            .and_then(|v| v.dyn_into::<js_sys::Function>().ok())
            .or_else(|| {
                get_prop(&provider, "addListener")
                    .ok()
                    .and_then(|v| v.dyn_into::<js_sys::Function>().ok())
            })
            .ok_or(PortError::NotImplemented(
                "provider does not expose on/addListener",
            ))?;

        let mut hooks = self
            .hooks
            .lock()
            .map_err(|e| PortError::Transport(format!("provider hooks lock poisoned: {e}")))?;
        if hooks.accounts_changed.is_some() {
            return Ok(());
        }

        let state_for_accounts = Arc::clone(&self.state);
        let accounts_cb = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            let mut accounts = Vec::new();
            if js_sys::Array::is_array(&value) {
                for item in js_sys::Array::from(&value).iter() {
                    if let Some(addr) = item.as_string().and_then(|s| s.parse::<Address>().ok()) {
                        accounts.push(addr);
                    }
                }
            }
            if let Ok(mut g) = state_for_accounts.lock() {
                g.accounts = accounts.clone();
                g.record(TransportEventKind::AccountsChanged(accounts));
            }
        });

        let state_for_chain = Arc::clone(&self.state);
        let chain_cb = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            if let Ok(chain_id) = js_chain_id_to_u64(value) {
                if let Ok(mut g) = state_for_chain.lock() {
                    g.chain_id = chain_id;
                    g.record(TransportEventKind::ChainChanged(chain_id));
                }
            }
        });

        let state_for_disconnect = Arc::clone(&self.state);
        let disconnect_cb = Closure::<dyn FnMut(JsValue)>::new(move |_: JsValue| {
            if let Ok(mut g) = state_for_disconnect.lock() {
                g.record(TransportEventKind::SessionDisconnected);
            }
        });

        for (event, cb) in [
            ("accountsChanged", &accounts_cb),
            ("chainChanged", &chain_cb),
            ("disconnect", &disconnect_cb),
        ] {
            on_fn
                .call2(&provider, &JsValue::from_str(event), cb.as_ref().unchecked_ref())
                .map_err(|e| PortError::Transport(format!("register {event} failed: {e:?}")))?;
        }

        hooks.accounts_changed = Some(accounts_cb);
        hooks.chain_changed = Some(chain_cb);
        hooks.disconnect = Some(disconnect_cb);
        Ok(())
    }
}

impl TransportPort for Eip1193Adapter {
    fn is_available(&self) -> bool {
        !matches!(self.mode, ProviderMode::Disabled(_))
    }

    async fn connect(&self) -> Result<WalletSession, PortError> {
        self.check_mode()?;
        // Listeners are attached on first use; registering them at startup
        // can leave eth_requestAccounts pending in some injected wallets.
        #[cfg(target_arch = "wasm32")]
        if matches!(self.mode, ProviderMode::Browser) {
            self.register_browser_hooks()?;
        }
        self.read_session("eth_requestAccounts").await
    }

    async fn restore_session(&self) -> Result<Option<WalletSession>, PortError> {
        self.check_mode()?;
        let session = self.read_session("eth_accounts").await?;
        if session.accounts.is_empty() {
            return Ok(None);
        }
        #[cfg(target_arch = "wasm32")]
        if matches!(self.mode, ProviderMode::Browser) {
            self.register_browser_hooks()?;
        }
        Ok(Some(session))
    }

    async fn disconnect(&self) -> Result<(), PortError> {
        // Injected wallets keep their grant; only the in-memory one forgets it.
        if matches!(self.mode, ProviderMode::Deterministic) {
            self.lock()?.authorized = false;
        }
        Ok(())
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, PortError> {
        self.dispatch(method, params).await
    }

    async fn poll(&self) -> Result<(), PortError> {
        #[cfg(not(target_arch = "wasm32"))]
        if let ProviderMode::Proxy(proxy) = &self.mode {
            if !self.lock()?.observed {
                return Ok(());
            }
            let accounts = rpc::parse_accounts(
                &proxy.call("eth_accounts", serde_json::json!([])).await?,
                "eth_accounts",
            )?;
            let chain_id = rpc::json_chain_id_to_u64(
                &proxy.call("eth_chainId", serde_json::json!([])).await?,
            )?;
            self.lock()?.observe(Some(accounts), Some(chain_id));
        }
        Ok(())
    }

    fn drain_events(&self) -> Result<Vec<TransportEvent>, PortError> {
        if let ProviderMode::Disabled(_) = &self.mode {
            return Ok(Vec::new());
        }
        Ok(std::mem::take(&mut self.lock()?.events))
    }
}

fn user_rejected() -> PortError {
    PortError::Rpc {
        code: USER_REJECTED_CODE,
        message: "User rejected the request.".to_owned(),
    }
}

fn accounts_json(accounts: &[Address]) -> Value {
    serde_json::json!(accounts.iter().map(|a| a.to_string()).collect::<Vec<_>>())
}

/// Stable 65-byte stand-in signature for the in-memory wallets.
pub(crate) fn deterministic_signature(message: &[u8], signer: Address) -> String {
    let mut seed = Vec::with_capacity(message.len() + 20);
    seed.extend_from_slice(signer.as_slice());
    seed.extend_from_slice(message);
    let hash = keccak256(seed);
    let mut sig = Vec::with_capacity(65);
    sig.extend_from_slice(hash.as_slice());
    sig.extend_from_slice(hash.as_slice());
    sig.push(27);
    format!("0x{}", alloy::hex::encode(sig))
}

#[cfg(target_arch = "wasm32")]
fn browser_provider_available() -> bool {
    browser_provider().is_ok()
}

#[cfg(target_arch = "wasm32")]
fn browser_provider() -> Result<wasm_bindgen::JsValue, PortError> {
    let window =
        web_sys::window().ok_or_else(|| PortError::Transport("missing window".to_owned()))?;
    let provider = get_prop(&window.into(), "ethereum")?;
    if provider.is_null() || provider.is_undefined() {
        return Err(PortError::NotFound("window.ethereum missing".to_owned()));
    }
    Ok(provider)
}

#[cfg(target_arch = "wasm32")]
fn get_prop(target: &wasm_bindgen::JsValue, key: &str) -> Result<wasm_bindgen::JsValue, PortError> {
    js_sys::Reflect::get(target, &wasm_bindgen::JsValue::from_str(key))
        .map_err(|e| PortError::Transport(format!("read provider property {key} failed: {e:?}")))
}

#[cfg(target_arch = "wasm32")]
fn js_rpc_error(err: wasm_bindgen::JsValue) -> PortError {
    let code = get_prop(&err, "code").ok().and_then(|c| c.as_f64());
    let message = get_prop(&err, "message")
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    match code {
        Some(code) => PortError::Rpc {
            code: code as i64,
            message,
        },
        None => PortError::Transport(format!("provider request rejected: {message}")),
    }
}

#[cfg(target_arch = "wasm32")]
fn js_chain_id_to_u64(value: wasm_bindgen::JsValue) -> Result<u64, PortError> {
    if let Some(s) = value.as_string() {
        return rpc::parse_chain_id_str(&s);
    }
    if let Some(num) = value.as_f64() {
        return Ok(num as u64);
    }
    Err(PortError::Validation("invalid JS chain id".to_owned()))
}
