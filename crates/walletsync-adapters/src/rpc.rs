//! JSON-RPC plumbing shared by the proxy transport and the balance resolver.

use alloy::primitives::{Address, U256};
use serde_json::Value;

use walletsync_core::PortError;

pub(crate) fn build_client(timeout_ms: u64) -> Result<reqwest::Client, reqwest::Error> {
    let builder = reqwest::Client::builder();
    #[cfg(not(target_arch = "wasm32"))]
    let builder = builder.timeout(std::time::Duration::from_millis(timeout_ms));
    #[cfg(target_arch = "wasm32")]
    let _ = timeout_ms;
    builder.build()
}

pub(crate) async fn call(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: Value,
) -> Result<Value, PortError> {
    let payload = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params,
    });
    let response = client
        .post(url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| PortError::Transport(format!("{method} request failed: {e}")))?;
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .map_err(|e| PortError::Transport(format!("{method} json decode failed: {e}")))?;
    if let Some(err) = body.get("error") {
        return Err(rpc_error(err));
    }
    if !status.is_success() {
        return Err(PortError::Transport(format!("{method} status {status}: {body}")));
    }
    body.get("result")
        .cloned()
        .ok_or_else(|| PortError::Transport(format!("{method} response missing result")))
}

/// Keeps the numeric code so callers can tell rejections from other failures.
pub(crate) fn rpc_error(err: &Value) -> PortError {
    let message = err
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown rpc error")
        .to_owned();
    match err.get("code").and_then(Value::as_i64) {
        Some(code) => PortError::Rpc { code, message },
        None => PortError::Transport(format!("rpc error: {err}")),
    }
}

pub(crate) fn parse_accounts(value: &Value, method: &str) -> Result<Vec<Address>, PortError> {
    let arr = value
        .as_array()
        .ok_or_else(|| PortError::Transport(format!("{method}: array expected")))?;
    let mut accounts = Vec::with_capacity(arr.len());
    for item in arr {
        let raw = item
            .as_str()
            .ok_or_else(|| PortError::Transport(format!("{method}: string expected")))?;
        let parsed: Address = raw
            .parse()
            .map_err(|e| PortError::Validation(format!("invalid account address: {e}")))?;
        accounts.push(parsed);
    }
    Ok(accounts)
}

pub(crate) fn json_chain_id_to_u64(value: &Value) -> Result<u64, PortError> {
    if let Some(n) = value.as_u64() {
        return positive_chain_id(n);
    }
    let s = value
        .as_str()
        .ok_or_else(|| PortError::Validation("chain id must be string or number".to_owned()))?;
    parse_chain_id_str(s)
}

pub(crate) fn parse_chain_id_str(raw: &str) -> Result<u64, PortError> {
    let parsed = if raw.starts_with("0x") || raw.starts_with("0X") {
        u64::from_str_radix(&raw[2..], 16)
            .map_err(|e| PortError::Validation(format!("invalid hex chain id: {e}")))?
    } else {
        raw.parse()
            .map_err(|e| PortError::Validation(format!("invalid chain id: {e}")))?
    };
    positive_chain_id(parsed)
}

fn positive_chain_id(chain_id: u64) -> Result<u64, PortError> {
    if chain_id == 0 {
        return Err(PortError::Validation("chain id must be positive".to_owned()));
    }
    Ok(chain_id)
}

/// Hex quantity (`"0x1bc16d674ec80000"`) as returned by `eth_getBalance`.
pub(crate) fn parse_quantity(value: &Value) -> Result<U256, PortError> {
    let raw = value
        .as_str()
        .ok_or_else(|| PortError::Validation("quantity must be a hex string".to_owned()))?;
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| PortError::Validation(format!("quantity missing 0x prefix: {raw}")))?;
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| PortError::Validation(format!("invalid quantity {raw}: {e}")))
}
