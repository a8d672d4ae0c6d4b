//! ENS reverse resolution through the connected wallet's own RPC.

use alloy::dyn_abi::{DynSolType, DynSolValue};
use alloy::primitives::{address, keccak256, Address, B256};
use tracing::debug;

use walletsync_core::{PortError, Profile, ProfilePort, TransportPort};

/// ENS registry, same address on every chain that deploys it.
pub const ENS_REGISTRY: Address = address!("00000000000C2E074eC69A0dFb2997BA6C7d2e1e");

#[derive(Debug, Clone)]
pub struct EnsProfileAdapter {
    registry: Address,
}

impl Default for EnsProfileAdapter {
    fn default() -> Self {
        Self {
            registry: ENS_REGISTRY,
        }
    }
}

impl EnsProfileAdapter {
    pub fn with_registry(registry: Address) -> Self {
        Self { registry }
    }

    async fn resolver<T: TransportPort>(
        &self,
        transport: &T,
        node: B256,
    ) -> Result<Option<Address>, PortError> {
        let out = eth_call(
            transport,
            self.registry,
            calldata("resolver(bytes32)", vec![node_word(node)]),
        )
        .await?;
        decode_address(&out)
    }
}

impl ProfilePort for EnsProfileAdapter {
    async fn lookup<T: TransportPort>(
        &self,
        transport: &T,
        address: Address,
    ) -> Result<Profile, PortError> {
        let reverse_node = namehash(&reverse_name(address));
        let Some(reverse_resolver) = self.resolver(transport, reverse_node).await? else {
            return Ok(Profile::default());
        };
        let out = eth_call(
            transport,
            reverse_resolver,
            calldata("name(bytes32)", vec![node_word(reverse_node)]),
        )
        .await?;
        let name = decode_string(&out)?;
        if name.is_empty() {
            return Ok(Profile::default());
        }

        // a reverse record only counts if the name resolves back to the account
        let node = namehash(&name);
        let Some(resolver) = self.resolver(transport, node).await? else {
            return Ok(Profile::default());
        };
        let out = eth_call(
            transport,
            resolver,
            calldata("addr(bytes32)", vec![node_word(node)]),
        )
        .await?;
        if decode_address(&out)? != Some(address) {
            debug!(%address, %name, "reverse record does not resolve back");
            return Ok(Profile::default());
        }

        let avatar = match eth_call(
            transport,
            resolver,
            calldata(
                "text(bytes32,string)",
                vec![node_word(node), DynSolValue::String("avatar".to_owned())],
            ),
        )
        .await
        .and_then(|out| decode_string(&out))
        {
            Ok(avatar) if !avatar.is_empty() => Some(avatar),
            Ok(_) => None,
            Err(e) => {
                debug!(%name, error = %e, "avatar lookup failed");
                None
            }
        };

        Ok(Profile {
            name: Some(name),
            avatar,
        })
    }
}

pub fn namehash(name: &str) -> B256 {
    let mut node = B256::ZERO;
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_slice());
        buf[32..].copy_from_slice(keccak256(label.as_bytes()).as_slice());
        node = keccak256(buf);
    }
    node
}

pub fn reverse_name(address: Address) -> String {
    format!("{}.addr.reverse", alloy::hex::encode(address.as_slice()))
}

fn node_word(node: B256) -> DynSolValue {
    DynSolValue::FixedBytes(node, 32)
}

fn calldata(signature: &str, args: Vec<DynSolValue>) -> Vec<u8> {
    let mut data = keccak256(signature.as_bytes())[..4].to_vec();
    data.extend(DynSolValue::Tuple(args).abi_encode_params());
    data
}

async fn eth_call<T: TransportPort>(
    transport: &T,
    to: Address,
    data: Vec<u8>,
) -> Result<Vec<u8>, PortError> {
    let params = serde_json::json!([
        {
            "to": to.to_string(),
            "data": format!("0x{}", alloy::hex::encode(data)),
        },
        "latest"
    ]);
    let result = transport.request("eth_call", params).await?;
    let raw = result
        .as_str()
        .ok_or_else(|| PortError::Validation(format!("eth_call returned non-string: {result}")))?;
    alloy::hex::decode(raw).map_err(|e| PortError::Validation(format!("eth_call hex: {e}")))
}

fn decode_single(out: &[u8], ty: DynSolType) -> Result<Option<DynSolValue>, PortError> {
    if out.is_empty() {
        return Ok(None);
    }
    let decoded = DynSolType::Tuple(vec![ty])
        .abi_decode_params(out)
        .map_err(|e| PortError::Validation(format!("abi decode failed: {e}")))?;
    match decoded {
        DynSolValue::Tuple(values) => Ok(values.into_iter().next()),
        other => Ok(Some(other)),
    }
}

fn decode_address(out: &[u8]) -> Result<Option<Address>, PortError> {
    match decode_single(out, DynSolType::Address)? {
        Some(DynSolValue::Address(a)) if a != Address::ZERO => Ok(Some(a)),
        _ => Ok(None),
    }
}

fn decode_string(out: &[u8]) -> Result<String, PortError> {
    match decode_single(out, DynSolType::String)? {
        Some(DynSolValue::String(s)) => Ok(s),
        _ => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namehash_matches_known_nodes() {
        assert_eq!(namehash(""), B256::ZERO);
        assert_eq!(
            namehash("eth").to_string(),
            "0x93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae"
        );
        assert_eq!(
            namehash("addr.reverse").to_string(),
            "0x91d1777781884d03a6757a803996e38de2a42967fb37eeaca72729271025a9e2"
        );
    }

    #[test]
    fn reverse_name_uses_lowercase_hex() {
        let account: Address = "0x000000000000000000000000000000000000dEaD"
            .parse()
            .expect("address");
        assert_eq!(
            reverse_name(account),
            "000000000000000000000000000000000000dead.addr.reverse"
        );
    }

    #[test]
    fn empty_call_results_decode_to_nothing() {
        assert_eq!(decode_address(&[]).expect("address"), None);
        assert_eq!(decode_string(&[]).expect("string"), "");
        let encoded = DynSolValue::Tuple(vec![DynSolValue::String("vitalik.eth".to_owned())])
            .abi_encode_params();
        assert_eq!(decode_string(&encoded).expect("string"), "vitalik.eth");
    }
}
