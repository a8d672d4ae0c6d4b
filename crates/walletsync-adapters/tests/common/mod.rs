#![allow(dead_code)]

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;

use alloy::primitives::Address;
use serde_json::{json, Value};
use tiny_http::{Response, Server, StatusCode};

pub fn account() -> Address {
    "0x000000000000000000000000000000000000dEaD"
        .parse()
        .expect("valid account")
}

pub fn other_account() -> Address {
    "0x000000000000000000000000000000000000bEEF"
        .parse()
        .expect("valid account")
}

/// Scripted JSON-RPC answer: `Ok(result)` or `Err((code, message))`.
pub type RpcReply = Result<Value, (i64, String)>;

/// Serves JSON-RPC over HTTP on a background thread, recording each method
/// it sees. Stops after `max_requests`.
pub fn spawn_rpc_server<F>(
    max_requests: usize,
    calls: Arc<Mutex<Vec<String>>>,
    reply: F,
) -> (String, thread::JoinHandle<()>)
where
    F: Fn(&str, &Value) -> RpcReply + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").expect("start server");
    let addr = format!("http://{}", server.server_addr());

    let join = thread::spawn(move || {
        for _ in 0..max_requests {
            let mut req = match server.recv() {
                Ok(r) => r,
                Err(_) => break,
            };
            let mut body = String::new();
            if req.as_reader().read_to_string(&mut body).is_err() {
                let _ = req.respond(Response::empty(StatusCode(400)));
                continue;
            }
            let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
            let method = payload
                .get("method")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned();
            let params = payload.get("params").cloned().unwrap_or(Value::Null);
            if let Ok(mut g) = calls.lock() {
                g.push(method.clone());
            }

            let response = match reply(&method, &params) {
                Ok(result) => json!({"jsonrpc": "2.0", "id": 1, "result": result}),
                Err((code, message)) => json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "error": {"code": code, "message": message},
                }),
            };
            let _ = req.respond(
                Response::from_string(response.to_string()).with_status_code(StatusCode(200)),
            );
        }
    });

    (addr, join)
}
