//! Shared utilities for integration testing against a fake JSON-RPC node.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use multisend_deployer::config::{ChainConfig, DeployerConfig};

/// Address nothing listens on.
#[allow(dead_code)]
pub const DEAD_RPC_URL: &str = "http://127.0.0.1:1";

/// Hardhat artifacts shipped with the tests.
pub fn fixture_artifacts() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("artifacts")
}

/// Config pointing at `rpc_url` with short timeouts and the fixture artifacts.
#[allow(dead_code)]
pub fn test_config(rpc_url: &str) -> DeployerConfig {
    let mut config = DeployerConfig::default();
    config.chain = chain_config(rpc_url);
    config.contract.artifacts_dir = fixture_artifacts();
    config.block_poll.initial_delay_ms = 10;
    config.block_poll.max_delay_ms = 50;
    config.block_poll.timeout_secs = 2;
    config
}

#[allow(dead_code)]
pub fn chain_config(rpc_url: &str) -> ChainConfig {
    ChainConfig {
        rpc_url: rpc_url.to_string(),
        chain_id: 31337,
        rpc_timeout_secs: 2,
        confirmation_timeout_secs: 5,
        deployer_private_key: Some(
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_string(),
        ),
    }
}

/// Start a JSON-RPC node on an ephemeral port.
///
/// `handler` maps `(method, params)` to a result or an error message.
#[allow(dead_code)]
pub async fn start_rpc_node<F>(handler: F) -> SocketAddr
where
    F: Fn(&str, &Value) -> Result<Value, String> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        serve_connection(socket, handler.as_ref()).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn serve_connection<F>(mut socket: TcpStream, handler: &F)
where
    F: Fn(&str, &Value) -> Result<Value, String>,
{
    let Some(body) = read_http_body(&mut socket).await else {
        return;
    };

    let response = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Array(batch)) => Value::Array(batch.iter().map(|r| dispatch(r, handler)).collect()),
        Ok(request) => dispatch(&request, handler),
        Err(e) => json!({
            "jsonrpc": "2.0",
            "id": null,
            "error": {"code": -32700, "message": e.to_string()}
        }),
    };

    let payload = response.to_string();
    let http = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        payload.len(),
        payload
    );
    let _ = socket.write_all(http.as_bytes()).await;
    let _ = socket.shutdown().await;
}

fn dispatch<F>(request: &Value, handler: &F) -> Value
where
    F: Fn(&str, &Value) -> Result<Value, String>,
{
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request.get("method").and_then(Value::as_str).unwrap_or_default();
    let params = request.get("params").cloned().unwrap_or(Value::Null);

    match handler(method, &params) {
        Ok(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
        Err(message) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": -32000, "message": message}
        }),
    }
}

async fn read_http_body(socket: &mut TcpStream) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(buf[header_end..header_end + content_length].to_vec())
}

/// Hex quantity as returned by `eth_blockNumber`.
#[allow(dead_code)]
pub fn quantity(value: u64) -> Value {
    Value::String(format!("0x{:x}", value))
}

/// Address the dev chain reports for every contract creation.
#[allow(dead_code)]
pub const DEPLOYED_ADDRESS: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

/// Address of the development account, as `getOwner` returns it.
#[allow(dead_code)]
pub const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

/// How the dev chain answers receipt lookups.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receipts {
    /// Every transaction is mined with status 1.
    Success,
    /// Every transaction is mined with status 0.
    Reverted,
    /// No transaction is ever mined.
    Pending,
}

/// A fake node that accepts signed transactions.
#[allow(dead_code)]
pub struct DevChain {
    pub addr: SocketAddr,
    /// Number of `eth_sendRawTransaction` calls seen.
    pub raw_transactions: Arc<AtomicU64>,
}

#[allow(dead_code)]
impl DevChain {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn sent(&self) -> u64 {
        self.raw_transactions.load(Ordering::SeqCst)
    }
}

/// Start a node that answers everything a wallet-backed provider needs to
/// fill, sign, send and confirm a transaction.
///
/// The block number advances on every `eth_blockNumber` call.
#[allow(dead_code)]
pub async fn start_dev_chain(receipts: Receipts) -> DevChain {
    let raw_transactions = Arc::new(AtomicU64::new(0));
    let height = Arc::new(AtomicU64::new(1));
    let sent = raw_transactions.clone();

    let addr = start_rpc_node(move |method, params| match method {
        "eth_chainId" => Ok(quantity(31337)),
        "eth_blockNumber" => Ok(quantity(height.fetch_add(1, Ordering::SeqCst))),
        "eth_getTransactionCount" => Ok(quantity(sent.load(Ordering::SeqCst))),
        "eth_estimateGas" => Ok(quantity(100_000)),
        "eth_gasPrice" | "eth_maxPriorityFeePerGas" => Ok(quantity(1_000_000_000)),
        "eth_feeHistory" => Ok(json!({
            "oldestBlock": "0x1",
            "baseFeePerGas": ["0x3b9aca00", "0x3b9aca00"],
            "gasUsedRatio": [0.5],
            "reward": [["0x3b9aca00"]]
        })),
        "eth_sendRawTransaction" => {
            let n = sent.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Value::String(format!("0x{:064x}", n)))
        }
        "eth_getTransactionReceipt" => match receipts {
            Receipts::Pending => Ok(Value::Null),
            Receipts::Success => Ok(receipt(&params[0], true)),
            Receipts::Reverted => Ok(receipt(&params[0], false)),
        },
        // Unknown blocks keep the provider's block watcher polling.
        "eth_getBlockByNumber" | "eth_getBlockByHash" => Ok(Value::Null),
        "eth_getBalance" => Ok(Value::String("0xde0b6b3a7640000".to_string())),
        "eth_call" => Ok(Value::String(format!(
            "0x000000000000000000000000{}",
            DEV_ADDRESS.trim_start_matches("0x").to_lowercase()
        ))),
        other => Err(format!("method {} not supported", other)),
    })
    .await;

    DevChain {
        addr,
        raw_transactions,
    }
}

fn receipt(tx_hash: &Value, success: bool) -> Value {
    json!({
        "transactionHash": tx_hash,
        "transactionIndex": "0x0",
        "blockHash": format!("0x{}", "11".repeat(32)),
        "blockNumber": "0x1",
        "from": DEV_ADDRESS.to_lowercase(),
        "to": null,
        "cumulativeGasUsed": "0x186a0",
        "gasUsed": "0x186a0",
        "effectiveGasPrice": "0x3b9aca00",
        "contractAddress": DEPLOYED_ADDRESS,
        "logs": [],
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "type": "0x2",
        "status": if success { "0x1" } else { "0x0" }
    })
}
