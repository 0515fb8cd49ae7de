//! Address Trace - watch one wallet and dump its raw swap events
//!
//! Debug tool for contract reverse-engineering: tails the chain tip and
//! prints the complete event payloads of every transaction sent by the
//! watched address. Useful for capturing a real SwapEvent body to check the
//! parser's field assumptions against.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin address_trace -- --sender <ADDRESS>
//! ```
//!
//! ## Environment Variables
//!
//! - `RPC_NODE_URL` - ledger REST endpoint (default: Endless mainnet)
//! - `TRACE_POLL_INTERVAL_MS` - poll interval (default: 1000)

use dotenv::dotenv;
use log::{debug, info};
use std::time::Duration;
use tokio::time::interval;

use edsflow::ledger::{HttpLedgerClient, LedgerClient};

/// How many of the newest transactions each poll inspects
const TRACE_WINDOW: u16 = 20;

/// Command-line configuration for address tracing
struct AddressTraceConfig {
    target_sender: String,
    rpc_node_url: String,
    poll_interval_ms: u64,
}

impl AddressTraceConfig {
    fn from_env_and_args() -> Result<Self, Box<dyn std::error::Error>> {
        let args: Vec<String> = std::env::args().collect();

        let target_sender = args
            .windows(2)
            .find(|w| w[0] == "--sender")
            .map(|w| w[1].clone())
            .ok_or("Missing --sender argument. Usage: address_trace --sender <ADDRESS>")?;

        let rpc_node_url = std::env::var("RPC_NODE_URL")
            .unwrap_or_else(|_| "https://rpc.endless.link/v1".to_string());

        let poll_interval_ms = std::env::var("TRACE_POLL_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1_000);

        Ok(Self {
            target_sender,
            rpc_node_url,
            poll_interval_ms,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AddressTraceConfig::from_env_and_args()?;
    let client = HttpLedgerClient::new(&config.rpc_node_url)?;

    info!("🕵️  Address trace started");
    info!("   ├─ Watching: {}", config.target_sender);
    info!("   └─ RPC: {}", config.rpc_node_url);
    info!("⏳ Make a swap from the watched address now...");

    // Start at the current tip; only newer transactions are reported
    let mut last_scanned = client.get_ledger_info().await?.ledger_version;
    info!("✅ Network reachable (height {})", last_scanned);

    let mut ticker = interval(Duration::from_millis(config.poll_interval_ms));

    loop {
        ticker.tick().await;

        let txs = match client.get_transactions(None, TRACE_WINDOW).await {
            Ok(txs) => txs,
            Err(e) => {
                // Transient network noise; try again next tick
                debug!("Trace tick failed: {}", e);
                continue;
            }
        };

        for tx in &txs {
            if tx.tx_type != "user_transaction"
                || tx.sender != config.target_sender
                || tx.version <= last_scanned
            {
                continue;
            }

            println!("\n🚨 Captured transaction from watched address");
            println!("===========================================");
            println!("Version: {}", tx.version);
            println!("Hash: {}", tx.hash);
            println!("-------------------------------------------");
            println!("{}", serde_json::to_string_pretty(&tx.events)?);
            println!("===========================================");

            last_scanned = tx.version;
        }

        // Catch-up rule: if the chain ran far ahead of the scan baseline,
        // follow it but keep a 50-version buffer so a swap landing right now
        // is not skipped over
        if let Some(max_version) = txs.iter().map(|t| t.version).max() {
            if max_version > last_scanned + 100 {
                last_scanned = max_version - 50;
            }
        }
    }
}
