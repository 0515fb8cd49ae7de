//! Monitor configuration from environment variables
//!
//! All knobs have compiled defaults matching the deployed SliSwap/EDS
//! monitor, so a bare `monitor` invocation tracks the production pair.

use std::env;

/// Static configuration for the sync engine and its collaborators
///
/// Loaded once at startup; not runtime-mutable.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the ledger REST endpoint
    pub rpc_node_url: String,

    /// Contract address substring matched against swap event type strings
    pub swap_contract_addr: String,

    /// Identifier of the tracked token
    pub tracked_token_id: String,

    /// Decimal scale of the tracked token (base units = 10^decimals)
    pub token_decimals: u32,

    /// Path of the JSON snapshot file
    pub snapshot_path: String,

    /// First ledger version to scan on a cold start (no snapshot)
    pub genesis_start_height: u64,

    /// Versions covered by one fetch window during backfill
    pub batch_size: u64,

    /// Number of windows issued concurrently per backfill iteration
    pub fetch_concurrency: u64,

    /// Live tailing poll interval in milliseconds
    pub live_poll_interval_ms: u64,

    /// Window size for one live-tail fetch
    pub live_batch_size: u16,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `RPC_NODE_URL` (default: https://rpc.endless.link/v1)
    /// - `SWAP_CONTRACT_ADDR` (default: SliSwap mainnet address)
    /// - `TRACKED_TOKEN_ID` (default: EDS)
    /// - `TOKEN_DECIMALS` (default: 8)
    /// - `SNAPSHOT_PATH` (default: history_data.json)
    /// - `GENESIS_START_HEIGHT` (default: 108106850)
    /// - `BATCH_SIZE` (default: 100)
    /// - `FETCH_CONCURRENCY` (default: 10)
    /// - `LIVE_POLL_INTERVAL_MS` (default: 2000)
    /// - `LIVE_BATCH_SIZE` (default: 50)
    pub fn from_env() -> Self {
        Self {
            rpc_node_url: env::var("RPC_NODE_URL")
                .unwrap_or_else(|_| "https://rpc.endless.link/v1".to_string()),

            swap_contract_addr: env::var("SWAP_CONTRACT_ADDR")
                .unwrap_or_else(|_| "SwapBAzMqRdX9RBXcaBnupiPmfmk1wDcLPPQiy1mehh".to_string()),

            tracked_token_id: env::var("TRACKED_TOKEN_ID")
                .unwrap_or_else(|_| "ENDLESSsssssssssssssssssssssssssssssssssssss".to_string()),

            token_decimals: env::var("TOKEN_DECIMALS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8),

            snapshot_path: env::var("SNAPSHOT_PATH")
                .unwrap_or_else(|_| "history_data.json".to_string()),

            genesis_start_height: env::var("GENESIS_START_HEIGHT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(108_106_850),

            batch_size: env::var("BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),

            fetch_concurrency: env::var("FETCH_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),

            live_poll_interval_ms: env::var("LIVE_POLL_INTERVAL_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2_000),

            live_batch_size: env::var("LIVE_BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(50),
        }
    }

    /// Divisor converting integer base units to decimal token amounts
    pub fn decimal_scale(&self) -> f64 {
        10f64.powi(self.token_decimals as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Test: Default configuration when no env vars set
        env::remove_var("RPC_NODE_URL");
        env::remove_var("GENESIS_START_HEIGHT");
        env::remove_var("BATCH_SIZE");
        env::remove_var("FETCH_CONCURRENCY");

        let config = Config::from_env();

        assert_eq!(config.rpc_node_url, "https://rpc.endless.link/v1");
        assert_eq!(config.token_decimals, 8);
        assert_eq!(config.genesis_start_height, 108_106_850);
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.fetch_concurrency, 10);
        assert_eq!(config.live_poll_interval_ms, 2_000);
        assert_eq!(config.live_batch_size, 50);
    }

    #[test]
    fn test_decimal_scale() {
        let mut config = Config::from_env();
        config.token_decimals = 8;
        assert_eq!(config.decimal_scale(), 100_000_000.0);
    }
}
