//! Typed errors for the ledger and sync layers
//!
//! Errors carry their retry classification from the point of failure, so
//! callers never have to pattern-match message text to decide what is
//! transient.

use thiserror::Error;

/// Error produced by the ledger RPC facade
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("rpc transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("rpc returned status {status} for {endpoint}")]
    Status {
        status: reqwest::StatusCode,
        endpoint: String,
    },

    #[error("malformed rpc response: {0}")]
    Malformed(String),
}

impl LedgerError {
    /// Whether a retry with backoff can plausibly succeed
    ///
    /// Transport failures and server-side/throttling statuses are retryable;
    /// client errors and malformed bodies are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            LedgerError::Transport(e) => {
                // Decode failures are a malformed-body symptom, not a network one
                !e.is_decode()
            }
            LedgerError::Status { status, .. } => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            LedgerError::Malformed(_) => false,
        }
    }
}

/// Error terminating a sync attempt
#[derive(Debug, Error)]
pub enum SyncError {
    /// The chain tip could not be read when entering backfill. The engine
    /// aborts the attempt instead of retrying indefinitely.
    #[error("chain tip query failed at backfill entry: {0}")]
    ChainTip(#[source] LedgerError),
}
