//! Windowed batch fetching with bounded retry
//!
//! One call covers one contiguous version window. Failures are retried with
//! multiplicative backoff; when attempts run out the window degrades to an
//! empty result instead of an error, so the scan never stalls on a bad
//! region. The degraded flag survives for the controller's accounting.

use std::time::Duration;
use tokio::time::sleep;

use crate::ledger::{LedgerClient, RawTransaction};

const FETCH_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 1_000;
const BACKOFF_MULTIPLIER: f64 = 1.5;

/// Result of one windowed fetch
#[derive(Debug)]
pub enum FetchOutcome {
    /// The window was fetched; the vec may be genuinely empty
    Fetched(Vec<RawTransaction>),
    /// Every attempt failed; downstream treats this as empty
    Degraded,
}

impl FetchOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, FetchOutcome::Degraded)
    }

    pub fn transactions(self) -> Vec<RawTransaction> {
        match self {
            FetchOutcome::Fetched(txs) => txs,
            FetchOutcome::Degraded => Vec::new(),
        }
    }
}

/// Fetch up to `limit` transactions starting at version `offset`
///
/// Up to 3 attempts; backoff starts at 1000ms and grows 1.5x per failure.
/// Errors classified non-retryable short-circuit immediately. Backoff is the
/// only throttling; there is no per-call timeout beyond the transport's own.
pub async fn fetch_batch_with_retry(
    client: &dyn LedgerClient,
    offset: u64,
    limit: u16,
) -> FetchOutcome {
    let mut delay_ms = INITIAL_BACKOFF_MS;

    for attempt in 1..=FETCH_ATTEMPTS {
        match client.get_transactions(Some(offset), limit).await {
            Ok(txs) => return FetchOutcome::Fetched(txs),
            Err(e) => {
                if !e.is_retryable() {
                    log::warn!("❌ Window at {} hit non-retryable error: {}", offset, e);
                    return FetchOutcome::Degraded;
                }

                if attempt == FETCH_ATTEMPTS {
                    log::warn!("⚠️  Window at {} exhausted {} attempts: {}", offset, FETCH_ATTEMPTS, e);
                    return FetchOutcome::Degraded;
                }

                log::warn!(
                    "⏳ Window at {} failed (attempt {}/{}), retrying in {}ms: {}",
                    offset,
                    attempt,
                    FETCH_ATTEMPTS,
                    delay_ms,
                    e
                );
                sleep(Duration::from_millis(delay_ms)).await;
                delay_ms = (delay_ms as f64 * BACKOFF_MULTIPLIER) as u64;
            }
        }
    }

    FetchOutcome::Degraded
}
