//! Backfill/Live sync controller
//!
//! Owns the two-phase scan over the ledger. Backfill sweeps from the
//! checkpoint to the chain tip observed at entry with concurrent disjoint
//! fetch windows; live tailing then polls the tip on a fixed interval. Both
//! phases funnel every raw transaction through the parser and the engine
//! state's dedup gate, and both drive snapshot persistence.
//!
//! All mutation of shared state happens from this one control flow, so
//! leaderboard reads always observe fully-constructed records.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::interval;

use crate::config::Config;
use crate::error::SyncError;
use crate::ledger::LedgerClient;
use crate::parser::parse_transaction;
use crate::persistence::save_snapshot;
use crate::state::EngineState;
use crate::sync::fetcher::fetch_batch_with_retry;

/// The smart sync engine
///
/// Holds the ledger facade, the shared engine state and the static
/// configuration; spawned once by the runtime and driven by [`run`].
///
/// [`run`]: SyncEngine::run
pub struct SyncEngine {
    client: Arc<dyn LedgerClient>,
    state: Arc<RwLock<EngineState>>,
    config: Config,
}

impl SyncEngine {
    pub fn new(
        client: Arc<dyn LedgerClient>,
        state: Arc<RwLock<EngineState>>,
        config: Config,
    ) -> Self {
        Self {
            client,
            state,
            config,
        }
    }

    /// Backfill to the current tip, then tail forever
    ///
    /// Only returns with an error when the chain tip cannot be read at
    /// backfill entry; the live loop has no terminal state.
    pub async fn run(&self) -> Result<(), SyncError> {
        self.backfill().await?;
        self.live_loop().await;
        Ok(())
    }

    /// Bulk catch-up from the checkpoint to the tip observed on entry
    ///
    /// The tip is queried exactly once; versions landing after that are left
    /// for the live phase. Each iteration issues up to `fetch_concurrency`
    /// disjoint windows of `batch_size` versions, consumes the results in
    /// window-index order, advances the cursor by the full requested span
    /// and persists the snapshot.
    pub async fn backfill(&self) -> Result<(), SyncError> {
        let tip = self
            .client
            .get_ledger_info()
            .await
            .map_err(SyncError::ChainTip)?
            .ledger_version;

        let mut cursor = {
            let mut state = self.state.write().await;
            state.set_current_chain_height(tip);
            state.scan_progress_height()
        };

        log::info!(
            "🚀 Smart sync starting (checkpoint {}) | target height {} | {} versions to scan",
            cursor,
            tip,
            tip.saturating_sub(cursor)
        );

        let genesis = self.config.genesis_start_height;

        while cursor < tip {
            let mut offsets = Vec::new();
            for i in 0..self.config.fetch_concurrency {
                let offset = cursor + i * self.config.batch_size;
                if offset > tip {
                    break;
                }
                offsets.push(offset);
            }

            if offsets.is_empty() {
                break;
            }

            let limit = self.config.batch_size as u16;
            let fetches = offsets
                .iter()
                .map(|&offset| fetch_batch_with_retry(self.client.as_ref(), offset, limit));

            // All windows are dispatched before any result is consumed;
            // consumption order is window-index order, not completion order.
            let outcomes = join_all(fetches).await;

            let span = offsets.len() as u64 * self.config.batch_size;
            let mut new_count = 0u64;
            let mut degraded = 0u64;

            {
                let mut state = self.state.write().await;
                for outcome in outcomes {
                    if outcome.is_degraded() {
                        degraded += 1;
                    }
                    for tx in outcome.transactions() {
                        if let Some(record) = parse_transaction(
                            &tx,
                            &self.config.swap_contract_addr,
                            &self.config.tracked_token_id,
                            self.config.decimal_scale(),
                        ) {
                            if state.record_transaction(record) {
                                new_count += 1;
                            }
                        }
                    }
                }

                // Advance by the full requested span regardless of what each
                // window returned; degraded windows are swept unconfirmed.
                cursor += span;
                state.advance_scan_progress(cursor);
            }

            if degraded > 0 {
                log::warn!(
                    "⚠️  {} of {} windows degraded to empty after retries; versions {}..{} swept unconfirmed",
                    degraded,
                    offsets.len(),
                    offsets[0],
                    cursor
                );
            }

            // Percentage is display-only; all cursor math stays in u64
            let percent = if tip > genesis {
                (cursor.saturating_sub(genesis)) as f64 / (tip - genesis) as f64 * 100.0
            } else {
                100.0
            };
            log::info!(
                "⚡ Backfill: [{:.1}%] | cursor {} | +{} transactions",
                percent.min(100.0),
                cursor,
                new_count
            );

            let state = self.state.read().await;
            if let Err(e) = save_snapshot(&state, &self.config.snapshot_path) {
                log::error!("❌ Snapshot save failed: {}", e);
            }
        }

        let mut state = self.state.write().await;
        state.enter_live();
        log::info!(
            "✅ Backfill complete at {}. Switching to live tailing.",
            state.scan_progress_height()
        );
        Ok(())
    }

    /// Steady-state tailing loop; never returns
    pub async fn live_loop(&self) {
        let mut last_version = self.state.read().await.scan_progress_height();
        let mut ticker = interval(Duration::from_millis(self.config.live_poll_interval_ms));

        loop {
            ticker.tick().await;
            last_version = self.live_tick(last_version).await;
        }
    }

    /// One live poll: query the tip, fetch a small window, advance
    ///
    /// Returns the next `last_version`. Errors are swallowed for the tick;
    /// the caller simply polls again on the next interval. When the tip has
    /// advanced but the window came back empty the gap is crossed in bounded
    /// steps of at most `live_batch_size` versions, so a relevant
    /// transaction hiding in a large gap still gets a fetch attempt.
    pub async fn live_tick(&self, last_version: u64) -> u64 {
        let tip = match self.client.get_ledger_info().await {
            Ok(info) => info.ledger_version,
            Err(e) => {
                log::debug!("Live tick: chain tip query failed: {}", e);
                return last_version;
            }
        };

        {
            let mut state = self.state.write().await;
            state.set_current_chain_height(tip);
        }

        if tip <= last_version {
            return last_version;
        }

        let outcome =
            fetch_batch_with_retry(self.client.as_ref(), last_version, self.config.live_batch_size)
                .await;
        let txs = outcome.transactions();

        let mut max_version_seen = last_version;
        let mut ingested = 0u64;

        let mut state = self.state.write().await;
        for tx in &txs {
            if tx.version > max_version_seen {
                max_version_seen = tx.version;
            }

            if let Some(record) = parse_transaction(
                tx,
                &self.config.swap_contract_addr,
                &self.config.tracked_token_id,
                self.config.decimal_scale(),
            ) {
                let sender_short: String = record.sender.chars().take(6).collect();
                let (buy, sell, version) = (record.buy_amount, record.sell_amount, record.version);

                if state.record_transaction(record) {
                    ingested += 1;
                    log::info!(
                        "🔥 New swap [v{}] {}... +{} / -{}",
                        version,
                        sender_short,
                        buy,
                        sell
                    );
                }
            }
        }

        let next = if !txs.is_empty() {
            max_version_seen + 1
        } else if tip > last_version + u64::from(self.config.live_batch_size) {
            // Likely-empty blocks: cross the gap gradually, never in one jump
            last_version + u64::from(self.config.live_batch_size)
        } else {
            tip
        };

        state.advance_scan_progress(next);

        if ingested > 0 || state.scan_progress_height() % 100 == 0 {
            if let Err(e) = save_snapshot(&state, &self.config.snapshot_path) {
                log::error!("❌ Snapshot save failed: {}", e);
            }
        }

        next
    }
}
