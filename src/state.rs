use {
    serde::{Deserialize, Serialize},
    std::collections::{HashMap, HashSet},
};

/// One parsed swap, keyed by ledger version
///
/// Immutable once created; the log only ever appends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxRecord {
    pub hash: String,
    pub sender: String,
    pub buy_amount: f64,
    pub sell_amount: f64,
    /// Seconds since epoch
    pub timestamp: i64,
    /// Ledger sequence number; unique key across the log
    #[serde(deserialize_with = "crate::ledger::u64_flex")]
    pub version: u64,
}

/// Scan phase of the sync engine
///
/// The Backfill -> Live transition is one-way for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Backfill,
    Live,
}

impl SyncMode {
    /// Status string exposed on the query surface
    pub fn as_status(&self) -> &'static str {
        match self {
            SyncMode::Backfill => "syncing",
            SyncMode::Live => "live",
        }
    }
}

/// Running per-address volume totals, maintained incrementally on ingest
#[derive(Debug, Clone, Default)]
pub struct SenderTotals {
    pub buy_volume: f64,
    pub sell_volume: f64,
    pub total_volume: f64,
    pub tx_count: u64,
}

/// Engine context owning every piece of mutable sync state
///
/// The transaction log, dedup set, cursors and mode flag live here and are
/// only touched through a shared handle, so there is exactly one place where
/// ingest order and checkpoint monotonicity are enforced.
pub struct EngineState {
    /// Append-only log of accepted swaps
    transactions: Vec<TxRecord>,
    /// Versions ever accepted into the log; gates every insertion
    processed_versions: HashSet<u64>,
    /// Checkpoint cursor: lowest unprocessed ledger version
    scan_progress_height: u64,
    /// Last observed chain tip
    current_chain_height: u64,
    mode: SyncMode,
    /// Incremental whole-history aggregate alongside the raw log
    totals_by_sender: HashMap<String, SenderTotals>,
    /// Newest record timestamp seen, for whole-history query detection
    latest_timestamp: i64,
}

impl EngineState {
    pub fn new(genesis_start_height: u64) -> Self {
        Self {
            transactions: Vec::new(),
            processed_versions: HashSet::new(),
            scan_progress_height: genesis_start_height,
            current_chain_height: 0,
            mode: SyncMode::Backfill,
            totals_by_sender: HashMap::new(),
            latest_timestamp: 0,
        }
    }

    /// Insert a record if its version has not been seen before
    ///
    /// Returns true when the record was accepted, false when the dedup set
    /// rejected it.
    pub fn record_transaction(&mut self, record: TxRecord) -> bool {
        if !self.processed_versions.insert(record.version) {
            return false;
        }

        let totals = self
            .totals_by_sender
            .entry(record.sender.clone())
            .or_default();
        totals.buy_volume += record.buy_amount;
        totals.sell_volume += record.sell_amount;
        totals.total_volume += record.buy_amount + record.sell_amount;
        totals.tx_count += 1;

        if record.timestamp > self.latest_timestamp {
            self.latest_timestamp = record.timestamp;
        }

        self.transactions.push(record);
        true
    }

    pub fn transactions(&self) -> &[TxRecord] {
        &self.transactions
    }

    pub fn is_processed(&self, version: u64) -> bool {
        self.processed_versions.contains(&version)
    }

    pub fn scan_progress_height(&self) -> u64 {
        self.scan_progress_height
    }

    /// Move the checkpoint forward; regressions are ignored
    pub fn advance_scan_progress(&mut self, height: u64) {
        if height > self.scan_progress_height {
            self.scan_progress_height = height;
        }
    }

    /// Adopt a checkpoint restored from a snapshot
    ///
    /// Only overrides the configured floor when strictly greater, so an old
    /// or corrupt snapshot can never drag progress backwards.
    pub fn restore_scan_progress(&mut self, saved: u64) {
        if saved > self.scan_progress_height {
            self.scan_progress_height = saved;
        }
    }

    pub fn current_chain_height(&self) -> u64 {
        self.current_chain_height
    }

    pub fn set_current_chain_height(&mut self, height: u64) {
        self.current_chain_height = height;
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    /// One-way switch out of backfill
    pub fn enter_live(&mut self) {
        self.mode = SyncMode::Live;
    }

    pub fn totals_by_sender(&self) -> &HashMap<String, SenderTotals> {
        &self.totals_by_sender
    }

    pub fn latest_timestamp(&self) -> i64 {
        self.latest_timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(version: u64, sender: &str, buy: f64, sell: f64) -> TxRecord {
        TxRecord {
            hash: format!("0x{:x}", version),
            sender: sender.to_string(),
            buy_amount: buy,
            sell_amount: sell,
            timestamp: 1_700_000_000 + version as i64,
            version,
        }
    }

    #[test]
    fn test_dedup_gates_insertion() {
        let mut state = EngineState::new(100);

        assert!(state.record_transaction(make_record(101, "alice", 5.0, 0.0)));
        assert!(!state.record_transaction(make_record(101, "alice", 5.0, 0.0)));

        assert_eq!(state.transactions().len(), 1);
        assert!(state.is_processed(101));
    }

    #[test]
    fn test_scan_progress_is_monotonic() {
        let mut state = EngineState::new(100);

        state.advance_scan_progress(500);
        assert_eq!(state.scan_progress_height(), 500);

        // Regression attempts are ignored
        state.advance_scan_progress(300);
        assert_eq!(state.scan_progress_height(), 500);
    }

    #[test]
    fn test_restore_never_drops_below_genesis_floor() {
        let mut state = EngineState::new(1_000);

        state.restore_scan_progress(900);
        assert_eq!(state.scan_progress_height(), 1_000);

        state.restore_scan_progress(1_500);
        assert_eq!(state.scan_progress_height(), 1_500);
    }

    #[test]
    fn test_running_totals_track_ingest() {
        let mut state = EngineState::new(0);

        state.record_transaction(make_record(1, "alice", 10.0, 0.0));
        state.record_transaction(make_record(2, "alice", 0.0, 5.0));
        state.record_transaction(make_record(3, "bob", 1.0, 1.0));

        let alice = &state.totals_by_sender()["alice"];
        assert_eq!(alice.buy_volume, 10.0);
        assert_eq!(alice.sell_volume, 5.0);
        assert_eq!(alice.total_volume, 15.0);
        assert_eq!(alice.tx_count, 2);

        let bob = &state.totals_by_sender()["bob"];
        assert_eq!(bob.total_volume, 2.0);
    }

    #[test]
    fn test_mode_transition_is_one_way() {
        let mut state = EngineState::new(0);
        assert_eq!(state.mode().as_status(), "syncing");

        state.enter_live();
        assert_eq!(state.mode().as_status(), "live");
    }
}
