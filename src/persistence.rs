use {
    crate::state::{EngineState, TxRecord},
    serde::{Deserialize, Serialize},
    std::{fs, path::Path},
};

/// On-disk snapshot of the transaction log and scan progress
///
/// One JSON file, fully overwritten on each save. The in-memory log stays
/// authoritative; a crash mid-write can corrupt the file (accepted risk).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Epoch milliseconds of the save
    pub last_update: i64,
    /// String-encoded checkpoint; absent in snapshots from older deployments
    #[serde(default)]
    pub last_scanned_block: Option<String>,
    pub transactions: Vec<TxRecord>,
}

/// Overwrite the snapshot file with the current log and checkpoint
///
/// The log is written newest-first (descending version) so the file is
/// deterministic for a given state.
pub fn save_snapshot(state: &EngineState, file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut transactions = state.transactions().to_vec();
    transactions.sort_unstable_by(|a, b| b.version.cmp(&a.version));

    let snapshot = Snapshot {
        last_update: chrono::Utc::now().timestamp_millis(),
        last_scanned_block: Some(state.scan_progress_height().to_string()),
        transactions,
    };

    let json = serde_json::to_string_pretty(&snapshot)?;
    fs::write(file_path, json)?;

    log::debug!(
        "Saved {} transactions to {} (checkpoint {})",
        snapshot.transactions.len(),
        file_path,
        state.scan_progress_height()
    );
    Ok(())
}

/// Read the snapshot file, if one exists
///
/// A missing file is a cold start, not an error.
pub fn load_snapshot(file_path: &str) -> Result<Option<Snapshot>, Box<dyn std::error::Error>> {
    if !Path::new(file_path).exists() {
        log::info!("No existing snapshot file found: {}", file_path);
        return Ok(None);
    }

    let json = fs::read_to_string(file_path)?;
    let snapshot: Snapshot = serde_json::from_str(&json)?;

    log::info!(
        "Loaded {} transactions from {}",
        snapshot.transactions.len(),
        file_path
    );
    Ok(Some(snapshot))
}

/// Hydrate engine state from a loaded snapshot
///
/// Replays every stored record through the dedup gate and adopts the saved
/// checkpoint only when it is ahead of the configured genesis floor.
/// Returns the number of records accepted.
pub fn hydrate(state: &mut EngineState, snapshot: Snapshot) -> usize {
    let mut loaded = 0;
    for record in snapshot.transactions {
        if state.record_transaction(record) {
            loaded += 1;
        }
    }

    if let Some(saved) = snapshot
        .last_scanned_block
        .as_deref()
        .and_then(|s| s.parse::<u64>().ok())
    {
        state.restore_scan_progress(saved);
    }

    log::info!(
        "📂 Snapshot hydrated: {} transactions | checkpoint {}",
        loaded,
        state.scan_progress_height()
    );
    loaded
}
