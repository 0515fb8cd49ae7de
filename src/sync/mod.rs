//! Smart sync engine
//!
//! Two-phase checkpointed scan of the ledger: bulk backfill with concurrent
//! windowed fetching, then near-real-time tailing. Progress is durable via
//! the snapshot file and resumes across restarts.

pub mod engine;
pub mod fetcher;
