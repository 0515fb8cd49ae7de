
pub mod aggregator;
pub mod config;
pub mod error;
pub mod ledger;
pub mod parser;
pub mod persistence;
pub mod state;
pub mod sync;

use {
    aggregator::build_leaderboard,
    config::Config,
    dotenv::dotenv,
    ledger::HttpLedgerClient,
    log::{error, info},
    state::EngineState,
    std::sync::Arc,
    sync::engine::SyncEngine,
    tokio::sync::RwLock,
};

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();

    info!("🚀 EDS Swap Monitor");
    info!("   ├─ RPC: {}", config.rpc_node_url);
    info!("   ├─ Contract: {}", config.swap_contract_addr);
    info!("   ├─ Token: {}", config.tracked_token_id);
    info!("   ├─ Genesis floor: {}", config.genesis_start_height);
    info!("   └─ Snapshot: {}", config.snapshot_path);

    // Hydrate state from the last snapshot; a broken file means a cold start,
    // not a dead process
    let mut engine_state = EngineState::new(config.genesis_start_height);
    match persistence::load_snapshot(&config.snapshot_path) {
        Ok(Some(snapshot)) => {
            persistence::hydrate(&mut engine_state, snapshot);
        }
        Ok(None) => {
            info!("Cold start from genesis height {}", config.genesis_start_height);
        }
        Err(e) => {
            error!("❌ Failed to read snapshot, starting cold: {}", e);
        }
    }
    let shared_state = Arc::new(RwLock::new(engine_state));

    let client = Arc::new(HttpLedgerClient::new(&config.rpc_node_url)?);
    let engine = SyncEngine::new(client, shared_state.clone(), config.clone());

    // Sync task: backfill once, then tail until shutdown
    let sync_handle = tokio::spawn(async move {
        if let Err(e) = engine.run().await {
            error!("❌ Sync aborted: {}", e);
        }
    });

    // Periodic operator report; the query layer calls build_leaderboard
    // directly for its responses
    let state_for_report = shared_state.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(60));
        ticker.tick().await; // skip the immediate first tick
        loop {
            ticker.tick().await;
            let state = state_for_report.read().await;
            let board = build_leaderboard(&state, None, None);
            info!(
                "📊 Leaderboard: {} traders | {} transactions | height {} | {}",
                board.total_traders,
                board.total_transactions,
                board.block_height,
                board.status
            );
        }
    });

    info!("🔄 Press CTRL+C to shutdown gracefully");

    tokio::select! {
        _ = sync_handle => {
            error!("❌ Sync task exited unexpectedly");
        }
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => info!("⚠️  Received CTRL+C, shutting down..."),
                Err(err) => error!("❌ Failed to listen for CTRL+C: {}", err),
            }
        }
    }

    // Final save so a restart resumes from the freshest checkpoint
    {
        let state = shared_state.read().await;
        if let Err(e) = persistence::save_snapshot(&state, &config.snapshot_path) {
            error!("❌ Final snapshot save failed: {}", e);
        }
    }

    info!("✅ Monitor stopped");
    Ok(())
}
