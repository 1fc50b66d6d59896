//! BACBO — Bac Bo round simulator
//!
//! Entry point. Loads configuration, initialises structured logging,
//! builds the session, and drives the cycle timer until Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};

use bacbo::config::{self, BetOverrides};
use bacbo::dashboard::{self, AppState};
use bacbo::engine::session::Session;
use bacbo::engine::timer::CycleTimer;
use bacbo::storage;
use bacbo::vision::decoder::RasterDecoder;

const BANNER: &str = r#"
 ____             ____
| __ )  __ _  ___| __ )  ___
|  _ \ / _` |/ __|  _ \ / _ \
| |_) | (_| | (__| |_) | (_) |
|____/ \__,_|\___|____/ \___/

  Round simulator · trend signal · auto-bet (simulation only)
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path = std::env::var("BACBO_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let cfg = config::AppConfig::load_or_default(&config_path);

    println!("{BANNER}");
    info!(
        interval_secs = cfg.cycle_interval().as_secs(),
        auto_start = cfg.auto_start,
        seed = ?cfg.seed_text(),
        auto_bet = cfg.auto_bet,
        bankroll = %cfg.bankroll,
        stake = %cfg.stake,
        history_limit = cfg.history_limit,
        "BACBO starting up"
    );

    let mut session = Session::new(cfg.clone());
    if cfg.auto_bet {
        session.start_auto_bet(BetOverrides::default());
    }
    let session = session.into_shared();

    let timer = CycleTimer::new(session.clone(), cfg.cycle_interval()).into_shared();
    if cfg.auto_start {
        timer.lock().await.start();
    }

    if cfg.dashboard.enabled {
        let state = AppState {
            session: session.clone(),
            timer: timer.clone(),
            decoder: Arc::new(RasterDecoder),
        };
        if let Err(e) = dashboard::spawn_dashboard(state, cfg.dashboard.port).await {
            error!(error = %e, "Dashboard disabled");
        }
    }

    info!("Entering main loop. Press Ctrl+C to stop.");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received.");
    timer.lock().await.stop();

    let guard = session.lock().await;
    if let Some(path) = cfg.export_path.as_deref() {
        if let Err(e) = storage::write_export(guard.ledger().iter(), Some(path)) {
            error!(error = %e, "Failed to write export");
        }
    }

    let status = guard.status();
    info!(
        cycles = status.cycles,
        rounds = status.stats.rounds,
        banker = status.stats.counts.banker,
        player = status.stats.counts.player,
        tie = status.stats.counts.tie,
        matches = status.stats.matches,
        bankroll = %status.betting.bankroll,
        "BACBO shut down cleanly."
    );

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bacbo=info"));

    let json_logging = std::env::var("BACBO_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
