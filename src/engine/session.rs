//! Session — the single owner of ledger, generators and betting state.
//!
//! All mutation goes through `&mut Session`. Concurrent producers (timer
//! ticks, HTTP handlers, image imports) share it as a `SharedSession` and
//! hold the lock for the whole of each mutation, so cycles and imports
//! are linearised.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{AppConfig, BetOverrides, BetParams};
use crate::engine::ledger::{Ledger, LedgerStats};
use crate::engine::sequence::SequenceGenerator;
use crate::storage;
use crate::strategy::autobet::{AutoBet, BettingSnapshot, Settlement};
use crate::strategy::trend::TrendPredictor;
use crate::strategy::Predictor;
use crate::types::{BacBoError, Outcome, PredictionSignal, Round};
use crate::vision::color::ColorReading;
use crate::vision::{self, ImageDecoder};

pub type SharedSession = Arc<Mutex<Session>>;

/// Note attached to rounds recorded from a screenshot.
pub const IMPORT_NOTE: &str = "Image import";

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Summary of one sample → append → predict → settle cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub cycle_number: u64,
    pub casino: Outcome,
    pub mine: Outcome,
    pub signal: PredictionSignal,
    pub settlement: Option<Settlement>,
    pub bankroll: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Everything a front-end needs to draw the session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub cycles: u64,
    pub seed: Option<u32>,
    pub latest: Option<Round>,
    pub signal: Option<PredictionSignal>,
    pub stats: LedgerStats,
    pub betting: BettingSnapshot,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct Session {
    id: Uuid,
    config: AppConfig,
    seed_text: Option<String>,
    casino_rng: SequenceGenerator,
    observer_rng: SequenceGenerator,
    ledger: Ledger,
    predictor: Box<dyn Predictor>,
    autobet: AutoBet,
    overrides: BetOverrides,
    last_signal: Option<PredictionSignal>,
    cycle_count: u64,
}

impl Session {
    pub fn new(config: AppConfig) -> Self {
        Self::with_predictor(config, Box::new(TrendPredictor::default()))
    }

    pub fn with_predictor(config: AppConfig, predictor: Box<dyn Predictor>) -> Self {
        let seed_text = config.seed_text().map(str::to_string);
        let casino_rng = SequenceGenerator::from_seed_text(seed_text.as_deref());
        let session = Self {
            id: Uuid::new_v4(),
            ledger: Ledger::new(config.history_limit),
            autobet: AutoBet::new(config.bet_defaults()),
            seed_text,
            casino_rng,
            observer_rng: SequenceGenerator::entropy(),
            predictor,
            overrides: BetOverrides::default(),
            last_signal: None,
            cycle_count: 0,
            config,
        };
        info!(
            session_id = %session.id,
            seed = ?session.casino_rng.seed(),
            history_limit = session.ledger.limit(),
            predictor = session.predictor.name(),
            "Session created"
        );
        session
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// Change the casino seed. The generator is only rebuilt when the text
    /// actually changes; the new stream is used from the next cycle.
    pub fn set_seed(&mut self, text: Option<&str>) -> Option<u32> {
        let text = text.map(str::trim).filter(|s| !s.is_empty());
        if text == self.seed_text.as_deref() {
            return self.casino_rng.seed();
        }
        self.seed_text = text.map(str::to_string);
        self.casino_rng = SequenceGenerator::from_seed_text(text);
        info!(
            session_id = %self.id,
            seed = ?self.casino_rng.seed(),
            "Casino sequence re-seeded"
        );
        self.casino_rng.seed()
    }

    /// Run one full cycle: draw both outcomes, record the round, refresh
    /// the signal, and settle the auto-bet if it is armed.
    pub fn run_cycle(&mut self) -> CycleReport {
        let casino = self.casino_rng.next_outcome();
        let mine = self.observer_rng.next_outcome();
        self.ledger.append(casino, mine, None);

        let signal = self.predictor.predict(&self.ledger);
        self.last_signal = Some(signal.clone());

        let settlement = self.autobet.settle(signal.outcome, casino);
        if let Some(note) = settlement.as_ref().and_then(|s| s.trip_note.clone()) {
            self.ledger.append_log(note);
        }

        self.cycle_count += 1;
        let report = CycleReport {
            cycle_number: self.cycle_count,
            casino,
            mine,
            signal,
            settlement,
            bankroll: self.autobet.bankroll(),
            timestamp: Utc::now(),
        };

        info!(
            cycle = report.cycle_number,
            casino = %casino,
            mine = %mine,
            signal = %report.signal.outcome,
            strength = %report.signal.strength,
            won = ?report.settlement.as_ref().map(|s| s.won),
            bankroll = %report.bankroll,
            "Cycle complete"
        );
        report
    }

    /// Record a classified screenshot. Undetermined colours are rejected
    /// without touching the ledger.
    pub fn record_import(&mut self, reading: &ColorReading) -> Result<Outcome, BacBoError> {
        let outcome = reading.outcome.ok_or_else(|| BacBoError::UndeterminedColor {
            label: reading.label.clone(),
            hue: reading.hsv.h,
            saturation: reading.hsv.s,
            value: reading.hsv.v,
        })?;
        self.ledger
            .append(outcome, outcome, Some(IMPORT_NOTE.to_string()));
        self.ledger
            .append_log(format!("Image detected: {}", reading.label));
        info!(session_id = %self.id, outcome = %outcome, "Round imported from image");
        Ok(outcome)
    }

    /// Empty the ledger and forget the current signal.
    pub fn clear(&mut self) {
        self.ledger.clear();
        self.last_signal = None;
        info!(session_id = %self.id, "History cleared");
    }

    /// Arm the auto-bet. `call` wins over session overrides, which win
    /// over configuration defaults.
    pub fn start_auto_bet(&mut self, call: BetOverrides) -> BetParams {
        let params = BetParams::resolve(call, self.overrides, self.config.bet_defaults());
        self.autobet.activate(params);
        params
    }

    pub fn stop_auto_bet(&mut self) {
        self.autobet.deactivate();
    }

    /// Store session-level parameter overrides. A bankroll override is
    /// also applied to the idle bankroll immediately.
    pub fn set_overrides(&mut self, overrides: BetOverrides) {
        self.overrides = overrides.or(self.overrides);
        if let Some(bankroll) = overrides.bankroll {
            if !self.autobet.set_bankroll(bankroll) {
                warn!(bankroll = %bankroll, "Bankroll override deferred until auto-bet stops");
            }
        }
    }

    pub fn export_text(&self) -> String {
        storage::export_text(self.ledger.iter())
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            session_id: self.id.to_string(),
            cycles: self.cycle_count,
            seed: self.casino_rng.seed(),
            latest: self.ledger.latest().cloned(),
            signal: self.last_signal.clone(),
            stats: self.ledger.stats(),
            betting: self.autobet.snapshot(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn autobet(&self) -> &AutoBet {
        &self.autobet
    }

    pub fn last_signal(&self) -> Option<&PredictionSignal> {
        self.last_signal.as_ref()
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn seed(&self) -> Option<u32> {
        self.casino_rng.seed()
    }
}

/// Decode and classify a screenshot, then record it.
///
/// Decoding runs without holding the session lock; only the final append
/// is serialised with the cycle loop.
pub async fn import_image(
    session: &SharedSession,
    decoder: &dyn ImageDecoder,
    bytes: &[u8],
) -> Result<ColorReading, BacBoError> {
    let reading = match vision::analyze_image(decoder, bytes).await {
        Ok(reading) => reading,
        Err(e) => {
            warn!(error = %e, "Image import failed");
            return Err(e);
        }
    };

    let mut guard = session.lock().await;
    if let Err(e) = guard.record_import(&reading) {
        warn!(error = %e, "Image import rejected");
        return Err(e);
    }
    Ok(reading)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
