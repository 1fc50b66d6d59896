//! Strategy engine — trend prediction and the simulated auto-bet machine.

pub mod autobet;
pub mod trend;

use crate::engine::ledger::Ledger;
use crate::types::PredictionSignal;

/// Abstraction over signal generators.
///
/// Implementors read the ledger and always produce a signal, even when
/// the ledger is empty.
pub trait Predictor: Send + Sync {
    fn predict(&self, ledger: &Ledger) -> PredictionSignal;

    /// Identifier for logging.
    fn name(&self) -> &str;
}
