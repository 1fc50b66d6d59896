//! Sliding-window trend predictor.
//!
//! Tallies the casino outcome over the newest rounds, picks the leader
//! (ties broken BANKER, PLAYER, TIE) and grades it by its share of the
//! window. Weak signals always fall back to BANKER.

use tracing::debug;

use super::Predictor;
use crate::engine::ledger::Ledger;
use crate::types::{Outcome, PredictionSignal, SignalStrength};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TrendConfig {
    /// Number of newest rounds inspected.
    pub window: usize,
    /// Minimum leader share for STRONG.
    pub strong_fraction: f64,
    /// Minimum leader share for MEDIUM.
    pub medium_fraction: f64,
    /// Global banker bias above which a WEAK signal is forced to BANKER.
    pub bias_threshold: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            window: 15,
            strong_fraction: 0.65,
            medium_fraction: 0.50,
            bias_threshold: 1.02,
        }
    }
}

// ---------------------------------------------------------------------------
// Predictor
// ---------------------------------------------------------------------------

pub struct TrendPredictor {
    config: TrendConfig,
}

impl Default for TrendPredictor {
    fn default() -> Self {
        Self::new(TrendConfig::default())
    }
}

impl TrendPredictor {
    pub fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrendConfig {
        &self.config
    }

    /// `(banker + 1) / (banker + player + 1)` over the lifetime tallies.
    pub fn global_bias(ledger: &Ledger) -> f64 {
        let counts = ledger.counts();
        (counts.banker as f64 + 1.0) / ((counts.banker + counts.player) as f64 + 1.0)
    }

    /// Leader of the window and its count. Only a strictly greater tally
    /// replaces the current leader.
    fn leader(tally: &[usize; 3]) -> (Outcome, usize) {
        let mut best = (Outcome::Banker, tally[0]);
        for outcome in &Outcome::ALL[1..] {
            let count = tally[outcome.index()];
            if count > best.1 {
                best = (*outcome, count);
            }
        }
        best
    }
}

impl Predictor for TrendPredictor {
    fn predict(&self, ledger: &Ledger) -> PredictionSignal {
        let window = self.config.window.min(ledger.len());
        let mut tally = [0usize; 3];
        for round in ledger.iter().take(window) {
            tally[round.casino.index()] += 1;
        }

        let (mut outcome, strength) = if window == 0 {
            (Outcome::Banker, SignalStrength::Weak)
        } else {
            let (leader, count) = Self::leader(&tally);
            let frac = count as f64 / window as f64;
            if frac >= self.config.strong_fraction {
                (leader, SignalStrength::Strong)
            } else if frac >= self.config.medium_fraction {
                (leader, SignalStrength::Medium)
            } else {
                (Outcome::Banker, SignalStrength::Weak)
            }
        };

        // Redundant with the WEAK fallback above under current thresholds.
        let bias = Self::global_bias(ledger);
        if strength == SignalStrength::Weak && bias > self.config.bias_threshold {
            outcome = Outcome::Banker;
        }

        debug!(
            window,
            banker = tally[0],
            player = tally[1],
            tie = tally[2],
            global_bias = format!("{bias:.3}"),
            outcome = %outcome,
            strength = %strength,
            "Trend evaluated"
        );

        PredictionSignal::new(outcome, strength)
    }

    fn name(&self) -> &str {
        "trend"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a ledger whose newest entries are `newest` (index 0 = newest).
    fn ledger_with(newest: &[Outcome]) -> Ledger {
        let mut ledger = Ledger::new(500);
        for o in newest.iter().rev() {
            ledger.append(*o, Outcome::Banker, None);
        }
        ledger
    }

    fn repeat(outcome: Outcome, n: usize) -> Vec<Outcome> {
        vec![outcome; n]
    }

    #[test]
    fn test_empty_ledger_is_weak_banker() {
        let signal = TrendPredictor::default().predict(&Ledger::default());
        assert_eq!(signal.outcome, Outcome::Banker);
        assert_eq!(signal.strength, SignalStrength::Weak);
    }

    #[test]
    fn test_strong_banker() {
        let mut rounds = repeat(Outcome::Banker, 10);
        rounds.extend(repeat(Outcome::Player, 5));
        let signal = TrendPredictor::default().predict(&ledger_with(&rounds));
        assert_eq!(signal.outcome, Outcome::Banker);
        assert_eq!(signal.strength, SignalStrength::Strong);
    }

    #[test]
    fn test_medium_banker() {
        let mut rounds = repeat(Outcome::Banker, 8);
        rounds.extend(repeat(Outcome::Player, 7));
        let signal = TrendPredictor::default().predict(&ledger_with(&rounds));
        assert_eq!(signal.outcome, Outcome::Banker);
        assert_eq!(signal.strength, SignalStrength::Medium);
    }

    #[test]
    fn test_strong_player() {
        let mut rounds = repeat(Outcome::Player, 12);
        rounds.extend(repeat(Outcome::Banker, 3));
        let signal = TrendPredictor::default().predict(&ledger_with(&rounds));
        assert_eq!(signal.outcome, Outcome::Player);
        assert_eq!(signal.strength, SignalStrength::Strong);
        assert!(signal.message.contains("PLAYER"));
    }

    #[test]
    fn test_weak_forces_banker() {
        // PLAYER leads 7/15 (< 50%) → WEAK and BANKER regardless.
        let mut rounds = repeat(Outcome::Player, 7);
        rounds.extend(repeat(Outcome::Banker, 6));
        rounds.extend(repeat(Outcome::Tie, 2));
        let signal = TrendPredictor::default().predict(&ledger_with(&rounds));
        assert_eq!(signal.outcome, Outcome::Banker);
        assert_eq!(signal.strength, SignalStrength::Weak);
    }

    #[test]
    fn test_tie_break_prefers_banker() {
        // 2 BANKER / 2 PLAYER: first-seen maximum (BANKER) wins, 50% → MEDIUM.
        let rounds = [Outcome::Player, Outcome::Banker, Outcome::Player, Outcome::Banker];
        let signal = TrendPredictor::default().predict(&ledger_with(&rounds));
        assert_eq!(signal.outcome, Outcome::Banker);
        assert_eq!(signal.strength, SignalStrength::Medium);
    }

    #[test]
    fn test_tie_break_player_over_tie() {
        let rounds = [Outcome::Tie, Outcome::Player, Outcome::Tie, Outcome::Player];
        let signal = TrendPredictor::default().predict(&ledger_with(&rounds));
        assert_eq!(signal.outcome, Outcome::Player);
        assert_eq!(signal.strength, SignalStrength::Medium);
    }

    #[test]
    fn test_window_only_uses_newest_fifteen() {
        // 15 newest PLAYER, 30 older BANKER.
        let mut rounds = repeat(Outcome::Player, 15);
        rounds.extend(repeat(Outcome::Banker, 30));
        let signal = TrendPredictor::default().predict(&ledger_with(&rounds));
        assert_eq!(signal.outcome, Outcome::Player);
        assert_eq!(signal.strength, SignalStrength::Strong);
    }

    #[test]
    fn test_short_window() {
        let signal = TrendPredictor::default().predict(&ledger_with(&[Outcome::Tie]));
        assert_eq!(signal.outcome, Outcome::Tie);
        assert_eq!(signal.strength, SignalStrength::Strong);
    }

    #[test]
    fn test_global_bias_value() {
        let mut rounds = repeat(Outcome::Banker, 3);
        rounds.extend(repeat(Outcome::Player, 1));
        let ledger = ledger_with(&rounds);
        assert!((TrendPredictor::global_bias(&ledger) - 0.8).abs() < 1e-12);
        assert!((TrendPredictor::global_bias(&Ledger::default()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_global_bias_override_has_no_observable_effect() {
        // Bias > 1.02 is unreachable (banker + 1 <= banker + player + 1), and
        // WEAK already yields BANKER. Lowering the threshold changes nothing.
        let eager = TrendPredictor::new(TrendConfig {
            bias_threshold: 0.0,
            ..TrendConfig::default()
        });
        let mut rounds = repeat(Outcome::Player, 7);
        rounds.extend(repeat(Outcome::Tie, 5));
        rounds.extend(repeat(Outcome::Banker, 3));
        let ledger = ledger_with(&rounds);
        assert_eq!(eager.predict(&ledger).strength, SignalStrength::Weak);
        assert_eq!(
            eager.predict(&ledger),
            TrendPredictor::default().predict(&ledger)
        );
        assert!(TrendPredictor::global_bias(&ledger) <= 1.02);
    }
}
