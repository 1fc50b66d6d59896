//! Round ledger — bounded newest-first history with running tallies.
//!
//! Tallies are lifetime totals: evicting the oldest entry does not
//! decrement them, so once the cap is reached the per-outcome counts can
//! exceed the retained length.

use serde::Serialize;
use std::collections::VecDeque;
use tracing::debug;

use crate::types::{Outcome, Round};

/// Default maximum number of retained entries.
pub const DEFAULT_HISTORY_LIMIT: usize = 500;
/// Number of entries shown by the history view.
pub const DISPLAY_LIMIT: usize = 100;

/// Per-outcome tallies of the casino result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub banker: u64,
    pub player: u64,
    pub tie: u64,
}

impl OutcomeCounts {
    pub fn get(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::Banker => self.banker,
            Outcome::Player => self.player,
            Outcome::Tie => self.tie,
        }
    }

    fn increment(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Banker => self.banker += 1,
            Outcome::Player => self.player += 1,
            Outcome::Tie => self.tie += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.banker + self.player + self.tie
    }
}

/// Aggregate counters for display.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerStats {
    pub rounds: usize,
    pub counts: OutcomeCounts,
    pub matches: u64,
}

#[derive(Debug, Clone)]
pub struct Ledger {
    rounds: VecDeque<Round>,
    counts: OutcomeCounts,
    matches: u64,
    limit: usize,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl Ledger {
    /// A zero limit falls back to the default cap.
    pub fn new(limit: usize) -> Self {
        let limit = if limit == 0 { DEFAULT_HISTORY_LIMIT } else { limit };
        Self {
            rounds: VecDeque::with_capacity(limit.min(1024) + 1),
            counts: OutcomeCounts::default(),
            matches: 0,
            limit,
        }
    }

    /// Record an observed round at the front and update the tallies.
    pub fn append(&mut self, casino: Outcome, mine: Outcome, note: Option<String>) -> &Round {
        let round = Round::new(casino, mine, note);
        self.counts.increment(casino);
        if round.is_match() {
            self.matches += 1;
        }
        self.push_front(round)
    }

    /// Record an engine log line. Tallies are untouched.
    pub fn append_log(&mut self, note: impl Into<String>) -> &Round {
        self.push_front(Round::log(note))
    }

    fn push_front(&mut self, round: Round) -> &Round {
        self.rounds.push_front(round);
        if self.rounds.len() > self.limit {
            if let Some(evicted) = self.rounds.pop_back() {
                debug!(
                    casino = %evicted.casino,
                    timestamp = %evicted.timestamp,
                    "Evicted oldest ledger entry"
                );
            }
        }
        &self.rounds[0]
    }

    /// Empty the history and reset all tallies.
    pub fn clear(&mut self) {
        self.rounds.clear();
        self.counts = OutcomeCounts::default();
        self.matches = 0;
    }

    /// The newest `limit` entries, newest first.
    pub fn snapshot(&self, limit: usize) -> Vec<Round> {
        self.rounds.iter().take(limit).cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Round> {
        self.rounds.iter()
    }

    pub fn latest(&self) -> Option<&Round> {
        self.rounds.front()
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn counts(&self) -> OutcomeCounts {
        self.counts
    }

    pub fn matches(&self) -> u64 {
        self.matches
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            rounds: self.rounds.len(),
            counts: self.counts,
            matches: self.matches,
        }
    }
}
