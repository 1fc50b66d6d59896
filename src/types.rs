//! Shared types for the BACBO engine.
//!
//! These types form the data model used across all modules: outcomes,
//! ledger rounds, prediction signals and the domain error enum.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of a single Bac Bo round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Banker,
    Player,
    Tie,
}

impl Outcome {
    /// All outcomes in tie-break order.
    pub const ALL: [Outcome; 3] = [Outcome::Banker, Outcome::Player, Outcome::Tie];

    /// Single-letter code used by the export format.
    pub fn code(&self) -> char {
        match self {
            Outcome::Banker => 'B',
            Outcome::Player => 'P',
            Outcome::Tie => 'T',
        }
    }

    /// Upper-case display label.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Banker => "BANKER",
            Outcome::Player => "PLAYER",
            Outcome::Tie => "TIE",
        }
    }

    /// Table colour associated with the outcome.
    pub fn colour(&self) -> &'static str {
        match self {
            Outcome::Banker => "red",
            Outcome::Player => "blue",
            Outcome::Tie => "yellow",
        }
    }

    /// Position in `Outcome::ALL`.
    pub fn index(&self) -> usize {
        match self {
            Outcome::Banker => 0,
            Outcome::Player => 1,
            Outcome::Tie => 2,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Parse a code or label (case-insensitive).
impl std::str::FromStr for Outcome {
    type Err = BacBoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "b" | "banker" => Ok(Outcome::Banker),
            "p" | "player" => Ok(Outcome::Player),
            "t" | "tie" => Ok(Outcome::Tie),
            _ => Err(BacBoError::UnknownOutcome(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Round
// ---------------------------------------------------------------------------

/// Whether a ledger entry is an observed round or an engine log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundKind {
    Observed,
    Log,
}

/// One ledger entry: the house result paired with the observer's own draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub casino: Outcome,
    pub mine: Outcome,
    /// Local time of day, `HH:MM:SS`.
    pub timestamp: String,
    pub note: Option<String>,
    pub kind: RoundKind,
}

impl Round {
    pub fn new(casino: Outcome, mine: Outcome, note: Option<String>) -> Self {
        Self {
            casino,
            mine,
            timestamp: time_of_day(),
            note,
            kind: RoundKind::Observed,
        }
    }

    /// A log line stored in the ledger (TIE/TIE with a note).
    pub fn log(note: impl Into<String>) -> Self {
        Self {
            casino: Outcome::Tie,
            mine: Outcome::Tie,
            timestamp: time_of_day(),
            note: Some(note.into()),
            kind: RoundKind::Log,
        }
    }

    pub fn is_match(&self) -> bool {
        self.casino == self.mine
    }

    pub fn is_log(&self) -> bool {
        self.kind == RoundKind::Log
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {} [{}]", self.casino, self.mine, self.timestamp)?;
        if let Some(note) = &self.note {
            write!(f, " · {note}")?;
        }
        Ok(())
    }
}

fn time_of_day() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

// ---------------------------------------------------------------------------
// Prediction signal
// ---------------------------------------------------------------------------

/// Confidence tier of a trend signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalStrength {
    Weak,
    Medium,
    Strong,
}

impl SignalStrength {
    /// Qualitative probability wording used in signal messages.
    pub fn likelihood(&self) -> &'static str {
        match self {
            SignalStrength::Weak => "low",
            SignalStrength::Medium => "medium",
            SignalStrength::Strong => "high",
        }
    }
}

impl fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalStrength::Weak => write!(f, "WEAK"),
            SignalStrength::Medium => write!(f, "MEDIUM"),
            SignalStrength::Strong => write!(f, "STRONG"),
        }
    }
}

/// Output of the predictor for the current cycle. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSignal {
    pub outcome: Outcome,
    pub strength: SignalStrength,
    pub message: String,
}

impl PredictionSignal {
    pub fn new(outcome: Outcome, strength: SignalStrength) -> Self {
        let headline = match strength {
            SignalStrength::Strong => "Strong signal",
            _ => "Signal",
        };
        let message = format!(
            "{headline}: {}. Probability: {}",
            outcome.label(),
            strength.likelihood()
        );
        Self {
            outcome,
            strength,
            message,
        }
    }
}

impl fmt::Display for PredictionSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.strength, self.message)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for BACBO.
#[derive(Debug, thiserror::Error)]
pub enum BacBoError {
    #[error("Image decode failed: {0}")]
    ImageDecode(String),

    #[error("Undetermined colour ({label}, h={hue} s={saturation} v={value}); crop the round area and retry")]
    UndeterminedColor {
        label: String,
        hue: u16,
        saturation: u8,
        value: u8,
    },

    #[error("Unknown outcome: {0}")]
    UnknownOutcome(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
