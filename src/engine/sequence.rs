//! Deterministic sequence generator and outcome sampler.
//!
//! A seeded generator replays the same float stream for the same seed;
//! without a seed the stream comes from OS entropy. The sampler maps one
//! float onto the house-biased outcome partition.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::Outcome;

/// Upper bound (exclusive) of the BANKER band.
pub const BANKER_CUTOFF: f64 = 0.485;
/// Upper bound (exclusive) of the PLAYER band; the rest is TIE.
pub const PLAYER_CUTOFF: f64 = 0.97;

// ---------------------------------------------------------------------------
// Mulberry32
// ---------------------------------------------------------------------------

/// 32-bit Mulberry PRNG. Small state, reproducible across platforms.
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next float in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }
}

// ---------------------------------------------------------------------------
// Seed derivation
// ---------------------------------------------------------------------------

/// Derive an integer seed from user text.
///
/// A leading (optionally signed) integer is used directly, wrapped to 32
/// bits. Anything else becomes the sum of its UTF-16 code units, masked to
/// 32 bits. Blank text yields `None` (non-reproducible mode).
pub fn derive_seed(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    // "0" parses to seed 0 and is kept; it does not fall back to the
    // code-unit sum (which would be 48).
    Some(parse_leading_int(text).unwrap_or_else(|| {
        text.encode_utf16()
            .fold(0u32, |acc, unit| acc.wrapping_add(u32::from(unit)))
    }))
}

fn parse_leading_int(text: &str) -> Option<u32> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits: &str = {
        let end = digits
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits.len());
        &digits[..end]
    };
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits.bytes().fold(0u32, |acc, d| {
        acc.wrapping_mul(10).wrapping_add(u32::from(d - b'0'))
    });
    Some(if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    })
}

// ---------------------------------------------------------------------------
// Sequence generator
// ---------------------------------------------------------------------------

/// Infinite float stream in [0, 1); restartable only by re-seeding.
#[derive(Debug)]
pub enum SequenceGenerator {
    Seeded { seed: u32, rng: Mulberry32 },
    Entropy(StdRng),
}

impl SequenceGenerator {
    pub fn seeded(seed: u32) -> Self {
        SequenceGenerator::Seeded {
            seed,
            rng: Mulberry32::new(seed),
        }
    }

    pub fn entropy() -> Self {
        SequenceGenerator::Entropy(StdRng::from_entropy())
    }

    /// Build from optional seed text. Never fails.
    pub fn from_seed_text(text: Option<&str>) -> Self {
        match text.and_then(derive_seed) {
            Some(seed) => Self::seeded(seed),
            None => Self::entropy(),
        }
    }

    /// The integer seed, if reproducible.
    pub fn seed(&self) -> Option<u32> {
        match self {
            SequenceGenerator::Seeded { seed, .. } => Some(*seed),
            SequenceGenerator::Entropy(_) => None,
        }
    }

    pub fn next_f64(&mut self) -> f64 {
        match self {
            SequenceGenerator::Seeded { rng, .. } => rng.next_f64(),
            SequenceGenerator::Entropy(rng) => rng.gen::<f64>(),
        }
    }

    /// Draw one outcome.
    pub fn next_outcome(&mut self) -> Outcome {
        sample(self.next_f64())
    }
}

/// Map a uniform float onto the biased outcome partition.
pub fn sample(r: f64) -> Outcome {
    if r < BANKER_CUTOFF {
        Outcome::Banker
    } else if r < PLAYER_CUTOFF {
        Outcome::Player
    } else {
        Outcome::Tie
    }
}
