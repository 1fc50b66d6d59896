//! Simulated auto-bet state machine.
//!
//! INACTIVE → ACTIVE → TRIPPED(reason) → INACTIVE. Each settle moves the
//! bankroll by one flat stake, then checks the cut-offs in order:
//! bankroll exhausted, stop-loss streak, take-profit delta. The first one
//! that holds trips the machine; later checks are skipped.

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use crate::config::BetParams;
use crate::types::Outcome;

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

/// Why an active session was cut off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TripReason {
    BankrollExhausted,
    StopLoss,
    TakeProfit,
}

impl fmt::Display for TripReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripReason::BankrollExhausted => write!(f, "bankroll exhausted"),
            TripReason::StopLoss => write!(f, "stop-loss"),
            TripReason::TakeProfit => write!(f, "take-profit"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BetStatus {
    Inactive,
    Active,
    /// Stopped automatically; behaves as inactive until cleared.
    Tripped(TripReason),
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetStatus::Inactive => write!(f, "OFF"),
            BetStatus::Active => write!(f, "ON"),
            BetStatus::Tripped(reason) => write!(f, "OFF ({reason})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Settlement
// ---------------------------------------------------------------------------

/// Result of settling one round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settlement {
    pub predicted: Outcome,
    pub actual: Outcome,
    pub won: bool,
    pub stake: Decimal,
    pub bankroll_after: Decimal,
    pub loss_streak: u32,
    pub trip: Option<TripReason>,
    /// Ledger note describing the trip, if any.
    pub trip_note: Option<String>,
}

/// Read-only view of the betting state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BettingSnapshot {
    pub status: BetStatus,
    pub active: bool,
    pub bankroll: Decimal,
    pub stake: Decimal,
    pub stop_loss_streak: u32,
    pub take_profit_delta: Decimal,
    pub loss_streak: u32,
    pub profit_baseline: Decimal,
    pub session_pnl: Decimal,
    pub wins: u64,
    pub losses: u64,
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AutoBet {
    status: BetStatus,
    bankroll: Decimal,
    stake: Decimal,
    stop_loss_streak: u32,
    take_profit_delta: Decimal,
    loss_streak: u32,
    profit_baseline: Decimal,
    wins: u64,
    losses: u64,
}

impl AutoBet {
    /// An inactive machine primed with the given parameters.
    pub fn new(params: BetParams) -> Self {
        Self {
            status: BetStatus::Inactive,
            bankroll: params.bankroll,
            stake: params.stake,
            stop_loss_streak: params.stop_loss_streak,
            take_profit_delta: params.take_profit_delta,
            loss_streak: 0,
            profit_baseline: params.bankroll,
            wins: 0,
            losses: 0,
        }
    }

    /// Arm the machine. Re-activating an active machine restarts the
    /// session with the new parameters.
    pub fn activate(&mut self, params: BetParams) {
        if self.is_active() {
            info!("AutoBet re-armed; restarting session");
        }
        self.bankroll = params.bankroll;
        self.stake = params.stake;
        self.stop_loss_streak = params.stop_loss_streak;
        self.take_profit_delta = params.take_profit_delta;
        self.loss_streak = 0;
        self.profit_baseline = params.bankroll;
        self.wins = 0;
        self.losses = 0;
        self.status = BetStatus::Active;

        info!(
            bankroll = %self.bankroll,
            stake = %self.stake,
            stop_loss = self.stop_loss_streak,
            take_profit = %self.take_profit_delta,
            "AutoBet activated"
        );
    }

    /// Manual stop. Idempotent.
    pub fn deactivate(&mut self) {
        if self.status != BetStatus::Inactive {
            info!(bankroll = %self.bankroll, status = %self.status, "AutoBet deactivated");
        }
        self.status = BetStatus::Inactive;
    }

    /// Settle one round. Returns `None` unless the machine is active.
    pub fn settle(&mut self, predicted: Outcome, actual: Outcome) -> Option<Settlement> {
        if !self.is_active() {
            return None;
        }

        let won = predicted == actual;
        if won {
            self.bankroll += self.stake;
            self.loss_streak = 0;
            self.wins += 1;
        } else {
            self.bankroll -= self.stake;
            self.loss_streak += 1;
            self.losses += 1;
        }

        let gain = self.bankroll - self.profit_baseline;
        let trip = if self.bankroll <= Decimal::ZERO {
            Some(TripReason::BankrollExhausted)
        } else if self.loss_streak >= self.stop_loss_streak {
            Some(TripReason::StopLoss)
        } else if gain >= self.take_profit_delta {
            Some(TripReason::TakeProfit)
        } else {
            None
        };

        let trip_note = trip.map(|reason| {
            self.status = BetStatus::Tripped(reason);
            let note = match reason {
                TripReason::BankrollExhausted => {
                    format!("AutoBet stopped: bankroll exhausted ({})", self.bankroll)
                }
                TripReason::StopLoss => {
                    format!("AutoBet stopped by stopLoss ({})", self.loss_streak)
                }
                TripReason::TakeProfit => format!("AutoBet: take profit reached (+{gain})"),
            };
            warn!(reason = %reason, bankroll = %self.bankroll, "{note}");
            note
        });

        Some(Settlement {
            predicted,
            actual,
            won,
            stake: self.stake,
            bankroll_after: self.bankroll,
            loss_streak: self.loss_streak,
            trip,
            trip_note,
        })
    }

    /// Edit the bankroll while not betting. Ignored while active.
    pub fn set_bankroll(&mut self, bankroll: Decimal) -> bool {
        if self.is_active() {
            return false;
        }
        self.bankroll = bankroll;
        true
    }

    pub fn is_active(&self) -> bool {
        self.status == BetStatus::Active
    }

    pub fn status(&self) -> BetStatus {
        self.status
    }

    pub fn bankroll(&self) -> Decimal {
        self.bankroll
    }

    pub fn loss_streak(&self) -> u32 {
        self.loss_streak
    }

    pub fn snapshot(&self) -> BettingSnapshot {
        BettingSnapshot {
            status: self.status,
            active: self.is_active(),
            bankroll: self.bankroll,
            stake: self.stake,
            stop_loss_streak: self.stop_loss_streak,
            take_profit_delta: self.take_profit_delta,
            loss_streak: self.loss_streak,
            profit_baseline: self.profit_baseline,
            session_pnl: self.bankroll - self.profit_baseline,
            wins: self.wins,
            losses: self.losses,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
