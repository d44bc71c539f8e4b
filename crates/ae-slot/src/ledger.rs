//! Balance, bet selection and current win

use serde::{Deserialize, Serialize};

/// Money is held in millionths so repeated debits don't drift
const UNITS_PER_CREDIT: f64 = 1_000_000.0;

fn to_units(amount: f64) -> u64 {
    // Negative and NaN amounts become 0, overflow saturates
    (amount * UNITS_PER_CREDIT).round() as u64
}

fn from_units(units: u64) -> f64 {
    units as f64 / UNITS_PER_CREDIT
}

/// Player funds for one session
///
/// Only the spin orchestrator moves money: it debits on acceptance and
/// credits once all reels have settled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLedger {
    balance_units: u64,
    bet_table: Vec<f64>,
    bet_index: usize,
    win_units: u64,
}

impl SessionLedger {
    /// `bet_index` is clamped into the table; an empty table gets a single
    /// zero bet so the ledger is always usable
    pub fn new(balance: f64, bet_table: Vec<f64>, bet_index: usize) -> Self {
        let bet_table = if bet_table.is_empty() { vec![0.0] } else { bet_table };
        let bet_index = bet_index.min(bet_table.len() - 1);
        Self {
            balance_units: to_units(balance),
            bet_table,
            bet_index,
            win_units: 0,
        }
    }

    pub fn balance(&self) -> f64 {
        from_units(self.balance_units)
    }

    pub fn bet(&self) -> f64 {
        self.bet_table[self.bet_index]
    }

    pub fn bet_index(&self) -> usize {
        self.bet_index
    }

    pub fn bet_table(&self) -> &[f64] {
        &self.bet_table
    }

    pub fn current_win(&self) -> f64 {
        from_units(self.win_units)
    }

    /// Whether the current bet can be paid (a bet equal to the balance is fine)
    pub fn can_cover(&self) -> bool {
        to_units(self.bet()) <= self.balance_units
    }

    /// Take the bet and clear the previous win; returns the amount taken
    pub(crate) fn debit_bet(&mut self) -> f64 {
        let bet = self.bet();
        self.balance_units = self.balance_units.saturating_sub(to_units(bet));
        self.win_units = 0;
        bet
    }

    pub(crate) fn credit_win(&mut self, amount: f64) {
        let units = to_units(amount);
        self.balance_units = self.balance_units.saturating_add(units);
        self.win_units = units;
    }

    /// Move the bet index by `delta`, saturating at both ends
    pub(crate) fn step_bet(&mut self, delta: isize) -> f64 {
        let max = self.bet_table.len() - 1;
        self.bet_index = self.bet_index.saturating_add_signed(delta).min(max);
        self.bet()
    }
}
