//! Spin results and lifecycle events

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::paytable::EvaluationResult;
use crate::symbols::{SymbolId, SymbolTable};

/// Outcome of one spin, fixed before any reel moves
///
/// Both the reel snap and the win evaluation read this grid, so what the
/// player sees and what gets paid cannot diverge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinResult {
    /// Sequential spin number within the session
    pub spin_id: u64,
    /// Bet debited for this spin
    pub bet: f64,
    /// Final grid, `[reel][row]`, row 0 at the top
    pub grid: Vec<Vec<SymbolId>>,
}

impl SpinResult {
    /// Draw a full grid, one weighted pick per cell, reel by reel
    pub fn generate<R: Rng + ?Sized>(
        spin_id: u64,
        bet: f64,
        reels: usize,
        rows: usize,
        symbols: &SymbolTable,
        rng: &mut R,
    ) -> Self {
        let grid = (0..reels)
            .map(|_| (0..rows).map(|_| symbols.pick(rng)).collect())
            .collect();
        Self { spin_id, bet, grid }
    }

    /// Result column for one reel
    pub fn column(&self, reel: usize) -> &[SymbolId] {
        self.grid.get(reel).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Grid as symbol names, for logs and text output
    pub fn names(&self, symbols: &SymbolTable) -> Vec<Vec<String>> {
        self.grid
            .iter()
            .map(|col| col.iter().map(|&id| symbols.name(id).to_string()).collect())
            .collect()
    }
}

/// A completed spin: result, its evaluation and the balance after credit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub result: SpinResult,
    pub evaluation: EvaluationResult,
    pub balance: f64,
}

impl SpinOutcome {
    pub fn win(&self) -> f64 {
        self.evaluation.total_win
    }
}

/// Ordered lifecycle events, drained by the host for sound and banners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpinEvent {
    SpinStart { bet: f64 },
    ReelSpinning { reel: usize },
    /// Reel hit its stop; `symbols` is its visible window, top to bottom
    ReelStop { reel: usize, symbols: Vec<SymbolId> },
    ReelSettled { reel: usize },
    EvaluateWins,
    WinPresent { amount: f64, line_count: usize },
    SpinEnd { balance: f64, win: f64 },
    SpinRejected { reason: String },
}
