//! Paylines and win calculation

use serde::{Deserialize, Serialize};

use crate::symbols::{MAX_PAID_RUN, SymbolId, SymbolTable};

/// A payline: one row position per reel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payline {
    /// Row positions for each reel (e.g., [0, 1, 2, 1, 0] for a "V" shape)
    pub positions: Vec<u8>,
}

impl Payline {
    pub fn new(positions: Vec<u8>) -> Self {
        Self { positions }
    }

    /// Create a straight line (same row across all reels)
    pub fn straight(row: u8, reel_count: u8) -> Self {
        Self {
            positions: vec![row; reel_count as usize],
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// The ten lines of the 5×3 Ancient Egypt layout (0 = top row)
pub fn stock_paylines() -> Vec<Payline> {
    vec![
        // Straight lines
        Payline::straight(1, 5), // Middle
        Payline::straight(0, 5), // Top
        Payline::straight(2, 5), // Bottom
        // V shapes
        Payline::new(vec![0, 1, 2, 1, 0]),
        Payline::new(vec![2, 1, 0, 1, 2]),
        // Diagonals
        Payline::new(vec![0, 0, 1, 2, 2]),
        Payline::new(vec![2, 2, 1, 0, 0]),
        // U shapes
        Payline::new(vec![1, 0, 0, 0, 1]),
        Payline::new(vec![1, 2, 2, 2, 1]),
        // Shallow V
        Payline::new(vec![0, 1, 1, 1, 0]),
    ]
}

/// A win on a single payline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineWin {
    /// Index into the payline table
    pub line_index: usize,
    /// Winning symbol ID
    pub symbol_id: SymbolId,
    /// Symbol name
    pub symbol_name: String,
    /// Length of the run anchored at reel 0
    pub match_count: u8,
    /// Win amount (bet × pay value)
    pub win_amount: f64,
    /// Positions of winning symbols (reel, row)
    pub positions: Vec<(u8, u8)>,
}

/// Result of evaluating a grid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Line wins, in payline order
    pub line_wins: Vec<LineWin>,
    /// Total win amount
    pub total_win: f64,
    /// Win-to-bet ratio
    pub win_ratio: f64,
}

impl EvaluationResult {
    /// Check if this is a winning spin
    pub fn is_win(&self) -> bool {
        self.total_win > 0.0
    }

    /// Number of paying lines
    pub fn win_count(&self) -> usize {
        self.line_wins.len()
    }
}

/// Scores a settled grid against the payline table
///
/// The grid is indexed `[reel][row]`. Only runs that start on reel 0 count;
/// each payline is scored on its own and the line wins are summed.
#[derive(Debug, Clone, Copy)]
pub struct WinEvaluator<'a> {
    symbols: &'a SymbolTable,
    paylines: &'a [Payline],
}

impl<'a> WinEvaluator<'a> {
    pub fn new(symbols: &'a SymbolTable, paylines: &'a [Payline]) -> Self {
        Self { symbols, paylines }
    }

    /// Evaluate wins on a grid
    pub fn evaluate(&self, grid: &[Vec<SymbolId>], bet: f64) -> EvaluationResult {
        let line_wins: Vec<LineWin> = self
            .paylines
            .iter()
            .enumerate()
            .filter_map(|(idx, payline)| self.evaluate_line(grid, idx, payline, bet))
            .collect();

        // Folding from +0.0 keeps a losing grid at +0.0; an empty `sum` is -0.0
        let total_win = line_wins.iter().fold(0.0, |acc, w| acc + w.win_amount);

        EvaluationResult {
            line_wins,
            total_win,
            win_ratio: if bet > 0.0 { total_win / bet } else { 0.0 },
        }
    }

    fn evaluate_line(
        &self,
        grid: &[Vec<SymbolId>],
        line_index: usize,
        payline: &Payline,
        bet: f64,
    ) -> Option<LineWin> {
        if payline.positions.len() != grid.len() {
            return None;
        }

        // One symbol per reel; a row outside the grid voids the line
        let line_symbols: Vec<SymbolId> = payline
            .positions
            .iter()
            .enumerate()
            .map(|(reel, &row)| grid[reel].get(row as usize).copied())
            .collect::<Option<_>>()?;

        let first_symbol = *line_symbols.first()?;
        let match_count = line_symbols
            .iter()
            .take_while(|&&s| s == first_symbol)
            .count()
            .min(u8::MAX as usize) as u8;

        // Minimum 3 for a win
        if match_count < 3 {
            return None;
        }

        let symbol = self.symbols.get(first_symbol)?;
        // Runs longer than the pay table pay as its top entry
        let pay_value = symbol.get_pay(match_count.min(MAX_PAID_RUN));
        if pay_value <= 0.0 {
            return None;
        }

        let positions = payline
            .positions
            .iter()
            .take(match_count as usize)
            .enumerate()
            .map(|(reel, &row)| (reel as u8, row))
            .collect();

        Some(LineWin {
            line_index,
            symbol_id: first_symbol,
            symbol_name: symbol.name.clone(),
            match_count,
            win_amount: bet * pay_value,
            positions,
        })
    }
}

/// Total payout for a grid: the pure form of [`WinEvaluator::evaluate`]
pub fn total_win(grid: &[Vec<SymbolId>], paylines: &[Payline], symbols: &SymbolTable, bet: f64) -> f64 {
    WinEvaluator::new(symbols, paylines).evaluate(grid, bet).total_win
}
