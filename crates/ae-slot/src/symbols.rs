//! Symbol definitions and weighted selection

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Handle of a symbol: its position in the [`SymbolTable`]
pub type SymbolId = u32;

/// Number of pay values per symbol (3, 4 and 5 of a kind)
pub const PAY_VALUE_COUNT: usize = 3;

/// Longest run with its own pay value
pub const MAX_PAID_RUN: u8 = PAY_VALUE_COUNT as u8 + 2;

/// A symbol definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Symbol identifier (e.g., "pharaoh", "symbol05")
    #[serde(alias = "id")]
    pub name: String,
    /// Sprite file the renderer binds to this symbol
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Pay multipliers for 3, 4, 5 of a kind (index 0 = 3oak)
    #[serde(alias = "payouts")]
    pub pay_values: Vec<f64>,
    /// Relative draw weight
    pub weight: u32,
}

impl Symbol {
    /// Create a symbol with its sprite file
    pub fn new(name: impl Into<String>, file: impl Into<String>, pays: [f64; 3], weight: u32) -> Self {
        Self {
            name: name.into(),
            file: Some(file.into()),
            pay_values: pays.to_vec(),
            weight,
        }
    }

    /// Get pay multiplier for a match count
    pub fn get_pay(&self, match_count: u8) -> f64 {
        if match_count < 3 {
            return 0.0;
        }
        let idx = (match_count - 3) as usize;
        self.pay_values.get(idx).copied().unwrap_or(0.0)
    }
}

/// Validated, immutable symbol table with weighted draw
///
/// Ids handed out by the table are indices into it, so two cells hold the
/// same symbol exactly when their ids are equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Symbol>", into = "Vec<Symbol>")]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    total_weight: u64,
}

impl SymbolTable {
    /// Build a table, rejecting anything the selector or evaluator can't use
    pub fn new(symbols: Vec<Symbol>) -> Result<Self, ConfigError> {
        if symbols.is_empty() {
            return Err(ConfigError::Invalid("symbol table is empty".into()));
        }

        let mut seen = HashSet::new();
        for symbol in &symbols {
            if !seen.insert(symbol.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate symbol '{}'",
                    symbol.name
                )));
            }
            if symbol.weight == 0 {
                return Err(ConfigError::Invalid(format!(
                    "symbol '{}' has zero weight",
                    symbol.name
                )));
            }
            if symbol.pay_values.len() != PAY_VALUE_COUNT {
                return Err(ConfigError::Invalid(format!(
                    "symbol '{}' needs {} pay values, got {}",
                    symbol.name,
                    PAY_VALUE_COUNT,
                    symbol.pay_values.len()
                )));
            }
            if symbol.pay_values.iter().any(|p| !p.is_finite() || *p < 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "symbol '{}' has a negative or non-finite pay value",
                    symbol.name
                )));
            }
        }

        Ok(Self::from_checked(symbols))
    }

    fn from_checked(symbols: Vec<Symbol>) -> Self {
        let total_weight = symbols.iter().map(|s| s.weight as u64).sum();
        Self {
            symbols,
            total_weight,
        }
    }

    /// The Ancient Egypt symbol set
    ///
    /// `pharaoh` is the premium symbol; `symbol05`..`symbol10` are the card
    /// ranks A down to 9.
    pub fn stock() -> Self {
        Self::from_checked(vec![
            Symbol::new("pharaoh", "symbol01.png", [5.0, 20.0, 100.0], 5),
            Symbol::new("symbol03", "symbol03.png", [3.0, 10.0, 50.0], 8),
            Symbol::new("symbol04", "symbol04.png", [2.0, 8.0, 40.0], 10),
            Symbol::new("symbol05", "symbol05.png", [1.0, 5.0, 20.0], 15),
            Symbol::new("symbol06", "symbol06.png", [1.0, 4.0, 15.0], 15),
            Symbol::new("symbol07", "symbol07.png", [0.5, 3.0, 10.0], 18),
            Symbol::new("symbol08", "symbol08.png", [0.5, 2.0, 8.0], 18),
            Symbol::new("symbol09", "symbol09.png", [0.25, 1.5, 5.0], 20),
            Symbol::new("symbol10", "symbol10.png", [0.25, 1.0, 4.0], 20),
        ])
    }

    /// Get symbol by id
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id as usize)
    }

    /// Look up a symbol id by name
    pub fn find(&self, name: &str) -> Option<SymbolId> {
        self.symbols
            .iter()
            .position(|s| s.name == name)
            .map(|idx| idx as SymbolId)
    }

    /// Symbol name for an id ("?" for ids outside the table)
    pub fn name(&self, id: SymbolId) -> &str {
        self.get(id).map(|s| s.name.as_str()).unwrap_or("?")
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(idx, s)| (idx as SymbolId, s))
    }

    /// Sum of all weights
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Map a draw in `[0, total_weight)` to a symbol
    ///
    /// Weights are subtracted in table order until the remainder drops to
    /// zero or below. A draw that never gets there (rounding at the top of
    /// the range) lands on the last symbol.
    pub fn select(&self, draw: f64) -> SymbolId {
        let mut remaining = draw;
        for (idx, symbol) in self.symbols.iter().enumerate() {
            remaining -= symbol.weight as f64;
            if remaining <= 0.0 {
                return idx as SymbolId;
            }
        }
        (self.symbols.len() - 1) as SymbolId
    }

    /// Draw one symbol with probability proportional to its weight
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> SymbolId {
        let draw = rng.random::<f64>() * self.total_weight as f64;
        self.select(draw)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::stock()
    }
}

impl TryFrom<Vec<Symbol>> for SymbolTable {
    type Error = ConfigError;

    fn try_from(symbols: Vec<Symbol>) -> Result<Self, Self::Error> {
        Self::new(symbols)
    }
}

impl From<SymbolTable> for Vec<Symbol> {
    fn from(table: SymbolTable) -> Self {
        table.symbols
    }
}
