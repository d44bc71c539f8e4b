//! Slot configuration: grid layout, bet table, symbols and paylines

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::paytable::{Payline, stock_paylines};
use crate::symbols::SymbolTable;
use crate::timing::TimingConfig;

/// Grid specification and reel geometry (px)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    /// Number of reels (columns)
    pub reels: u8,
    /// Number of visible rows
    pub rows: u8,
    /// Off-screen slots per reel strip
    pub buffer_slots: u8,
    /// Height of one symbol cell
    pub symbol_size: f64,
    /// Horizontal pitch of one reel
    pub reel_width: f64,
    /// Gap between reels
    pub reel_spacing: f64,
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            reels: 5,
            rows: 3,
            buffer_slots: 4,
            symbol_size: 120.0,
            reel_width: 130.0,
            reel_spacing: 10.0,
            width: 900.0,
            height: 600.0,
        }
    }
}

impl GridSpec {
    /// Total slots per reel strip
    pub fn strip_len(&self) -> usize {
        self.rows as usize + self.buffer_slots as usize
    }

    /// Height of the visible window
    pub fn window_height(&self) -> f64 {
        self.rows as f64 * self.symbol_size
    }

    /// Clip rectangle covering every reel's visible rows
    ///
    /// Centered horizontally, lifted 30 px above center to leave room for
    /// the control bar.
    pub fn viewport(&self) -> Viewport {
        let width = self.reels as f64 * self.reel_width;
        let height = self.window_height();
        Viewport {
            x: (self.width - width) / 2.0,
            y: (self.height - height) / 2.0 - 30.0,
            width,
            height,
        }
    }

    /// Top-left corner of a reel column
    pub fn reel_origin(&self, reel_index: usize) -> (f64, f64) {
        let viewport = self.viewport();
        (viewport.x + reel_index as f64 * self.reel_width, viewport.y)
    }
}

/// Axis-aligned clip rectangle (px)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Complete slot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Game name
    pub name: String,
    /// Grid specification
    pub grid: GridSpec,
    /// Reel animation timing
    pub timing: TimingConfig,
    /// Available bet amounts, ascending
    pub bet_amounts: Vec<f64>,
    /// Bet selected at session start
    pub default_bet_index: usize,
    /// Balance at session start
    pub starting_balance: f64,
    /// Symbol table
    pub symbols: SymbolTable,
    /// Payline table
    pub paylines: Vec<Payline>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            name: "Ancient Egypt".into(),
            grid: GridSpec::default(),
            timing: TimingConfig::default(),
            bet_amounts: vec![0.10, 0.25, 0.50, 1.00, 2.00, 5.00, 10.00],
            default_bet_index: 3,
            starting_balance: 1000.0,
            symbols: SymbolTable::stock(),
            paylines: stock_paylines(),
        }
    }
}

impl GameConfig {
    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from file; `.yaml`/`.yml` is read as YAML, anything else as JSON
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let config = if is_yaml {
            Self::from_yaml(&content)?
        } else {
            Self::from_json(&content)?
        };
        log::info!("Loaded slot config '{}' from {}", config.name, path.display());
        Ok(config)
    }

    /// Check the cross-field rules serde can't express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = &self.grid;
        if grid.reels == 0 || grid.rows == 0 {
            return Err(ConfigError::Invalid("grid needs at least one reel and one row".into()));
        }
        if grid.buffer_slots < 2 {
            return Err(ConfigError::Invalid("reel strips need at least two buffer slots".into()));
        }
        if grid.symbol_size.is_nan() || grid.symbol_size <= 0.0 {
            return Err(ConfigError::Invalid("symbol size must be positive".into()));
        }

        if self.bet_amounts.is_empty() {
            return Err(ConfigError::Invalid("bet table is empty".into()));
        }
        if self.bet_amounts.iter().any(|b| !b.is_finite() || *b <= 0.0) {
            return Err(ConfigError::Invalid("bet amounts must be positive".into()));
        }
        if self.bet_amounts.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::Invalid("bet amounts must be strictly ascending".into()));
        }
        if self.default_bet_index >= self.bet_amounts.len() {
            return Err(ConfigError::Invalid(format!(
                "default bet index {} outside bet table of {}",
                self.default_bet_index,
                self.bet_amounts.len()
            )));
        }
        if !self.starting_balance.is_finite() || self.starting_balance < 0.0 {
            return Err(ConfigError::Invalid("starting balance must be non-negative".into()));
        }

        let mut seen = HashSet::new();
        for (idx, line) in self.paylines.iter().enumerate() {
            if line.len() != grid.reels as usize {
                return Err(ConfigError::Invalid(format!(
                    "payline {} has {} positions for {} reels",
                    idx,
                    line.len(),
                    grid.reels
                )));
            }
            if let Some(row) = line.positions.iter().find(|&&r| r >= grid.rows) {
                return Err(ConfigError::Invalid(format!(
                    "payline {} uses row {} of a {}-row grid",
                    idx, row, grid.rows
                )));
            }
            if !seen.insert(&line.positions) {
                log::warn!("Payline {} duplicates an earlier line and pays twice", idx);
            }
        }

        Ok(())
    }
}
