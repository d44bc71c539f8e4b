//! Per-reel strip animation
//!
//! A reel is a short circular strip of `rows + buffer` slots scrolling
//! downwards. While it spins, slots that fall off the bottom wrap to the top
//! and pick up random symbols; when its time runs out the strip snaps to the
//! result column and bounces back into place.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::GridSpec;
use crate::surface::ReelSurface;
use crate::symbols::{SymbolId, SymbolTable};
use crate::timing::TimingConfig;

/// Longest frame a single tick accounts for (ms)
pub const MAX_FRAME_MS: f64 = 60_000.0;

/// One sprite on the strip
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReelSlot {
    pub symbol: SymbolId,
    /// Top edge relative to the visible window (px)
    pub y: f64,
}

/// Animation phase of a reel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ReelMotion {
    /// At rest before the first spin
    Idle,
    Spinning { elapsed_ms: f64, duration_ms: f64 },
    /// Snapped to the result, bouncing back into place
    Bouncing { elapsed_ms: f64 },
    Settled,
}

/// What a tick left the reel doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReelStatus {
    Animating,
    Settled,
}

/// Mutable strip state of a single reel
#[derive(Debug, Clone)]
pub struct ReelState {
    index: usize,
    slots: Vec<ReelSlot>,
    rows: usize,
    symbol_size: f64,
    /// Distance scrolled since the current spin started (px)
    scroll_offset: f64,
    /// Whole-reel displacement from the bounce (px)
    bounce_offset: f64,
    motion: ReelMotion,
}

impl ReelState {
    /// Fill a strip with random symbols, slot `j` at `(j - 1) × size`
    pub fn new<R: Rng + ?Sized>(
        index: usize,
        grid: &GridSpec,
        symbols: &SymbolTable,
        rng: &mut R,
    ) -> Self {
        let size = grid.symbol_size;
        let slots = (0..grid.strip_len())
            .map(|j| ReelSlot {
                symbol: symbols.pick(rng),
                y: (j as f64 - 1.0) * size,
            })
            .collect();

        Self {
            index,
            slots,
            rows: grid.rows as usize,
            symbol_size: size,
            scroll_offset: 0.0,
            bounce_offset: 0.0,
            motion: ReelMotion::Idle,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn slots(&self) -> &[ReelSlot] {
        &self.slots
    }

    pub fn motion(&self) -> ReelMotion {
        self.motion
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn bounce_offset(&self) -> f64 {
        self.bounce_offset
    }

    pub fn is_spinning(&self) -> bool {
        matches!(self.motion, ReelMotion::Spinning { .. })
    }

    pub fn is_animating(&self) -> bool {
        matches!(
            self.motion,
            ReelMotion::Spinning { .. } | ReelMotion::Bouncing { .. }
        )
    }

    /// Hand every slot to the surface as a sprite
    pub fn place_sprites(&self, symbols: &SymbolTable, surface: &mut dyn ReelSurface) {
        for (slot_idx, slot) in self.slots.iter().enumerate() {
            if let Some(symbol) = symbols.get(slot.symbol) {
                surface.place_sprite(self.index, slot_idx, symbol, slot.y);
            }
        }
    }

    /// Symbols inside the visible window, top to bottom
    pub fn visible_symbols(&self) -> Vec<SymbolId> {
        let window = self.rows as f64 * self.symbol_size;
        let mut visible: Vec<&ReelSlot> = self
            .slots
            .iter()
            .filter(|s| s.y >= 0.0 && s.y < window)
            .collect();
        visible.sort_by(|a, b| a.y.total_cmp(&b.y));
        visible.into_iter().map(|s| s.symbol).collect()
    }

    /// Start spinning for `duration_ms`
    pub fn start(&mut self, duration_ms: f64) {
        self.scroll_offset = 0.0;
        self.bounce_offset = 0.0;
        self.motion = ReelMotion::Spinning {
            elapsed_ms: 0.0,
            duration_ms: duration_ms.max(0.0),
        };
    }

    /// Advance the animation by `dt_ms`
    ///
    /// `column` is this reel's result column; it is written into the strip
    /// the moment the spin time runs out. Symbols change only while spinning.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        dt_ms: f64,
        column: &[SymbolId],
        timing: &TimingConfig,
        symbols: &SymbolTable,
        rng: &mut R,
        surface: &mut dyn ReelSurface,
    ) -> ReelStatus {
        // NaN and negative deltas count as no time passing; a stalled host
        // catching up is capped to one long frame
        let dt_ms = if dt_ms > 0.0 { dt_ms.min(MAX_FRAME_MS) } else { 0.0 };

        match self.motion {
            ReelMotion::Idle | ReelMotion::Settled => ReelStatus::Settled,
            ReelMotion::Spinning {
                elapsed_ms,
                duration_ms,
            } => {
                let elapsed_ms = elapsed_ms + dt_ms;
                let progress = if duration_ms > 0.0 {
                    (elapsed_ms / duration_ms).min(1.0)
                } else {
                    1.0
                };

                self.scroll(timing.scroll_distance(progress, dt_ms), progress, timing, symbols, rng, surface);

                if progress < 1.0 {
                    self.motion = ReelMotion::Spinning {
                        elapsed_ms,
                        duration_ms,
                    };
                    return ReelStatus::Animating;
                }

                self.snap(column, symbols, surface);
                if timing.bounce_duration_ms > 0.0 {
                    self.motion = ReelMotion::Bouncing { elapsed_ms: 0.0 };
                    ReelStatus::Animating
                } else {
                    self.motion = ReelMotion::Settled;
                    ReelStatus::Settled
                }
            }
            ReelMotion::Bouncing { elapsed_ms } => {
                let elapsed_ms = elapsed_ms + dt_ms;
                let p = if timing.bounce_duration_ms > 0.0 {
                    elapsed_ms / timing.bounce_duration_ms
                } else {
                    1.0
                };
                self.bounce_offset = timing.bounce_offset(p);
                surface.set_reel_offset(self.index, self.bounce_offset);

                if p >= 1.0 {
                    self.bounce_offset = 0.0;
                    self.motion = ReelMotion::Settled;
                    ReelStatus::Settled
                } else {
                    self.motion = ReelMotion::Bouncing { elapsed_ms };
                    ReelStatus::Animating
                }
            }
        }
    }

    fn scroll<R: Rng + ?Sized>(
        &mut self,
        distance: f64,
        progress: f64,
        timing: &TimingConfig,
        symbols: &SymbolTable,
        rng: &mut R,
        surface: &mut dyn ReelSurface,
    ) {
        let size = self.symbol_size;
        let wrap_at = (self.rows + 1) as f64 * size;
        let circumference = self.slots.len() as f64 * size;
        let randomize = timing.randomizes_at(progress);

        self.scroll_offset += distance;
        for (slot_idx, slot) in self.slots.iter_mut().enumerate() {
            slot.y += distance;
            let wrapped = slot.y > wrap_at;
            if wrapped {
                // Back into (wrap_at - circumference, wrap_at] in one step
                slot.y = wrap_at - (wrap_at - slot.y).rem_euclid(circumference);
            }
            if wrapped && randomize {
                slot.symbol = symbols.pick(rng);
                if let Some(symbol) = symbols.get(slot.symbol) {
                    surface.swap_sprite(self.index, slot_idx, symbol);
                }
            }
            surface.move_sprite(self.index, slot_idx, slot.y);
        }
    }

    /// Hard-set the visible window to `column`
    ///
    /// Slot `i + 1` shows result row `i` at `i × size`, slot 0 parks just
    /// above the window and the remaining buffer slots below it.
    fn snap(&mut self, column: &[SymbolId], symbols: &SymbolTable, surface: &mut dyn ReelSurface) {
        let size = self.symbol_size;
        for (slot_idx, slot) in self.slots.iter_mut().enumerate() {
            if slot_idx == 0 {
                slot.y = -size;
            } else if slot_idx <= self.rows {
                let row = slot_idx - 1;
                if let Some(&symbol_id) = column.get(row) {
                    slot.symbol = symbol_id;
                    if let Some(symbol) = symbols.get(symbol_id) {
                        surface.swap_sprite(self.index, slot_idx, symbol);
                    }
                }
                slot.y = row as f64 * size;
            } else {
                slot.y = slot_idx as f64 * size;
            }
            surface.move_sprite(self.index, slot_idx, slot.y);
        }
        log::trace!("Reel {} snapped to {:?}", self.index, column);
    }
}
