//! Collaborator traits for rendering and the HUD
//!
//! The core never draws. Reels report sprite placement and movement through
//! [`ReelSurface`]; balance, bet and win go out through [`HudDisplay`].

use crate::config::Viewport;
use crate::symbols::Symbol;

/// Sprite-level rendering capability
///
/// Every method defaults to a no-op so a host only implements what it draws.
/// `y` is relative to the top of the reel's visible window.
pub trait ReelSurface {
    /// Create the sprite for `slot` bound to `symbol`
    fn place_sprite(&mut self, _reel: usize, _slot: usize, _symbol: &Symbol, _y: f64) {}

    /// Move an existing sprite along the reel axis
    fn move_sprite(&mut self, _reel: usize, _slot: usize, _y: f64) {}

    /// Rebind a sprite to another symbol
    fn swap_sprite(&mut self, _reel: usize, _slot: usize, _symbol: &Symbol) {}

    /// Shift a whole reel (bounce)
    fn set_reel_offset(&mut self, _reel: usize, _offset: f64) {}

    /// Restrict drawing to the reel window
    fn clip(&mut self, _viewport: Viewport) {}
}

/// Notices raised to the player
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Spin blocked: bet exceeds balance
    InsufficientBalance { bet: f64, balance: f64 },
    /// Spin paid out
    Win { amount: f64, line_count: usize },
}

/// Balance/bet/win display
pub trait HudDisplay {
    fn refresh(&mut self, balance: f64, bet: f64, win: f64);

    fn notify(&mut self, _notice: &Notice) {}
}

/// Surface and HUD that discard everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl ReelSurface for NullSurface {}

impl HudDisplay for NullSurface {
    fn refresh(&mut self, _balance: f64, _bet: f64, _win: f64) {}
}
