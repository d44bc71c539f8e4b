//! Timing profiles for reel animation

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Reference frame length the per-frame speeds are expressed in (60 Hz)
pub const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0;

/// Timing profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Normal gameplay timing
    #[default]
    Normal,
    /// Fast/Turbo mode
    Turbo,
    /// No animation: every reel snaps on the first tick
    Instant,
    /// Custom timing (scaled or hand-edited)
    Custom,
}

/// Detailed timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Profile type
    pub profile: TimingProfile,

    /// Spin time of the first reel (ms)
    pub spin_duration_ms: f64,

    /// Extra spin time per reel, giving the cascading stop (ms)
    pub reel_stop_interval_ms: f64,

    /// Full scroll speed (px per reference frame)
    pub spin_speed: f64,

    /// Progress at which the slowdown starts
    pub slowdown_start: f64,

    /// Share of full speed kept at the start of the slowdown
    pub slowdown_factor: f64,

    /// Residual speed the slowdown ends on (px per reference frame)
    pub min_speed: f64,

    /// Progress after which wrapped slots keep their symbol
    pub randomize_cutoff: f64,

    /// Peak bounce displacement (px)
    pub bounce_amount: f64,

    /// Bounce length (ms)
    pub bounce_duration_ms: f64,
}

impl TimingConfig {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            spin_duration_ms: 2000.0,
            reel_stop_interval_ms: 150.0,
            spin_speed: 50.0,
            slowdown_start: 0.7,
            slowdown_factor: 0.8,
            min_speed: 5.0,
            randomize_cutoff: 0.8,
            bounce_amount: 20.0,
            bounce_duration_ms: 15.0 * REFERENCE_FRAME_MS,
        }
    }

    /// Turbo mode
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            spin_duration_ms: 800.0,
            reel_stop_interval_ms: 80.0,
            spin_speed: 70.0,
            bounce_amount: 12.0,
            bounce_duration_ms: 8.0 * REFERENCE_FRAME_MS,
            ..Self::normal()
        }
    }

    /// Instant mode (tests, autoplay simulations)
    pub fn instant() -> Self {
        Self {
            profile: TimingProfile::Instant,
            spin_duration_ms: 0.0,
            reel_stop_interval_ms: 0.0,
            bounce_amount: 0.0,
            bounce_duration_ms: 0.0,
            ..Self::normal()
        }
    }

    /// Get config for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Instant => Self::instant(),
            TimingProfile::Custom => Self::normal(),
        }
    }

    /// Scale timing by factor (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        Self {
            profile: TimingProfile::Custom,
            spin_duration_ms: self.spin_duration_ms * factor,
            reel_stop_interval_ms: self.reel_stop_interval_ms * factor,
            bounce_duration_ms: self.bounce_duration_ms * factor,
            ..self.clone()
        }
    }

    /// Spin time of one reel: base plus its stagger
    pub fn reel_duration(&self, reel_index: usize) -> f64 {
        self.spin_duration_ms + reel_index as f64 * self.reel_stop_interval_ms
    }

    /// Time from spin start until the last reel finishes bouncing
    pub fn total_spin_duration(&self, reel_count: usize) -> f64 {
        if reel_count == 0 {
            return 0.0;
        }
        self.reel_duration(reel_count - 1) + self.bounce_duration_ms
    }

    /// Scroll speed at a given spin progress (px per reference frame)
    ///
    /// Full speed until `slowdown_start`, then a linear ramp from
    /// `spin_speed × slowdown_factor` down to `min_speed` at progress 1.
    pub fn speed_at(&self, progress: f64) -> f64 {
        if progress <= self.slowdown_start {
            return self.spin_speed;
        }
        let window = (1.0 - self.slowdown_start).max(f64::EPSILON);
        let remaining = (1.0 - (progress - self.slowdown_start) / window).clamp(0.0, 1.0);
        self.spin_speed * remaining * self.slowdown_factor + self.min_speed
    }

    /// Distance scrolled over `dt_ms` at a given progress (px)
    pub fn scroll_distance(&self, progress: f64, dt_ms: f64) -> f64 {
        self.speed_at(progress) * dt_ms / REFERENCE_FRAME_MS
    }

    /// Whether a slot wrapping at this progress gets a fresh symbol
    pub fn randomizes_at(&self, progress: f64) -> bool {
        progress < self.randomize_cutoff
    }

    /// Bounce displacement at bounce progress `p` in `[0, 1]`
    pub fn bounce_offset(&self, p: f64) -> f64 {
        if p >= 1.0 {
            return 0.0;
        }
        let p = p.max(0.0);
        (p * PI).sin() * self.bounce_amount * (1.0 - p)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::normal()
    }
}
