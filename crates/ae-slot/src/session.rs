//! Game session: the object a host drives
//!
//! Owns the ledger, the orchestrator and the running statistics. Input
//! arrives through [`GameSession::handle_input`], time through
//! [`GameSession::tick`].

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::{SlotError, SlotResult};
use crate::ledger::SessionLedger;
use crate::orchestrator::{SpinOrchestrator, SpinPhase};
use crate::spin::{SpinEvent, SpinOutcome};
use crate::surface::{HudDisplay, Notice, ReelSurface};
use crate::timing::TimingConfig;

/// Upper bound on ticks in [`GameSession::run_to_idle`]
const MAX_RUN_TICKS: usize = 100_000;

/// Player input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEvent {
    SpinRequested,
    BetIncrease,
    BetDecrease,
}

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_spins: u64,
    pub total_bet: f64,
    pub total_win: f64,
    pub wins: u64,
    pub losses: u64,
    pub max_win_ratio: f64,
}

impl SessionStats {
    /// Calculate RTP
    pub fn rtp(&self) -> f64 {
        if self.total_bet > 0.0 {
            (self.total_win / self.total_bet) * 100.0
        } else {
            0.0
        }
    }

    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            (self.wins as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }

    fn record(&mut self, outcome: &SpinOutcome) {
        self.total_spins += 1;
        self.total_bet += outcome.result.bet;
        self.total_win += outcome.win();
        if outcome.evaluation.is_win() {
            self.wins += 1;
            self.max_win_ratio = self.max_win_ratio.max(outcome.evaluation.win_ratio);
        } else {
            self.losses += 1;
        }
    }
}

/// One player's slot session
pub struct GameSession {
    config: GameConfig,
    orchestrator: SpinOrchestrator,
    ledger: SessionLedger,
    stats: SessionStats,
    last_outcome: Option<SpinOutcome>,
}

impl GameSession {
    /// Validate `config` and open a session with its starting balance
    pub fn new(config: GameConfig) -> SlotResult<Self> {
        config.validate()?;
        let orchestrator = SpinOrchestrator::new(&config);
        Ok(Self::assemble(config, orchestrator))
    }

    /// Same as [`GameSession::new`] with a deterministic RNG
    pub fn with_seed(config: GameConfig, seed: u64) -> SlotResult<Self> {
        config.validate()?;
        let orchestrator = SpinOrchestrator::with_seed(&config, seed);
        Ok(Self::assemble(config, orchestrator))
    }

    fn assemble(config: GameConfig, orchestrator: SpinOrchestrator) -> Self {
        let ledger = SessionLedger::new(
            config.starting_balance,
            config.bet_amounts.clone(),
            config.default_bet_index,
        );
        log::info!(
            "Session '{}' opened: balance {:.2}, bet {:.2}",
            config.name,
            ledger.balance(),
            ledger.bet()
        );
        Self {
            config,
            orchestrator,
            ledger,
            stats: SessionStats::default(),
            last_outcome: None,
        }
    }

    /// Reseed the RNG
    pub fn seed(&mut self, seed: u64) {
        self.orchestrator.seed(seed);
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn ledger(&self) -> &SessionLedger {
        &self.ledger
    }

    pub fn orchestrator(&self) -> &SpinOrchestrator {
        &self.orchestrator
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn phase(&self) -> SpinPhase {
        self.orchestrator.phase()
    }

    pub fn is_spinning(&self) -> bool {
        !self.orchestrator.is_idle()
    }

    pub fn last_outcome(&self) -> Option<&SpinOutcome> {
        self.last_outcome.as_ref()
    }

    /// Change reel timing; ignored while a spin is running
    pub fn set_timing(&mut self, timing: TimingConfig) {
        if self.orchestrator.is_idle() {
            self.orchestrator.set_timing(timing);
        }
    }

    /// Place the reels on a surface and show the opening HUD
    pub fn attach(&self, surface: &mut dyn ReelSurface, hud: &mut dyn HudDisplay) {
        self.orchestrator.attach(surface);
        self.refresh(hud);
    }

    /// Input handler
    ///
    /// Bet changes are ignored while a spin is running. Spin requests go
    /// through [`GameSession::request_spin`]; its errors are already
    /// reported to the HUD, so nothing comes back to the caller.
    pub fn handle_input(&mut self, event: InputEvent, hud: &mut dyn HudDisplay) {
        match event {
            InputEvent::SpinRequested => match self.request_spin(hud) {
                Ok(()) => {}
                Err(SlotError::SpinInProgress) => log::debug!("Spin button ignored during spin"),
                Err(err) => log::debug!("Spin request refused: {}", err),
            },
            InputEvent::BetIncrease | InputEvent::BetDecrease => {
                if self.is_spinning() {
                    log::debug!("Bet change ignored during spin");
                    return;
                }
                let delta = if event == InputEvent::BetIncrease { 1 } else { -1 };
                let bet = self.ledger.step_bet(delta);
                log::debug!("Bet set to {:.2}", bet);
                self.refresh(hud);
            }
        }
    }

    /// Start a spin
    ///
    /// Insufficient balance is shown on the HUD and returned; a request
    /// during a spin returns `SpinInProgress` without any side effect.
    pub fn request_spin(&mut self, hud: &mut dyn HudDisplay) -> SlotResult<()> {
        match self.orchestrator.begin(&mut self.ledger) {
            Ok(()) => {
                self.refresh(hud);
                Ok(())
            }
            Err(SlotError::InsufficientBalance { bet, balance }) => {
                hud.notify(&Notice::InsufficientBalance { bet, balance });
                Err(SlotError::InsufficientBalance { bet, balance })
            }
            Err(err) => Err(err),
        }
    }

    /// Advance the animation by `dt_ms`
    pub fn tick(
        &mut self,
        dt_ms: f64,
        surface: &mut dyn ReelSurface,
        hud: &mut dyn HudDisplay,
    ) -> SpinPhase {
        if let Some(outcome) = self.orchestrator.tick(dt_ms, &mut self.ledger, surface) {
            self.stats.record(&outcome);
            if outcome.evaluation.is_win() {
                hud.notify(&Notice::Win {
                    amount: outcome.win(),
                    line_count: outcome.evaluation.win_count(),
                });
            }
            self.refresh(hud);
            self.last_outcome = Some(outcome);
        }
        self.orchestrator.phase()
    }

    /// Tick at a fixed frame interval until the spin in flight completes
    ///
    /// Returns the outcome, or `None` if no spin was running.
    pub fn run_to_idle(
        &mut self,
        frame_ms: f64,
        surface: &mut dyn ReelSurface,
        hud: &mut dyn HudDisplay,
    ) -> Option<&SpinOutcome> {
        if self.orchestrator.is_idle() {
            return None;
        }
        for _ in 0..MAX_RUN_TICKS {
            if self.tick(frame_ms, surface, hud) == SpinPhase::Idle {
                return self.last_outcome.as_ref();
            }
        }
        log::warn!("Spin did not settle within {} ticks", MAX_RUN_TICKS);
        None
    }

    /// Take the lifecycle events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<SpinEvent> {
        self.orchestrator.drain_events()
    }

    fn refresh(&self, hud: &mut dyn HudDisplay) {
        hud.refresh(self.ledger.balance(), self.ledger.bet(), self.ledger.current_win());
    }
}
