//! Spin state machine
//!
//! Drives a spin from acceptance to payout:
//!
//! ```text
//! Idle ──begin──> Validating ──accepted──> Spinning ──last reel stops──> Settling
//!  ^                  │                                                      │
//!  └───rejected───────┘<──────────────── all reels settled, paid ────────────┘
//! ```
//!
//! The result grid is drawn while validating, before any reel moves. Reels
//! then animate independently; the only synchronisation is the pending set,
//! and the spin is scored once it is empty.

use std::collections::BTreeSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::config::{GameConfig, GridSpec};
use crate::error::{SlotError, SlotResult};
use crate::ledger::SessionLedger;
use crate::paytable::{Payline, WinEvaluator};
use crate::reel::{ReelState, ReelStatus};
use crate::spin::{SpinEvent, SpinOutcome, SpinResult};
use crate::surface::ReelSurface;
use crate::symbols::{SymbolId, SymbolTable};
use crate::timing::TimingConfig;

/// Spin lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpinPhase {
    #[default]
    Idle,
    Validating,
    Spinning,
    /// Every reel has stopped; waiting for bounces to finish
    Settling,
}

/// Owns the reels and runs one spin at a time
pub struct SpinOrchestrator {
    symbols: SymbolTable,
    paylines: Vec<Payline>,
    grid: GridSpec,
    timing: TimingConfig,
    reels: Vec<ReelState>,
    rng: StdRng,
    phase: SpinPhase,
    /// Reels that haven't finished stop + bounce
    pending: BTreeSet<usize>,
    /// Result of the spin in flight
    result: Option<SpinResult>,
    events: Vec<SpinEvent>,
    spin_counter: u64,
}

impl SpinOrchestrator {
    pub fn new(config: &GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Create with a deterministic RNG
    pub fn with_seed(config: &GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &GameConfig, mut rng: StdRng) -> Self {
        let reels = (0..config.grid.reels as usize)
            .map(|i| ReelState::new(i, &config.grid, &config.symbols, &mut rng))
            .collect();

        Self {
            symbols: config.symbols.clone(),
            paylines: config.paylines.clone(),
            grid: config.grid,
            timing: config.timing.clone(),
            reels,
            rng,
            phase: SpinPhase::Idle,
            pending: BTreeSet::new(),
            result: None,
            events: Vec::new(),
            spin_counter: 0,
        }
    }

    /// Reseed the RNG for reproducible results
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn phase(&self) -> SpinPhase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == SpinPhase::Idle
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn paylines(&self) -> &[Payline] {
        &self.paylines
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Swap timing; takes effect from the next spin
    pub fn set_timing(&mut self, timing: TimingConfig) {
        self.timing = timing;
    }

    pub fn reels(&self) -> &[ReelState] {
        &self.reels
    }

    /// Result of the spin in flight
    pub fn current_result(&self) -> Option<&SpinResult> {
        self.result.as_ref()
    }

    /// Reels still animating, ascending
    pub fn pending_reels(&self) -> impl Iterator<Item = usize> + '_ {
        self.pending.iter().copied()
    }

    /// What the reels currently show, `[reel][row]`
    pub fn visible_grid(&self) -> Vec<Vec<SymbolId>> {
        self.reels.iter().map(ReelState::visible_symbols).collect()
    }

    /// Take the events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<SpinEvent> {
        std::mem::take(&mut self.events)
    }

    /// Hand the strips to a surface and clip it to the reel window
    pub fn attach(&self, surface: &mut dyn ReelSurface) {
        surface.clip(self.grid.viewport());
        for reel in &self.reels {
            reel.place_sprites(&self.symbols, surface);
        }
    }

    /// Validate, debit and draw the result
    ///
    /// A call while a spin is in flight returns `SpinInProgress` and changes
    /// nothing. A bet above the balance is rejected before any mutation.
    pub fn begin(&mut self, ledger: &mut SessionLedger) -> SlotResult<()> {
        if self.phase != SpinPhase::Idle {
            log::debug!("Spin request ignored in phase {:?}", self.phase);
            return Err(SlotError::SpinInProgress);
        }

        self.phase = SpinPhase::Validating;
        if !ledger.can_cover() {
            self.phase = SpinPhase::Idle;
            let err = SlotError::InsufficientBalance {
                bet: ledger.bet(),
                balance: ledger.balance(),
            };
            log::warn!("{}", err);
            self.events.push(SpinEvent::SpinRejected {
                reason: err.to_string(),
            });
            return Err(err);
        }

        let bet = ledger.debit_bet();
        self.spin_counter += 1;
        let result = SpinResult::generate(
            self.spin_counter,
            bet,
            self.grid.reels as usize,
            self.grid.rows as usize,
            &self.symbols,
            &mut self.rng,
        );
        log::info!("Spin {} accepted: bet {:.2}", result.spin_id, bet);
        log::debug!("Spin {} grid {:?}", result.spin_id, result.names(&self.symbols));

        self.events.push(SpinEvent::SpinStart { bet });
        for (i, reel) in self.reels.iter_mut().enumerate() {
            reel.start(self.timing.reel_duration(i));
            self.events.push(SpinEvent::ReelSpinning { reel: i });
        }
        self.pending = (0..self.reels.len()).collect();
        self.result = Some(result);
        self.phase = SpinPhase::Spinning;
        Ok(())
    }

    /// Advance every pending reel by `dt_ms`
    ///
    /// Returns the outcome on the tick the last reel settles; the win has
    /// already been credited to `ledger` by then.
    pub fn tick(
        &mut self,
        dt_ms: f64,
        ledger: &mut SessionLedger,
        surface: &mut dyn ReelSurface,
    ) -> Option<SpinOutcome> {
        if !matches!(self.phase, SpinPhase::Spinning | SpinPhase::Settling) {
            return None;
        }
        let Some(result) = self.result.as_ref() else {
            self.phase = SpinPhase::Idle;
            return None;
        };

        let mut settled = Vec::new();
        for &idx in &self.pending {
            let reel = &mut self.reels[idx];
            let was_spinning = reel.is_spinning();
            let status = reel.advance(
                dt_ms,
                result.column(idx),
                &self.timing,
                &self.symbols,
                &mut self.rng,
                surface,
            );
            if was_spinning && !reel.is_spinning() {
                log::debug!("Reel {} stopped", idx);
                self.events.push(SpinEvent::ReelStop {
                    reel: idx,
                    symbols: reel.visible_symbols(),
                });
            }
            if status == ReelStatus::Settled {
                settled.push(idx);
            }
        }

        for idx in settled {
            self.pending.remove(&idx);
            self.events.push(SpinEvent::ReelSettled { reel: idx });
        }

        if self.phase == SpinPhase::Spinning && !self.reels.iter().any(ReelState::is_spinning) {
            self.phase = SpinPhase::Settling;
        }

        if self.pending.is_empty() {
            self.finish(ledger)
        } else {
            None
        }
    }

    fn finish(&mut self, ledger: &mut SessionLedger) -> Option<SpinOutcome> {
        let result = self.result.take()?;
        self.events.push(SpinEvent::EvaluateWins);

        let evaluation = WinEvaluator::new(&self.symbols, &self.paylines).evaluate(&result.grid, result.bet);
        if evaluation.is_win() {
            ledger.credit_win(evaluation.total_win);
            self.events.push(SpinEvent::WinPresent {
                amount: evaluation.total_win,
                line_count: evaluation.win_count(),
            });
        }
        log::info!(
            "Spin {} settled: win {:.2} on {} line(s), balance {:.2}",
            result.spin_id,
            evaluation.total_win,
            evaluation.win_count(),
            ledger.balance()
        );

        self.events.push(SpinEvent::SpinEnd {
            balance: ledger.balance(),
            win: evaluation.total_win,
        });
        self.phase = SpinPhase::Idle;

        Some(SpinOutcome {
            result,
            evaluation,
            balance: ledger.balance(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::NullSurface;
    use approx::assert_relative_eq;

    fn instant_config() -> GameConfig {
        GameConfig {
            timing: TimingConfig::instant(),
            ..Default::default()
        }
    }

    fn ledger(config: &GameConfig) -> SessionLedger {
        SessionLedger::new(config.starting_balance, config.bet_amounts.clone(), config.default_bet_index)
    }

    #[test]
    fn test_instant_spin_completes_in_one_tick() {
        let config = instant_config();
        let mut orchestrator = SpinOrchestrator::with_seed(&config, 11);
        let mut ledger = ledger(&config);

        orchestrator.begin(&mut ledger).unwrap();
        assert_eq!(orchestrator.phase(), SpinPhase::Spinning);
        assert_relative_eq!(ledger.balance(), 999.0);

        let outcome = orchestrator.tick(0.0, &mut ledger, &mut NullSurface).unwrap();
        assert!(orchestrator.is_idle());
        assert_eq!(orchestrator.visible_grid(), outcome.result.grid);
        assert_relative_eq!(outcome.balance, 999.0 + outcome.win());
        assert_relative_eq!(ledger.current_win(), outcome.win());
        assert!(orchestrator.current_result().is_none());
    }

    #[test]
    fn test_tick_when_idle_does_nothing() {
        let config = instant_config();
        let mut orchestrator = SpinOrchestrator::with_seed(&config, 12);
        let mut ledger = ledger(&config);
        assert!(orchestrator.tick(16.0, &mut ledger, &mut NullSurface).is_none());
        assert!(orchestrator.drain_events().is_empty());
    }

    #[test]
    fn test_reels_stop_in_index_order() {
        let config = GameConfig::default();
        let mut orchestrator = SpinOrchestrator::with_seed(&config, 13);
        let mut ledger = ledger(&config);
        orchestrator.begin(&mut ledger).unwrap();

        let mut stops = Vec::new();
        let mut guard = 0;
        while orchestrator.tick(16.0, &mut ledger, &mut NullSurface).is_none() {
            for event in orchestrator.drain_events() {
                if let SpinEvent::ReelStop { reel, .. } = event {
                    stops.push(reel);
                }
            }
            guard += 1;
            assert!(guard < 10_000);
        }
        for event in orchestrator.drain_events() {
            if let SpinEvent::ReelStop { reel, .. } = event {
                stops.push(reel);
            }
        }
        assert_eq!(stops, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_settling_phase_between_last_stop_and_idle() {
        let config = GameConfig::default();
        let mut orchestrator = SpinOrchestrator::with_seed(&config, 14);
        let mut ledger = ledger(&config);
        orchestrator.begin(&mut ledger).unwrap();

        let mut saw_settling = false;
        let mut guard = 0;
        while orchestrator.tick(16.0, &mut ledger, &mut NullSurface).is_none() {
            if orchestrator.phase() == SpinPhase::Settling {
                saw_settling = true;
                assert!(orchestrator.reels().iter().all(|r| !r.is_spinning()));
                assert!(orchestrator.pending_reels().count() > 0);
            }
            guard += 1;
            assert!(guard < 10_000);
        }
        assert!(saw_settling);
        assert!(orchestrator.is_idle());
    }
}
