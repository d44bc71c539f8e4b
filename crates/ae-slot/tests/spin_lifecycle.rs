//! Spin lifecycle integration tests
//!
//! Drives `GameSession` the way a host does: input events in, ticks at a
//! frame interval, and checks what the player would see and be paid.

use ae_slot::{
    GameConfig, GameSession, HudDisplay, InputEvent, Notice, NullSurface, ReelSurface, SlotError,
    SpinEvent, SpinPhase, Symbol, SymbolTable, TimingConfig, Viewport,
};
use approx::assert_relative_eq;

// ═══════════════════════════════════════════════════════════════════════════════
// TEST FIXTURES
// ═══════════════════════════════════════════════════════════════════════════════

const FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Default)]
struct RecordingHud {
    refreshes: Vec<(f64, f64, f64)>,
    notices: Vec<Notice>,
}

impl HudDisplay for RecordingHud {
    fn refresh(&mut self, balance: f64, bet: f64, win: f64) {
        self.refreshes.push((balance, bet, win));
    }

    fn notify(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }
}

#[derive(Default)]
struct RecordingSurface {
    placed: usize,
    clip: Option<Viewport>,
}

impl ReelSurface for RecordingSurface {
    fn place_sprite(&mut self, _reel: usize, _slot: usize, _symbol: &Symbol, _y: f64) {
        self.placed += 1;
    }

    fn clip(&mut self, viewport: Viewport) {
        self.clip = Some(viewport);
    }
}

fn index_of(events: &[SpinEvent], pred: impl Fn(&SpinEvent) -> bool) -> usize {
    events.iter().position(pred).unwrap()
}

fn session(seed: u64) -> GameSession {
    GameSession::with_seed(GameConfig::default(), seed).unwrap()
}

fn session_with(config: GameConfig, seed: u64) -> GameSession {
    GameSession::with_seed(config, seed).unwrap()
}

/// Single-symbol table: every cell matches, every line pays 5oak
fn always_win_config() -> GameConfig {
    GameConfig {
        symbols: SymbolTable::new(vec![Symbol::new("ankh", "ankh.png", [5.0, 20.0, 100.0], 1)]).unwrap(),
        ..Default::default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DISPLAY / RESULT AGREEMENT
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_settled_reels_show_result_grid() {
    let mut session = session(1);
    for frame_ms in [FRAME_MS, 7.0, 33.0, 120.0, 5000.0] {
        session.request_spin(&mut NullSurface).unwrap();
        let grid = session.orchestrator().current_result().unwrap().grid.clone();

        let outcome = session.run_to_idle(frame_ms, &mut NullSurface, &mut NullSurface).unwrap();
        assert_eq!(outcome.result.grid, grid);
        assert_eq!(session.orchestrator().visible_grid(), grid);
    }
}

#[test]
fn test_reel_stop_events_carry_result_columns() {
    let mut session = session(2);
    session.request_spin(&mut NullSurface).unwrap();
    let grid = session.orchestrator().current_result().unwrap().grid.clone();
    session.run_to_idle(FRAME_MS, &mut NullSurface, &mut NullSurface).unwrap();

    let stops: Vec<(usize, Vec<u32>)> = session
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            SpinEvent::ReelStop { reel, symbols } => Some((reel, symbols)),
            _ => None,
        })
        .collect();
    assert_eq!(stops.len(), 5);
    for (reel, symbols) in stops {
        assert_eq!(symbols, grid[reel]);
    }
}

#[test]
fn test_paid_amount_matches_evaluation_of_grid() {
    let mut session = session(3);
    for _ in 0..25 {
        let before = session.ledger().balance();
        session.request_spin(&mut NullSurface).unwrap();
        let outcome = session
            .run_to_idle(FRAME_MS, &mut NullSurface, &mut NullSurface)
            .unwrap()
            .clone();

        let expected = ae_slot::total_win(
            &outcome.result.grid,
            &session.config().paylines,
            &session.config().symbols,
            outcome.result.bet,
        );
        assert_relative_eq!(outcome.win(), expected);
        assert_relative_eq!(session.ledger().current_win(), expected, epsilon = 1e-9);
        assert_relative_eq!(session.ledger().balance(), before - 1.0 + expected, epsilon = 1e-9);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LEDGER
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_insufficient_balance_rejects_without_mutation() {
    let config = GameConfig {
        starting_balance: 0.5,
        ..Default::default()
    };
    let mut session = session_with(config, 4);
    let mut hud = RecordingHud::default();

    let result = session.request_spin(&mut hud);
    assert!(matches!(result, Err(SlotError::InsufficientBalance { .. })));
    assert_eq!(session.phase(), SpinPhase::Idle);
    assert_relative_eq!(session.ledger().balance(), 0.5);
    assert_eq!(session.ledger().current_win(), 0.0);
    assert!(session.orchestrator().current_result().is_none());
    assert_eq!(session.stats().total_spins, 0);
    assert_eq!(
        hud.notices,
        vec![Notice::InsufficientBalance {
            bet: 1.0,
            balance: 0.5
        }]
    );
    assert!(hud.refreshes.is_empty());

    let events = session.drain_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], SpinEvent::SpinRejected { .. }));
}

#[test]
fn test_bet_equal_to_balance_is_accepted() {
    let config = GameConfig {
        starting_balance: 1.0,
        timing: TimingConfig::instant(),
        symbols: SymbolTable::new(vec![
            Symbol::new("a", "a.png", [0.0, 0.0, 0.0], 1),
            Symbol::new("b", "b.png", [0.0, 0.0, 0.0], 1),
        ])
        .unwrap(),
        ..Default::default()
    };
    let mut session = session_with(config, 5);

    session.request_spin(&mut NullSurface).unwrap();
    assert_eq!(session.ledger().balance(), 0.0);
    session.run_to_idle(FRAME_MS, &mut NullSurface, &mut NullSurface).unwrap();

    // Nothing pays, so the next spin bounces
    assert!(session.request_spin(&mut NullSurface).is_err());
}

#[test]
fn test_small_bets_spend_balance_to_zero() {
    let config = GameConfig {
        starting_balance: 0.3,
        default_bet_index: 0,
        timing: TimingConfig::instant(),
        paylines: Vec::new(),
        ..Default::default()
    };
    let mut session = session_with(config, 9);

    let mut accepted = 0;
    for _ in 0..4 {
        if session.request_spin(&mut NullSurface).is_ok() {
            accepted += 1;
            session.run_to_idle(FRAME_MS, &mut NullSurface, &mut NullSurface).unwrap();
        }
    }
    assert_eq!(accepted, 3);
    assert_eq!(session.ledger().balance(), 0.0);
}

#[test]
fn test_bet_debited_once_at_acceptance() {
    let mut session = session(6);
    session.request_spin(&mut NullSurface).unwrap();
    assert_relative_eq!(session.ledger().balance(), 999.0);

    for _ in 0..10 {
        session.tick(FRAME_MS, &mut NullSurface, &mut NullSurface);
        assert_relative_eq!(session.ledger().balance(), 999.0);
    }
}

#[test]
fn test_win_is_credited_and_announced() {
    let mut session = session_with(always_win_config(), 7);
    let mut hud = RecordingHud::default();

    session.handle_input(InputEvent::SpinRequested, &mut hud);
    let outcome = session.run_to_idle(FRAME_MS, &mut NullSurface, &mut hud).unwrap().clone();

    assert_eq!(outcome.evaluation.win_count(), 10);
    assert_relative_eq!(outcome.win(), 1000.0);
    assert_relative_eq!(session.ledger().balance(), 1000.0 - 1.0 + 1000.0);
    assert_relative_eq!(session.ledger().current_win(), 1000.0);
    assert_eq!(
        hud.notices,
        vec![Notice::Win {
            amount: 1000.0,
            line_count: 10
        }]
    );
    assert_eq!(hud.refreshes.last().copied(), Some((1999.0, 1.0, 1000.0)));

    // The next accepted spin clears the win
    session.handle_input(InputEvent::SpinRequested, &mut hud);
    assert_eq!(session.ledger().current_win(), 0.0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// RE-ENTRANCY / INPUT
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_spin_request_mid_spin_is_ignored() {
    let mut session = session(8);
    let mut hud = RecordingHud::default();

    session.handle_input(InputEvent::SpinRequested, &mut hud);
    for _ in 0..30 {
        session.tick(FRAME_MS, &mut NullSurface, &mut hud);
    }
    let spin_id = session.orchestrator().current_result().unwrap().spin_id;
    let grid = session.orchestrator().current_result().unwrap().grid.clone();
    session.drain_events();
    let refreshes = hud.refreshes.len();

    assert!(matches!(
        session.request_spin(&mut hud),
        Err(SlotError::SpinInProgress)
    ));
    session.handle_input(InputEvent::SpinRequested, &mut hud);

    assert_relative_eq!(session.ledger().balance(), 999.0);
    assert_eq!(session.orchestrator().current_result().unwrap().spin_id, spin_id);
    assert_eq!(session.orchestrator().current_result().unwrap().grid, grid);
    assert!(session.drain_events().is_empty());
    assert_eq!(hud.refreshes.len(), refreshes);
    assert!(hud.notices.is_empty());
    assert_eq!(session.phase(), SpinPhase::Spinning);
}

#[test]
fn test_bet_index_saturates() {
    let mut session = session(9);
    let mut hud = RecordingHud::default();

    for _ in 0..20 {
        session.handle_input(InputEvent::BetIncrease, &mut hud);
    }
    assert_eq!(session.ledger().bet_index(), 6);
    assert_relative_eq!(session.ledger().bet(), 10.0);

    for _ in 0..20 {
        session.handle_input(InputEvent::BetDecrease, &mut hud);
    }
    assert_eq!(session.ledger().bet_index(), 0);
    assert_relative_eq!(session.ledger().bet(), 0.10);
    assert_eq!(hud.refreshes.len(), 40);
}

#[test]
fn test_bet_locked_during_spin() {
    let mut session = session(10);
    let mut hud = RecordingHud::default();

    session.handle_input(InputEvent::SpinRequested, &mut hud);
    session.handle_input(InputEvent::BetIncrease, &mut hud);
    session.handle_input(InputEvent::BetDecrease, &mut hud);
    assert_eq!(session.ledger().bet_index(), 3);

    let outcome = session.run_to_idle(FRAME_MS, &mut NullSurface, &mut hud).unwrap();
    assert_relative_eq!(outcome.result.bet, 1.0);

    session.handle_input(InputEvent::BetIncrease, &mut hud);
    assert_eq!(session.ledger().bet_index(), 4);
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENTS / PHASES
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_event_order() {
    let mut session = session_with(always_win_config(), 11);
    session.request_spin(&mut NullSurface).unwrap();
    session.run_to_idle(FRAME_MS, &mut NullSurface, &mut NullSurface).unwrap();
    let events = session.drain_events();

    assert_eq!(events.first(), Some(&SpinEvent::SpinStart { bet: 1.0 }));
    for reel in 0..5 {
        assert_eq!(events[1 + reel], SpinEvent::ReelSpinning { reel });
    }

    for reel in 0..5 {
        let stop = index_of(&events, |e| matches!(e, SpinEvent::ReelStop { reel: r, .. } if *r == reel));
        let settled = index_of(&events, |e| matches!(e, SpinEvent::ReelSettled { reel: r } if *r == reel));
        assert!(stop < settled);
    }

    let n = events.len();
    assert_eq!(events[n - 3], SpinEvent::EvaluateWins);
    assert_eq!(
        events[n - 2],
        SpinEvent::WinPresent {
            amount: 1000.0,
            line_count: 10
        }
    );
    assert_eq!(
        events[n - 1],
        SpinEvent::SpinEnd {
            balance: 1999.0,
            win: 1000.0
        }
    );
}

#[test]
fn test_phases_progress_in_order() {
    let mut session = session(12);
    assert_eq!(session.phase(), SpinPhase::Idle);
    session.request_spin(&mut NullSurface).unwrap();

    let mut phases = vec![session.phase()];
    for _ in 0..10_000 {
        let phase = session.tick(FRAME_MS, &mut NullSurface, &mut NullSurface);
        if phases.last() != Some(&phase) {
            phases.push(phase);
        }
        if phase == SpinPhase::Idle {
            break;
        }
    }
    assert_eq!(phases, vec![SpinPhase::Spinning, SpinPhase::Settling, SpinPhase::Idle]);
}

#[test]
fn test_spin_takes_staggered_duration() {
    let mut session = session(13);
    let total = session.config().timing.total_spin_duration(5);
    session.request_spin(&mut NullSurface).unwrap();

    let mut elapsed = 0.0;
    while session.tick(10.0, &mut NullSurface, &mut NullSurface) != SpinPhase::Idle {
        elapsed += 10.0;
        assert!(elapsed < 10_000.0);
    }
    elapsed += 10.0;
    assert!(elapsed >= total);
    assert!(elapsed < total + 30.0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLABORATORS / STATS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_attach_places_every_slot_and_clips() {
    let session = session(14);
    let mut surface = RecordingSurface::default();
    let mut hud = RecordingHud::default();

    session.attach(&mut surface, &mut hud);
    assert_eq!(surface.placed, 5 * 7);
    assert_eq!(
        surface.clip,
        Some(Viewport {
            x: 125.0,
            y: 90.0,
            width: 650.0,
            height: 360.0
        })
    );
    assert_eq!(hud.refreshes, vec![(1000.0, 1.0, 0.0)]);
}

#[test]
fn test_seeded_sessions_repeat() {
    let run = |seed: u64| {
        let mut session = session(seed);
        (0..5)
            .map(|_| {
                session.request_spin(&mut NullSurface).unwrap();
                session
                    .run_to_idle(FRAME_MS, &mut NullSurface, &mut NullSurface)
                    .unwrap()
                    .result
                    .grid
                    .clone()
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run(77), run(77));
    assert_ne!(run(77), run(78));
}
