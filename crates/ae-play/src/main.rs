//! Pharaoh Reels headless driver
//!
//! Usage:
//!   ae-play                       - 10 spins with the stock config
//!   ae-play --spins 100 --turbo   - faster reels
//!   ae-play --config game.yaml    - load a JSON/YAML config
//!   ae-play --handshake           - log in to the mock backend first

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use ae_connector::{MockTransport, Reply, Request, Transport};
use ae_slot::{
    GameConfig, GameSession, HudDisplay, InputEvent, Notice, NullSurface, SessionStats, SymbolTable,
    TimingConfig,
};

#[derive(Parser)]
#[command(name = "ae-play", about = "Run Pharaoh Reels spins without a renderer")]
struct Cli {
    /// Game config (JSON, or YAML by .yaml/.yml extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of spins to play
    #[arg(short, long, default_value_t = 10)]
    spins: u32,

    /// RNG seed for a reproducible session
    #[arg(long)]
    seed: Option<u64>,

    /// Bet table index to play at
    #[arg(short, long)]
    bet_index: Option<usize>,

    /// Use turbo reel timing
    #[arg(short, long)]
    turbo: bool,

    /// Simulated frame interval (ms)
    #[arg(long, default_value_t = 1000.0 / 60.0)]
    frame_ms: f64,

    /// Log in to the mock backend before playing
    #[arg(long)]
    handshake: bool,
}

/// HUD that prints to stdout
#[derive(Default)]
struct TextHud {
    last: Option<(f64, f64, f64)>,
}

impl HudDisplay for TextHud {
    fn refresh(&mut self, balance: f64, bet: f64, win: f64) {
        if self.last != Some((balance, bet, win)) {
            println!("  balance {:>10.2} | bet {:>6.2} | win {:>8.2}", balance, bet, win);
            self.last = Some((balance, bet, win));
        }
    }

    fn notify(&mut self, notice: &Notice) {
        match notice {
            Notice::InsufficientBalance { bet, balance } => {
                println!("  !! insufficient balance: bet {:.2}, balance {:.2}", bet, balance);
            }
            Notice::Win { amount, line_count } => {
                println!("  ** WIN {:.2} on {} line(s)", amount, line_count);
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.frame_ms.is_nan() || cli.frame_ms <= 0.0 {
        bail!("--frame-ms must be positive, got {}", cli.frame_ms);
    }

    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GameConfig::default(),
    };
    if cli.turbo {
        config.timing = TimingConfig::turbo();
    }

    if cli.handshake {
        handshake()?;
    }

    let mut session = match cli.seed {
        Some(seed) => GameSession::with_seed(config, seed)?,
        None => GameSession::new(config)?,
    };
    log::info!("Starting {} spin(s)", cli.spins);

    let mut hud = TextHud::default();
    session.attach(&mut NullSurface, &mut hud);

    if let Some(target) = cli.bet_index {
        select_bet(&mut session, target, &mut hud)?;
    }

    for n in 1..=cli.spins {
        println!("Spin {}", n);
        session.handle_input(InputEvent::SpinRequested, &mut hud);
        if !session.is_spinning() {
            println!("Stopping: spin was not accepted");
            break;
        }
        if session.run_to_idle(cli.frame_ms, &mut NullSurface, &mut hud).is_none() {
            bail!("spin {} did not settle", n);
        }
        print_window(&session.orchestrator().visible_grid(), session.orchestrator().symbols());
        session.drain_events();
    }

    print_stats(session.stats());
    Ok(())
}

/// Walk the bet index to `target` through the input handler
fn select_bet(session: &mut GameSession, target: usize, hud: &mut TextHud) -> Result<()> {
    let table_len = session.ledger().bet_table().len();
    if target >= table_len {
        bail!("--bet-index {} outside bet table of {}", target, table_len);
    }
    while session.ledger().bet_index() < target {
        session.handle_input(InputEvent::BetIncrease, hud);
    }
    while session.ledger().bet_index() > target {
        session.handle_input(InputEvent::BetDecrease, hud);
    }
    Ok(())
}

fn handshake() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    runtime.block_on(async {
        let transport = MockTransport::new();
        transport.connect().await?;
        for request in [Request::login(), Request::balance()] {
            let reply = transport.send(request).await?;
            log_reply(&reply);
        }
        transport.disconnect().await;
        Ok::<_, anyhow::Error>(())
    })
}

fn log_reply(reply: &Reply) {
    match reply.balance() {
        Some(balance) => println!("Backend: {} (balance {:.2})", reply.status(), balance),
        None => println!("Backend: {}", reply.status()),
    }
}

fn print_window(grid: &[Vec<u32>], symbols: &SymbolTable) {
    let rows = grid.first().map(Vec::len).unwrap_or(0);
    for row in 0..rows {
        let line: Vec<String> = grid
            .iter()
            .map(|col| format!("{:<9}", symbols.name(col[row])))
            .collect();
        println!("  | {} |", line.join(" "));
    }
}

fn print_stats(stats: &SessionStats) {
    println!(
        "Spins {} | wins {} | losses {} | hit rate {:.1}% | RTP {:.1}% | best x{:.1}",
        stats.total_spins,
        stats.wins,
        stats.losses,
        stats.hit_rate(),
        stats.rtp(),
        stats.max_win_ratio
    );
}
