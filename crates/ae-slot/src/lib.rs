//! # ae-slot — Reel engine core for the Pharaoh Reels slot
//!
//! Owns everything between "spin pressed" and "win credited": the weighted
//! symbol table, payline evaluation, per-reel strip animation, the spin
//! state machine and the balance ledger. Rendering, input and the backend
//! are collaborators reached through traits.
//!
//! ## Architecture
//!
//! ```text
//! GameSession
//!     │
//!     ├── SessionLedger (balance, bet table, current win)
//!     └── SpinOrchestrator
//!           ├── SymbolTable (weighted draw)
//!           ├── Payline table ──> WinEvaluator
//!           └── ReelState × reels (scroll, snap, bounce)
//!                 │
//!                 v
//!           SpinResult (fixed before animation) → SpinEvent log
//! ```
//!
//! ## Spin lifecycle
//!
//! `Idle → Validating → Spinning → Settling → Idle`. The grid is drawn in
//! `Validating`, before any reel moves, and every reel snaps to its column
//! of that grid when its staggered duration runs out.

pub mod config;
pub mod error;
pub mod ledger;
pub mod orchestrator;
pub mod paytable;
pub mod reel;
pub mod session;
pub mod spin;
pub mod surface;
pub mod symbols;
pub mod timing;

pub use config::*;
pub use error::*;
pub use ledger::*;
pub use orchestrator::*;
pub use paytable::*;
pub use reel::*;
pub use session::*;
pub use spin::*;
pub use surface::*;
pub use symbols::*;
pub use timing::*;
