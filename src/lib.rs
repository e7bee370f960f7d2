//! # xo-engine
//!
//! A two-mode (human-vs-human, human-vs-bot) tic-tac-toe engine. The
//! crate is the game core only: board state, turn management, win/draw
//! detection, the bot's move heuristic, and session orchestration.
//! Rendering, input capture, and timers belong to a presentation layer
//! that feeds `InputEvent`s in and renders the `SessionEvent`s that come
//! back.
//!
//! ## Design
//!
//! - **Pure rules core**: `Board` owns its nine cells exclusively; no
//!   I/O, no aliasing, every mutation goes through `apply_move`.
//! - **One-ply heuristic bot**: win now, block, center, corner, anywhere.
//!   Deliberately not minimax; it converts and denies immediate wins and
//!   otherwise plays plausibly.
//! - **Deferred bot moves**: the session emits `BotMoveRequested` with a
//!   randomized delay and a generation counter; stale completions after
//!   a reset are discarded instead of landing on the new board.
//! - **Injected score store**: the cross-game tally is loaded and saved
//!   through a `ScoreStore` capability (in-memory or JSON file).
//! - **Deterministic randomness**: all random choices come from a seeded
//!   ChaCha8 stream, so seeded sessions replay identically.
//!
//! ## Modules
//!
//! - `core`: cells, board rules, RNG, errors
//! - `selector`: the layered bot heuristic
//! - `session`: event-driven orchestration and the stale-move guard
//! - `score`: the tally and its storage capability

pub mod core;
pub mod score;
pub mod selector;
pub mod session;

// Re-export commonly used types
pub use crate::core::{
    Board, Cell, EngineError, GameRng, GameRngState, GameStatus, MoveOutcome, ScoreStoreError,
    Side, CENTER, CORNERS, WINNING_LINES,
};

pub use crate::selector::select_move;

pub use crate::session::{
    GameMode, GameSession, InputEvent, MoveRecord, SessionEvent, BOT_DELAY_MS, BOT_SIDE,
};

pub use crate::score::{JsonFileStore, MemoryStore, ScoreStore, ScoreTally};
