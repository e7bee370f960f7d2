//! Core engine: cells, board rules, RNG, errors.

pub mod board;
pub mod cell;
pub mod error;
pub mod rng;

pub use board::{Board, GameStatus, MoveOutcome, CENTER, CORNERS, WINNING_LINES};
pub use cell::{Cell, Side};
pub use error::{EngineError, ScoreStoreError};
pub use rng::{GameRng, GameRngState};
