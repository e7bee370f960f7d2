//! Error types.
//!
//! `EngineError::IllegalMove` is the expected rejection path: the caller
//! ignores the input and the board is untouched. `InvariantViolation` is
//! a programming-defect signal and is logged before being returned.

use thiserror::Error;

/// Errors produced by the board and the move selector.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The move targets an occupied cell or the game has already ended.
    #[error("illegal move at cell {index}")]
    IllegalMove { index: usize },

    /// A condition that correct orchestration can never produce.
    #[error("invariant violation: {0}")]
    InvariantViolation(&'static str),
}

/// Errors from loading or saving the score tally.
#[derive(Debug, Error)]
pub enum ScoreStoreError {
    #[error("score store I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("score record malformed: {0}")]
    Format(#[from] serde_json::Error),
}
