//! Bot move selection.
//!
//! A layered heuristic, not a search: take an immediate win, otherwise
//! block the opponent's immediate win, otherwise center, otherwise a
//! random empty corner, otherwise any random empty cell. The win and
//! block layers scan cells 0..9 ascending and return the first hit, so
//! selection is deterministic up to the two random fallback layers.
//!
//! One-ply lookahead only; this reliably converts and denies immediate
//! wins and otherwise plays plausibly.

use smallvec::SmallVec;
use tracing::error;

use crate::core::{Board, EngineError, GameRng, GameStatus, Side, CENTER, CORNERS};

/// Pick a cell for `self_side` on a board where it is `self_side`'s turn.
///
/// Never returns an occupied cell. Calling this with a full board is an
/// orchestration defect and yields `InvariantViolation`.
pub fn select_move(
    board: &Board,
    self_side: Side,
    opponent_side: Side,
    rng: &mut GameRng,
) -> Result<usize, EngineError> {
    if board.is_full() {
        let err = EngineError::InvariantViolation("move selector called with no empty cells");
        error!(%err, "selector invoked on a full board");
        return Err(err);
    }

    // Layer 1: win now.
    if let Some(index) = first_winning_cell(board, self_side) {
        return Ok(index);
    }

    // Layer 2: block the opponent's win.
    if let Some(index) = first_winning_cell(board, opponent_side) {
        return Ok(index);
    }

    // Layer 3: center.
    if board.cell(CENTER).is_empty() {
        return Ok(CENTER);
    }

    // Layer 4: random empty corner.
    let corners: SmallVec<[usize; 4]> = CORNERS
        .into_iter()
        .filter(|&i| board.cell(i).is_empty())
        .collect();
    if let Some(&index) = rng.choose(&corners) {
        return Ok(index);
    }

    // Layer 5: any random empty cell.
    let empties = board.empty_cells();
    rng.choose(&empties).copied().ok_or_else(|| {
        // Unreachable: the full-board case was rejected above.
        let err = EngineError::InvariantViolation("no candidate cells remain");
        error!(%err, "selector fallback found no cells");
        err
    })
}

/// First empty cell (ascending) where placing `side` wins immediately.
fn first_winning_cell(board: &Board, side: Side) -> Option<usize> {
    for index in 0..9 {
        if !board.cell(index).is_empty() {
            continue;
        }

        let mut probe = board.clone();
        if let Ok(outcome) = probe.apply_move(index, side) {
            if outcome.status == GameStatus::Won(side) {
                return Some(index);
            }
        }
    }
    None
}
