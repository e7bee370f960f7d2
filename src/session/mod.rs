//! Game session orchestration.
//!
//! The session sits between the presentation layer and the engine. Input
//! arrives as named events (`CellClicked`, `ResetRequested`, ...) and is
//! processed synchronously, one event at a time; the session answers with
//! the events the presentation layer needs to render (which cell changed,
//! the winning line, the new tally).
//!
//! The bot move is deliberately deferred: instead of moving inline the
//! session emits `BotMoveRequested` with a randomized "thinking" delay
//! and waits for the presentation layer to send `BotMoveReady` after
//! scheduling it. Every reset bumps a generation counter, and a
//! `BotMoveReady` carrying a stale generation is discarded - a pending
//! bot move must never land on a board it was not computed for.

use im::Vector;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::core::{Board, GameRng, GameStatus, Side};
use crate::score::{ScoreStore, ScoreTally};
use crate::selector::select_move;

/// The side the bot plays in `HumanVsBot` mode.
pub const BOT_SIDE: Side = Side::O;

/// Bounds of the randomized bot "thinking" delay, in milliseconds.
pub const BOT_DELAY_MS: std::ops::Range<u64> = 800..2000;

/// Whether side O is a human or the bot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    HumanVsHuman,
    HumanVsBot,
}

/// Input events from the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// A human clicked cell 0..8.
    CellClicked(usize),
    /// Start a fresh game (also the modal's "play again").
    ResetRequested,
    /// Switch mode; always implies a fresh game.
    ModeChanged(GameMode),
    /// Zero the score tally.
    ResetScoresRequested,
    /// The deferred bot move timer fired.
    BotMoveReady { generation: u64 },
}

/// Events emitted for the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A cell was marked; render it.
    CellChanged { index: usize, side: Side },
    /// The game reached a terminal status; `winning_line` is present
    /// when won, for highlighting.
    GameEnded {
        status: GameStatus,
        winning_line: Option<[usize; 3]>,
    },
    /// Schedule `BotMoveReady { generation }` after `delay_ms`; input
    /// stays disabled until it is delivered.
    BotMoveRequested { generation: u64, delay_ms: u64 },
    /// The board was replaced with a fresh one.
    BoardReset,
    /// The tally changed; render the scoreboard.
    ScoresChanged(ScoreTally),
}

/// One applied move, for the per-game history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub side: Side,
    pub index: usize,
}

/// A running game session: board, mode, tally, and the stale-move guard.
pub struct GameSession {
    board: Board,
    mode: GameMode,
    tally: ScoreTally,
    store: Box<dyn ScoreStore>,
    rng: GameRng,
    /// Bumped on every reset; stale deferred bot moves are discarded.
    generation: u64,
    bot_pending: bool,
    history: Vector<MoveRecord>,
}

impl GameSession {
    /// Create a session with an entropy-seeded RNG.
    ///
    /// The tally is loaded from the store; a load failure is logged and
    /// falls back to zeros rather than failing session creation.
    pub fn new(mode: GameMode, store: Box<dyn ScoreStore>) -> Self {
        Self::with_rng(mode, store, GameRng::from_entropy())
    }

    /// Create a session with a fixed seed, for reproducible play.
    pub fn with_seed(mode: GameMode, store: Box<dyn ScoreStore>, seed: u64) -> Self {
        Self::with_rng(mode, store, GameRng::new(seed))
    }

    fn with_rng(mode: GameMode, store: Box<dyn ScoreStore>, rng: GameRng) -> Self {
        let tally = store.load().unwrap_or_else(|err| {
            warn!(%err, "failed to load score tally, starting from zero");
            ScoreTally::default()
        });

        Self {
            board: Board::new(),
            mode,
            tally,
            store,
            rng,
            generation: 0,
            bot_pending: false,
            history: Vector::new(),
        }
    }

    // === Accessors ===

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    #[must_use]
    pub fn tally(&self) -> ScoreTally {
        self.tally
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a deferred bot move is outstanding. Input is disabled in
    /// this window.
    #[must_use]
    pub fn bot_move_pending(&self) -> bool {
        self.bot_pending
    }

    /// The side to move.
    #[must_use]
    pub fn side_to_move(&self) -> Side {
        self.board.current_side()
    }

    /// Whether the side to move is the bot (drives the "Bot's turn"
    /// label).
    #[must_use]
    pub fn bot_to_move(&self) -> bool {
        self.mode == GameMode::HumanVsBot && self.board.current_side() == BOT_SIDE
    }

    /// Moves applied this game, in order.
    #[must_use]
    pub fn history(&self) -> &Vector<MoveRecord> {
        &self.history
    }

    // === Event processing ===

    /// Process one input event, returning the events to render.
    pub fn handle_event(&mut self, event: InputEvent) -> Vec<SessionEvent> {
        match event {
            InputEvent::CellClicked(index) => self.on_cell_clicked(index),
            InputEvent::ResetRequested => self.reset_game(),
            InputEvent::ModeChanged(mode) => {
                // Mid-game mode changes are not supported; switching
                // always starts a fresh game. The tally survives.
                self.mode = mode;
                self.reset_game()
            }
            InputEvent::ResetScoresRequested => {
                self.tally.reset();
                self.save_tally();
                vec![SessionEvent::ScoresChanged(self.tally)]
            }
            InputEvent::BotMoveReady { generation } => self.on_bot_move_ready(generation),
        }
    }

    fn on_cell_clicked(&mut self, index: usize) -> Vec<SessionEvent> {
        if self.bot_pending {
            debug!(index, "click ignored while bot move is pending");
            return Vec::new();
        }

        self.play_move(index, self.board.current_side())
    }

    fn on_bot_move_ready(&mut self, generation: u64) -> Vec<SessionEvent> {
        if generation != self.generation || !self.bot_pending {
            debug!(
                generation,
                current = self.generation,
                "discarding stale bot move"
            );
            return Vec::new();
        }

        self.bot_pending = false;

        match select_move(&self.board, BOT_SIDE, BOT_SIDE.opponent(), &mut self.rng) {
            Ok(index) => self.play_move(index, BOT_SIDE),
            Err(err) => {
                // The selector logged the invariant violation; the board
                // stays untouched.
                error!(%err, "bot move selection failed");
                Vec::new()
            }
        }
    }

    /// Apply -> evaluate -> either end the game or advance the turn and,
    /// in bot mode, request the deferred bot move.
    fn play_move(&mut self, index: usize, side: Side) -> Vec<SessionEvent> {
        let outcome = match self.board.apply_move(index, side) {
            Ok(outcome) => outcome,
            Err(err) => {
                // Occupied cell or finished game: ignore the input.
                debug!(%err, "move ignored");
                return Vec::new();
            }
        };

        self.history.push_back(MoveRecord { side, index });

        let mut events = vec![SessionEvent::CellChanged { index, side }];

        if outcome.status.is_terminal() {
            self.tally.record(outcome.status);
            self.save_tally();
            events.push(SessionEvent::GameEnded {
                status: outcome.status,
                winning_line: outcome.winning_line,
            });
            events.push(SessionEvent::ScoresChanged(self.tally));
            return events;
        }

        self.board.advance_turn();

        if self.bot_to_move() {
            self.bot_pending = true;
            events.push(SessionEvent::BotMoveRequested {
                generation: self.generation,
                delay_ms: self.rng.gen_range_u64(BOT_DELAY_MS),
            });
        }

        events
    }

    fn reset_game(&mut self) -> Vec<SessionEvent> {
        self.generation += 1;
        self.bot_pending = false;
        self.board.reset();
        self.history.clear();
        vec![SessionEvent::BoardReset]
    }

    fn save_tally(&mut self) {
        // Store failures are non-fatal: the in-memory tally stays
        // authoritative for this session.
        if let Err(err) = self.store.save(&self.tally) {
            warn!(%err, "failed to save score tally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Cell;
    use crate::score::MemoryStore;

    fn session(mode: GameMode) -> GameSession {
        GameSession::with_seed(mode, Box::new(MemoryStore::new()), 42)
    }

    fn cell_changed(events: &[SessionEvent]) -> Option<(usize, Side)> {
        events.iter().find_map(|e| match e {
            SessionEvent::CellChanged { index, side } => Some((*index, *side)),
            _ => None,
        })
    }

    #[test]
    fn test_click_marks_cell_and_alternates() {
        let mut s = session(GameMode::HumanVsHuman);

        let events = s.handle_event(InputEvent::CellClicked(0));
        assert_eq!(cell_changed(&events), Some((0, Side::X)));
        assert_eq!(s.side_to_move(), Side::O);

        let events = s.handle_event(InputEvent::CellClicked(1));
        assert_eq!(cell_changed(&events), Some((1, Side::O)));
        assert_eq!(s.side_to_move(), Side::X);
    }

    #[test]
    fn test_occupied_click_is_ignored() {
        let mut s = session(GameMode::HumanVsHuman);
        s.handle_event(InputEvent::CellClicked(0));

        let events = s.handle_event(InputEvent::CellClicked(0));

        assert!(events.is_empty());
        assert_eq!(s.board().cell(0), Cell::X);
        assert_eq!(s.side_to_move(), Side::O);
    }

    #[test]
    fn test_human_game_to_win() {
        let mut s = session(GameMode::HumanVsHuman);

        // X: 0, 1, 2 (top row). O: 3, 4.
        for index in [0, 3, 1, 4] {
            s.handle_event(InputEvent::CellClicked(index));
        }
        let events = s.handle_event(InputEvent::CellClicked(2));

        assert!(events.contains(&SessionEvent::GameEnded {
            status: GameStatus::Won(Side::X),
            winning_line: Some([0, 1, 2]),
        }));
        assert_eq!(s.tally().wins_x, 1);

        // Session is inert until reset.
        assert!(s.handle_event(InputEvent::CellClicked(5)).is_empty());
    }

    #[test]
    fn test_no_turn_advance_after_terminal() {
        let mut s = session(GameMode::HumanVsHuman);

        for index in [0, 3, 1, 4, 2] {
            s.handle_event(InputEvent::CellClicked(index));
        }

        // X won; the winning side stays the side "to move".
        assert_eq!(s.side_to_move(), Side::X);
    }

    #[test]
    fn test_bot_mode_requests_deferred_move() {
        let mut s = session(GameMode::HumanVsBot);

        let events = s.handle_event(InputEvent::CellClicked(0));

        let requested = events.iter().find_map(|e| match e {
            SessionEvent::BotMoveRequested {
                generation,
                delay_ms,
            } => Some((*generation, *delay_ms)),
            _ => None,
        });
        let (generation, delay_ms) = requested.expect("bot move should be requested");

        assert_eq!(generation, s.generation());
        assert!(BOT_DELAY_MS.contains(&delay_ms));
        assert!(s.bot_move_pending());
        assert!(s.bot_to_move());
    }

    #[test]
    fn test_clicks_ignored_while_bot_pending() {
        let mut s = session(GameMode::HumanVsBot);
        s.handle_event(InputEvent::CellClicked(0));
        assert!(s.bot_move_pending());

        let events = s.handle_event(InputEvent::CellClicked(1));

        assert!(events.is_empty());
        assert_eq!(s.board().cell(1), Cell::Empty);
    }

    #[test]
    fn test_bot_move_ready_plays_for_o() {
        let mut s = session(GameMode::HumanVsBot);
        s.handle_event(InputEvent::CellClicked(0));

        let generation = s.generation();
        let events = s.handle_event(InputEvent::BotMoveReady { generation });

        let (index, side) = cell_changed(&events).expect("bot should move");
        assert_eq!(side, Side::O);
        // Center heuristic: 0 is taken, 4 is free.
        assert_eq!(index, 4);
        assert!(!s.bot_move_pending());
        assert_eq!(s.side_to_move(), Side::X);
    }

    #[test]
    fn test_stale_bot_move_is_discarded() {
        let mut s = session(GameMode::HumanVsBot);
        s.handle_event(InputEvent::CellClicked(0));
        let stale = s.generation();

        s.handle_event(InputEvent::ResetRequested);
        let events = s.handle_event(InputEvent::BotMoveReady { generation: stale });

        assert!(events.is_empty());
        assert_eq!(s.board(), &Board::new());
    }

    #[test]
    fn test_duplicate_bot_move_ready_is_discarded() {
        let mut s = session(GameMode::HumanVsBot);
        s.handle_event(InputEvent::CellClicked(0));

        let generation = s.generation();
        s.handle_event(InputEvent::BotMoveReady { generation });
        let events = s.handle_event(InputEvent::BotMoveReady { generation });

        assert!(events.is_empty());
    }

    #[test]
    fn test_human_mode_never_requests_bot_move() {
        let mut s = session(GameMode::HumanVsHuman);

        let events = s.handle_event(InputEvent::CellClicked(0));

        assert!(!events
            .iter()
            .any(|e| matches!(e, SessionEvent::BotMoveRequested { .. })));
        assert!(!s.bot_move_pending());
    }

    #[test]
    fn test_mode_change_resets_board_preserves_tally() {
        let mut s = session(GameMode::HumanVsHuman);

        for index in [0, 3, 1, 4, 2] {
            s.handle_event(InputEvent::CellClicked(index));
        }
        assert_eq!(s.tally().wins_x, 1);

        s.handle_event(InputEvent::ResetRequested);
        s.handle_event(InputEvent::CellClicked(8));

        let events = s.handle_event(InputEvent::ModeChanged(GameMode::HumanVsBot));

        assert!(events.contains(&SessionEvent::BoardReset));
        assert_eq!(s.board(), &Board::new());
        assert_eq!(s.mode(), GameMode::HumanVsBot);
        assert_eq!(s.tally().wins_x, 1);
    }

    #[test]
    fn test_reset_scores() {
        let mut s = session(GameMode::HumanVsHuman);

        for index in [0, 3, 1, 4, 2] {
            s.handle_event(InputEvent::CellClicked(index));
        }
        assert_eq!(s.tally().games(), 1);

        let events = s.handle_event(InputEvent::ResetScoresRequested);

        assert_eq!(
            events,
            vec![SessionEvent::ScoresChanged(ScoreTally::default())]
        );
        assert_eq!(s.tally(), ScoreTally::default());
    }

    #[test]
    fn test_history_records_moves_in_order() {
        let mut s = session(GameMode::HumanVsHuman);

        for index in [4, 0, 8] {
            s.handle_event(InputEvent::CellClicked(index));
        }

        let history: Vec<_> = s.history().iter().copied().collect();
        assert_eq!(
            history,
            vec![
                MoveRecord {
                    side: Side::X,
                    index: 4
                },
                MoveRecord {
                    side: Side::O,
                    index: 0
                },
                MoveRecord {
                    side: Side::X,
                    index: 8
                },
            ]
        );

        s.handle_event(InputEvent::ResetRequested);
        assert!(s.history().is_empty());
    }

    #[test]
    fn test_seeded_sessions_replay_identically() {
        let mut a = session(GameMode::HumanVsBot);
        let mut b = session(GameMode::HumanVsBot);

        for index in [0, 1, 2] {
            let ea = a.handle_event(InputEvent::CellClicked(index));
            let eb = b.handle_event(InputEvent::CellClicked(index));
            assert_eq!(ea, eb);

            if a.bot_move_pending() {
                let ga = a.generation();
                let gb = b.generation();
                assert_eq!(
                    a.handle_event(InputEvent::BotMoveReady { generation: ga }),
                    b.handle_event(InputEvent::BotMoveReady { generation: gb })
                );
            }
        }

        assert_eq!(a.board(), b.board());
    }
}
