//! Score tally and its storage capability.
//!
//! The tally outlives any single board: it is loaded when a session is
//! created, bumped on every terminal outcome, and cleared only by an
//! explicit score reset. Storage is injected as a `ScoreStore` so the
//! session never hard-wires a persistence mechanism; the crate ships an
//! in-memory store and a JSON file store.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::{GameStatus, ScoreStoreError, Side};

/// Win/draw counts across games.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTally {
    pub wins_x: u32,
    pub wins_o: u32,
    pub draws: u32,
}

impl ScoreTally {
    /// Count a terminal outcome. `InProgress` is not an outcome and is
    /// ignored.
    pub fn record(&mut self, status: GameStatus) {
        match status {
            GameStatus::Won(Side::X) => self.wins_x += 1,
            GameStatus::Won(Side::O) => self.wins_o += 1,
            GameStatus::Drawn => self.draws += 1,
            GameStatus::InProgress => {}
        }
    }

    /// Clear all counts.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Total games recorded.
    #[must_use]
    pub fn games(&self) -> u32 {
        self.wins_x + self.wins_o + self.draws
    }
}

/// Storage capability for the score tally.
pub trait ScoreStore {
    /// Load the persisted tally. A store with nothing persisted yet
    /// returns the zero tally.
    fn load(&self) -> Result<ScoreTally, ScoreStoreError>;

    /// Persist the tally.
    fn save(&mut self, tally: &ScoreTally) -> Result<(), ScoreStoreError>;
}

/// Volatile store for tests and headless embedding.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    tally: Option<ScoreTally>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryStore {
    fn load(&self) -> Result<ScoreTally, ScoreStoreError> {
        Ok(self.tally.unwrap_or_default())
    }

    fn save(&mut self, tally: &ScoreTally) -> Result<(), ScoreStoreError> {
        self.tally = Some(*tally);
        Ok(())
    }
}

/// Store persisting the tally as a JSON record at a fixed path.
///
/// A missing file loads as the zero tally, so first launch needs no
/// setup step.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this store reads and writes.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl ScoreStore for JsonFileStore {
    fn load(&self) -> Result<ScoreTally, ScoreStoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(ScoreTally::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, tally: &ScoreTally) -> Result<(), ScoreStoreError> {
        let json = serde_json::to_string(tally)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
