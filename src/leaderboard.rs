//! Score submission and the local high score table
//!
//! The session hands a `ScoreRecord` to a `LeaderboardSink` once per game
//! over. `LocalLeaderboard` is the built-in sink: a top 10 table persisted
//! through a `KeyValueStore`.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StorageError, load_json, save_json};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// Storage key of the high score table
pub const HIGH_SCORES_KEY: &str = "portal_breaker_highscores";

#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    #[error("score rejected: {0}")]
    Rejected(String),
    #[error("leaderboard unreachable: {0}")]
    Transport(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A finished game, as submitted to a leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub player_id: String,
    pub score: u64,
    pub level: u32,
    /// Unix timestamp (ms)
    pub timestamp: f64,
}

/// External score persistence
pub trait LeaderboardSink {
    fn submit(&mut self, record: &ScoreRecord) -> Result<(), LeaderboardError>;
}

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Level reached
    pub level: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Top scores, sorted descending
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the table
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Insert a score if it qualifies. Returns the 1-indexed rank achieved.
    pub fn add_score(&mut self, score: u64, level: u32, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            level,
            timestamp,
        };
        let index = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(index, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(index + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load from storage; missing data is an empty table
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, StorageError> {
        let scores: Self = load_json(store, HIGH_SCORES_KEY)?.unwrap_or_default();
        log::info!("Loaded {} high scores", scores.entries.len());
        Ok(scores)
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        save_json(store, HIGH_SCORES_KEY, self)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

/// Sink that records game overs in the local high score table
pub struct LocalLeaderboard<S: KeyValueStore> {
    store: S,
    scores: HighScores,
}

impl<S: KeyValueStore> LocalLeaderboard<S> {
    /// Open the table in `store`. Unreadable data starts a fresh table.
    pub fn open(store: S) -> Self {
        let scores = HighScores::load(&store).unwrap_or_else(|err| {
            log::warn!("High score table unreadable, starting fresh: {}", err);
            HighScores::new()
        });
        Self { store, scores }
    }

    pub fn scores(&self) -> &HighScores {
        &self.scores
    }
}

impl<S: KeyValueStore> LeaderboardSink for LocalLeaderboard<S> {
    fn submit(&mut self, record: &ScoreRecord) -> Result<(), LeaderboardError> {
        if let Some(rank) = self
            .scores
            .add_score(record.score, record.level, record.timestamp)
        {
            log::info!("New high score #{}: {}", rank, record.score);
            self.scores.save(&mut self.store)?;
        }
        Ok(())
    }
}

/// Forwards each record to several sinks; every sink is tried
#[derive(Default)]
pub struct MultiSink {
    sinks: Vec<Box<dyn LeaderboardSink>>,
}

impl MultiSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl LeaderboardSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl LeaderboardSink for MultiSink {
    fn submit(&mut self, record: &ScoreRecord) -> Result<(), LeaderboardError> {
        let mut first_err = None;
        for sink in &mut self.sinks {
            if let Err(err) = sink.submit(record) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

/// Wall-clock time in ms since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
