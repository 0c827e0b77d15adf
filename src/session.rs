//! Adapter-side owner of a run
//!
//! Wraps the simulation with the collaborators it must not touch directly:
//! the leaderboard (one submission per game over) and the key-value store
//! (best score). Collaborator failures are logged and never reach gameplay.

use crate::leaderboard::{LeaderboardSink, ScoreRecord, now_ms};
use crate::persistence::{KeyValueStore, load_json, save_json};
use crate::sim::input::{InputEvent, handle_input};
use crate::sim::snapshot::Snapshot;
use crate::sim::state::{GameEvent, GameState};
use crate::sim::tick::advance;

/// Storage key of the best score
pub const BEST_SCORE_KEY: &str = "portal_breaker_best";

pub struct Session {
    state: GameState,
    sink: Box<dyn LeaderboardSink>,
    store: Box<dyn KeyValueStore>,
    player_id: String,
    best_score: u64,
    best_dirty: bool,
}

impl Session {
    pub fn new(
        state: GameState,
        sink: Box<dyn LeaderboardSink>,
        store: Box<dyn KeyValueStore>,
        player_id: impl Into<String>,
    ) -> Self {
        let best_score = match load_json::<u64>(store.as_ref(), BEST_SCORE_KEY) {
            Ok(best) => best.unwrap_or(0),
            Err(err) => {
                log::warn!("Could not read best score: {}", err);
                0
            }
        };
        log::info!("Session started, best score {}", best_score);

        Self {
            state,
            sink,
            store,
            player_id: player_id.into(),
            best_score,
            best_dirty: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        handle_input(&mut self.state, event);
    }

    /// Advance the simulation and react to its lifecycle events
    pub fn advance(&mut self, dt: f32) -> Snapshot {
        let snapshot = advance(&mut self.state, dt);

        if self.state.score > self.best_score {
            self.best_score = self.state.score;
            self.best_dirty = true;
            self.persist_best();
        }

        for event in &snapshot.events {
            match event {
                GameEvent::GameOver { score, level } => {
                    self.persist_best();
                    self.submit(*score, *level);
                }
                // Retry a write that failed earlier
                GameEvent::LevelComplete { .. } => self.persist_best(),
                _ => {}
            }
        }

        snapshot
    }

    fn submit(&mut self, score: u64, level: u32) {
        let record = ScoreRecord {
            player_id: self.player_id.clone(),
            score,
            level,
            timestamp: now_ms(),
        };
        match self.sink.submit(&record) {
            Ok(()) => log::info!("Score {} submitted for {}", score, self.player_id),
            Err(err) => log::warn!("Score submission failed: {}", err),
        }
    }

    fn persist_best(&mut self) {
        if !self.best_dirty {
            return;
        }
        match save_json(self.store.as_mut(), BEST_SCORE_KEY, &self.best_score) {
            Ok(()) => self.best_dirty = false,
            Err(err) => log::warn!("Could not save best score: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::LeaderboardError;
    use crate::persistence::{MemoryStore, StorageError};
    use crate::sim::state::{Ball, GameStatus};
    use crate::tuning::Tuning;
    use glam::Vec2;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct RecordingSink {
        records: Rc<RefCell<Vec<ScoreRecord>>>,
    }

    impl LeaderboardSink for RecordingSink {
        fn submit(&mut self, record: &ScoreRecord) -> Result<(), LeaderboardError> {
            self.records.borrow_mut().push(record.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl LeaderboardSink for FailingSink {
        fn submit(&mut self, _record: &ScoreRecord) -> Result<(), LeaderboardError> {
            Err(LeaderboardError::Transport("offline".into()))
        }
    }

    /// Shares its map so tests can inspect what the session wrote
    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<MemoryStore>>);

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.borrow().get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.0.borrow_mut().set(key, value)
        }
    }

    fn state_about_to_lose() -> GameState {
        let tuning = Tuning {
            power_up_chance: 0.0,
            ..Tuning::default()
        };
        let mut state = GameState::with_tuning(9, tuning);
        state.start_new_game();
        state.lives = 1;
        state.score = 420;
        state.balls = vec![Ball::new(999, Vec2::new(40.0, 990.0), Vec2::new(0.0, 4.0))];
        state
    }

    #[test]
    fn test_single_submission_per_game_over() {
        let sink = RecordingSink::default();
        let records = sink.records.clone();
        let mut session = Session::new(
            state_about_to_lose(),
            Box::new(sink),
            Box::new(MemoryStore::new()),
            "player-1",
        );

        for _ in 0..30 {
            session.advance(1.0 / 60.0);
        }
        assert_eq!(session.state().status, GameStatus::GameOver);
        let records = records.borrow();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].score, 420);
        assert_eq!(records[0].level, 1);
        assert_eq!(records[0].player_id, "player-1");
    }

    #[test]
    fn test_failing_sink_does_not_affect_game() {
        let mut session = Session::new(
            state_about_to_lose(),
            Box::new(FailingSink),
            Box::new(MemoryStore::new()),
            "player-1",
        );
        for _ in 0..5 {
            session.advance(1.0 / 60.0);
        }
        assert_eq!(session.state().status, GameStatus::GameOver);
        assert_eq!(session.state().score, 420);

        session.handle_input(InputEvent::PrimaryAction);
        assert_eq!(session.state().status, GameStatus::Running);
    }

    #[test]
    fn test_best_score_read_and_written() {
        let store = SharedStore::default();
        store.0.borrow_mut().set(BEST_SCORE_KEY, "300").expect("seed best");

        let mut session = Session::new(
            state_about_to_lose(),
            Box::new(RecordingSink::default()),
            Box::new(store.clone()),
            "player-1",
        );
        assert_eq!(session.best_score(), 300);

        for _ in 0..5 {
            session.advance(1.0 / 60.0);
        }
        assert_eq!(session.best_score(), 420);
        let saved = store.0.borrow().get(BEST_SCORE_KEY).expect("get");
        assert_eq!(saved.as_deref(), Some("420"));
    }

    #[test]
    fn test_lower_score_keeps_best() {
        let store = SharedStore::default();
        store.0.borrow_mut().set(BEST_SCORE_KEY, "5000").expect("seed best");
        let mut session = Session::new(
            state_about_to_lose(),
            Box::new(RecordingSink::default()),
            Box::new(store.clone()),
            "player-1",
        );
        for _ in 0..5 {
            session.advance(1.0 / 60.0);
        }
        assert_eq!(session.best_score(), 5000);
        let saved = store.0.borrow().get(BEST_SCORE_KEY).expect("get");
        assert_eq!(saved.as_deref(), Some("5000"));
    }
}
