//! Browser bindings
//!
//! The host page owns the canvas and the animation loop; it forwards pointer
//! and key events, calls `advance(dt)` once per frame and draws the JSON
//! snapshot it gets back.

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::leaderboard::{LeaderboardError, LeaderboardSink, LocalLeaderboard, MultiSink, ScoreRecord};
use crate::persistence::LocalStorageStore;
use crate::session::Session;
use crate::sim::input::InputEvent;
use crate::sim::snapshot::Snapshot;
use crate::sim::state::GameState;
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Portal Breaker core loaded");
}

/// Hands score records to a JS callback `(recordJson) => Promise | void`
struct JsLeaderboard {
    callback: js_sys::Function,
}

impl LeaderboardSink for JsLeaderboard {
    fn submit(&mut self, record: &ScoreRecord) -> Result<(), LeaderboardError> {
        let json = serde_json::to_string(record)
            .map_err(|e| LeaderboardError::Rejected(e.to_string()))?;
        let result = self
            .callback
            .call1(&JsValue::NULL, &JsValue::from_str(&json))
            .map_err(|e| LeaderboardError::Transport(format!("{e:?}")))?;

        // Async submitters resolve later; failures are only logged
        if let Ok(promise) = result.dyn_into::<js_sys::Promise>() {
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(err) = JsFuture::from(promise).await {
                    log::warn!("Score submission rejected: {:?}", err);
                }
            });
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct Frame<'a> {
    #[serde(flatten)]
    snapshot: &'a Snapshot,
    best_score: u64,
}

#[wasm_bindgen]
pub struct WebGame {
    session: Session,
}

#[wasm_bindgen]
impl WebGame {
    /// `tuning_json` may be empty for defaults. `submit` is an optional
    /// leaderboard callback.
    #[wasm_bindgen(constructor)]
    pub fn new(
        seed: u64,
        player_id: String,
        tuning_json: Option<String>,
        submit: Option<js_sys::Function>,
    ) -> Result<WebGame, JsValue> {
        let tuning = match tuning_json.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(json) => Tuning::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => Tuning::default(),
        };

        let mut sink = MultiSink::new().with(LocalLeaderboard::open(LocalStorageStore));
        if let Some(callback) = submit {
            sink = sink.with(JsLeaderboard { callback });
        }

        let state = GameState::with_tuning(seed, tuning);
        let session = Session::new(
            state,
            Box::new(sink),
            Box::new(LocalStorageStore),
            player_id,
        );
        Ok(WebGame { session })
    }

    /// Advance by `dt` seconds and return the frame as JSON
    pub fn advance(&mut self, dt: f32) -> Result<String, JsValue> {
        let snapshot = self.session.advance(dt);
        let frame = Frame {
            snapshot: &snapshot,
            best_score: self.session.best_score(),
        };
        serde_json::to_string(&frame).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Pointer x in playfield coordinates
    pub fn pointer_move(&mut self, x: f32) {
        self.session.handle_input(InputEvent::PointerMove { x });
    }

    pub fn primary_action(&mut self) {
        self.session.handle_input(InputEvent::PrimaryAction);
    }

    /// Returns true if the key is bound (so the page can preventDefault)
    pub fn key_down(&mut self, key: &str) -> bool {
        match InputEvent::from_key(key) {
            Some(event) => {
                self.session.handle_input(event);
                true
            }
            None => false,
        }
    }

    pub fn best_score(&self) -> u64 {
        self.session.best_score()
    }

    pub fn playfield_width(&self) -> f32 {
        self.session.state().field_width
    }

    pub fn playfield_height(&self) -> f32 {
        self.session.state().field_height
    }
}
