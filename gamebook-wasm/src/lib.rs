//! WASM bindings for gamebook-engine — powers the browser player.
//!
//! The page owns the clock: it calls `tick` from `requestAnimationFrame`
//! with `performance.now()` and applies the returned sink events to the DOM.

use std::time::Duration;
use wasm_bindgen::prelude::*;

use gamebook_engine::core::config::PlayerConfig;
use gamebook_engine::core::input::{Key, Signal};
use gamebook_engine::core::player::{PlaybackState, Player};
use gamebook_engine::core::sink::{RecordingSink, SinkEvent};
use gamebook_engine::schema::story::StoryGraph;

// ---------------------------------------------------------------------------
// Embedded story data — compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const NIGHT_WALK_STORY: &str = include_str!("../../story_data/night_walk/story.json");
}

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct Frame {
    state: &'static str,
    scene: Option<String>,
    /// Milliseconds until the next tick is due, if a reveal is running.
    next_deadline_ms: Option<f64>,
    events: Vec<SinkEvent>,
}

fn state_label(state: &PlaybackState) -> &'static str {
    match state {
        PlaybackState::Idle => "idle",
        PlaybackState::Revealing => "revealing",
        PlaybackState::AwaitingAdvance => "awaiting_advance",
        PlaybackState::AwaitingChoice => "awaiting_choice",
        PlaybackState::Terminal => "terminal",
        PlaybackState::Halted { .. } => "halted",
    }
}

fn millis(now_ms: f64) -> Duration {
    Duration::from_secs_f64(now_ms.max(0.0) / 1000.0)
}

fn to_js_error(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

// ---------------------------------------------------------------------------
// GamebookPlayer — main WASM entry point
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct GamebookPlayer {
    player: Player,
    sink: RecordingSink,
}

#[wasm_bindgen]
impl GamebookPlayer {
    /// Player for the bundled night walk story.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<GamebookPlayer, JsError> {
        Self::from_json(data::NIGHT_WALK_STORY, 50)
    }

    /// Player for a story supplied as JSON text.
    pub fn from_json(story_json: &str, type_delay_ms: u32) -> Result<GamebookPlayer, JsError> {
        let graph = StoryGraph::from_json(story_json.as_bytes()).map_err(to_js_error)?;
        let config = PlayerConfig {
            type_delay_ms: u64::from(type_delay_ms),
            ..PlayerConfig::default()
        };
        Ok(GamebookPlayer {
            player: Player::new(graph, config),
            sink: RecordingSink::new(),
        })
    }

    /// Begin at the configured start scene. Returns a frame as JSON.
    pub fn restart(&mut self, now_ms: f64) -> Result<String, JsError> {
        self.player
            .restart(millis(now_ms), &mut self.sink)
            .map_err(to_js_error)?;
        self.frame()
    }

    /// Jump to any scene.
    pub fn start(&mut self, scene_id: &str, now_ms: f64) -> Result<String, JsError> {
        self.player
            .start(scene_id, millis(now_ms), &mut self.sink)
            .map_err(to_js_error)?;
        self.frame()
    }

    /// Advance the reveal to `now_ms`.
    pub fn tick(&mut self, now_ms: f64) -> Result<String, JsError> {
        self.player.tick(millis(now_ms), &mut self.sink);
        self.frame()
    }

    /// Space or a tap on the text area.
    pub fn advance(&mut self, now_ms: f64) -> Result<String, JsError> {
        self.send(Signal::Advance, now_ms)
    }

    /// A click on choice button `index` (0-based).
    pub fn choose(&mut self, index: usize, now_ms: f64) -> Result<String, JsError> {
        self.send(Signal::Choose(index), now_ms)
    }

    /// A key press, as `KeyboardEvent.key`.
    pub fn key(&mut self, key: &str, now_ms: f64) -> Result<String, JsError> {
        let mut chars = key.chars();
        let key = match (chars.next(), chars.next()) {
            (Some(ch), None) => Key::from_char(ch),
            _ => Key::Other,
        };
        self.player
            .press(key, millis(now_ms), &mut self.sink)
            .map_err(to_js_error)?;
        self.frame()
    }

    /// Ids of every scene, in story order.
    pub fn scene_ids(&self) -> Result<String, JsError> {
        let ids: Vec<&str> = self.player.graph().keys().collect();
        serde_json::to_string(&ids).map_err(to_js_error)
    }
}

impl GamebookPlayer {
    fn send(&mut self, signal: Signal, now_ms: f64) -> Result<String, JsError> {
        self.player
            .signal(signal, millis(now_ms), &mut self.sink)
            .map_err(to_js_error)?;
        self.frame()
    }

    fn frame(&mut self) -> Result<String, JsError> {
        let frame = Frame {
            state: state_label(self.player.state()),
            scene: self.player.current_scene().map(str::to_string),
            next_deadline_ms: self
                .player
                .next_deadline()
                .map(|d| d.as_secs_f64() * 1000.0),
            events: self.sink.drain(),
        };
        serde_json::to_string(&frame).map_err(to_js_error)
    }
}
