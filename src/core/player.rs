/// Playback controller — the scene-to-scene state machine.
///
/// Wires the story graph, segment builder, reveal scheduler, and input
/// dispatcher together behind a handful of calls a host UI makes: `start`,
/// `tick`, and `signal`/`press`.
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::core::config::PlayerConfig;
use crate::core::input::{Armed, InputDispatcher, Key, Signal};
use crate::core::reveal::{RevealHandle, RevealScheduler, RevealStatus};
use crate::core::segment::build_segments;
use crate::core::sink::RenderSink;
use crate::schema::scene::{Choice, Transition};
use crate::schema::story::StoryGraph;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    #[error("scene not found: {0}")]
    UnknownScene(String),
}

/// Where playback currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing started yet.
    Idle,
    /// Scene text is being typed out; input is ignored.
    Revealing,
    /// Text done; waiting for an advance signal.
    AwaitingAdvance,
    /// Text done; choices are on screen.
    AwaitingChoice,
    /// An ending scene finished. Only a restart leaves this state.
    Terminal,
    /// A transition pointed at a scene that does not exist.
    Halted { missing: String },
}

impl PlaybackState {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Terminal | Self::Halted { .. })
    }
}

/// What a signal did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    /// The signal does not apply in the current state.
    Ignored,
    /// Playback moved to this scene.
    Entered(String),
}

/// Plays one story.
///
/// The player owns its graph and is the only authority on which scene and
/// which reveal are current. All operations take `&mut self`, so ticks and
/// signals are processed one at a time; a multi-threaded host should keep
/// the player behind a single `Mutex` or drive it from one task.
#[derive(Debug)]
pub struct Player {
    graph: StoryGraph,
    config: PlayerConfig,
    scheduler: RevealScheduler,
    input: InputDispatcher,
    state: PlaybackState,
    current: Option<String>,
    reveal: Option<RevealHandle>,
}

impl Player {
    pub fn new(graph: StoryGraph, config: PlayerConfig) -> Self {
        let input = InputDispatcher::new(config.number_shortcuts);
        Self {
            graph,
            config,
            scheduler: RevealScheduler::new(),
            input,
            state: PlaybackState::Idle,
            current: None,
            reveal: None,
        }
    }

    pub fn graph(&self) -> &StoryGraph {
        &self.graph
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Id of the scene being shown, if any.
    pub fn current_scene(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Choices on screen; empty unless awaiting a choice.
    pub fn current_choices(&self) -> &[Choice] {
        if self.state != PlaybackState::AwaitingChoice {
            return &[];
        }
        match self.current_transition() {
            Some(Transition::Choices(choices)) => choices,
            _ => &[],
        }
    }

    /// When the next character is due, while revealing.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// Jump to `scene_id`, abandoning whatever was playing.
    ///
    /// An unknown id halts playback and leaves the sink untouched.
    pub fn start(
        &mut self,
        scene_id: &str,
        now: Duration,
        sink: &mut impl RenderSink,
    ) -> Result<(), PlayerError> {
        self.enter(scene_id, now, sink)
    }

    /// Start over from the configured start scene.
    pub fn restart(&mut self, now: Duration, sink: &mut impl RenderSink) -> Result<(), PlayerError> {
        let start = self.config.start_scene.clone();
        self.enter(&start, now, sink)
    }

    /// Advance the reveal to `now`, moving to the awaiting state once the
    /// scene's text is complete.
    pub fn tick(&mut self, now: Duration, sink: &mut impl RenderSink) -> &PlaybackState {
        if let RevealStatus::Finished(handle) = self.scheduler.tick(now, sink) {
            if self.reveal == Some(handle) && self.state == PlaybackState::Revealing {
                self.reveal = None;
                self.finish_scene(sink);
            }
        }
        &self.state
    }

    /// Apply a player signal.
    pub fn signal(
        &mut self,
        signal: Signal,
        now: Duration,
        sink: &mut impl RenderSink,
    ) -> Result<Handled, PlayerError> {
        let Some(target) = self.target_for(signal) else {
            return Ok(Handled::Ignored);
        };
        self.enter(&target, now, sink)?;
        Ok(Handled::Entered(target))
    }

    /// Route a raw key through the input dispatcher.
    pub fn press(
        &mut self,
        key: Key,
        now: Duration,
        sink: &mut impl RenderSink,
    ) -> Result<Handled, PlayerError> {
        match self.input.dispatch(key) {
            Some(signal) => self.signal(signal, now, sink),
            None => {
                debug!(?key, armed = ?self.input.armed(), "key ignored");
                Ok(Handled::Ignored)
            }
        }
    }

    fn current_transition(&self) -> Option<Transition<'_>> {
        let id = self.current.as_deref()?;
        self.graph.get(id).map(|scene| scene.transition())
    }

    fn target_for(&self, signal: Signal) -> Option<String> {
        match (&self.state, signal, self.current_transition()) {
            (PlaybackState::AwaitingAdvance, Signal::Advance, Some(Transition::Next(next))) => {
                Some(next.to_string())
            }
            (
                PlaybackState::AwaitingChoice,
                Signal::Choose(index),
                Some(Transition::Choices(choices)),
            ) => match choices.get(index) {
                Some(choice) => Some(choice.next.clone()),
                None => {
                    warn!(index, available = choices.len(), "choice index out of range");
                    None
                }
            },
            (state, signal, _) => {
                debug!(?state, ?signal, "signal ignored");
                None
            }
        }
    }

    fn enter(
        &mut self,
        scene_id: &str,
        now: Duration,
        sink: &mut impl RenderSink,
    ) -> Result<(), PlayerError> {
        let Some(scene) = self.graph.get(scene_id) else {
            error!(scene = scene_id, from = ?self.current, "scene not found; playback halted");
            self.scheduler.cancel();
            self.reveal = None;
            self.input.disarm();
            self.state = PlaybackState::Halted {
                missing: scene_id.to_string(),
            };
            return Err(PlayerError::UnknownScene(scene_id.to_string()));
        };

        let segments = build_segments(&scene.text, &scene.effects);
        debug!(scene = scene_id, segments = segments.len(), "entering scene");

        sink.hide_choices();
        sink.hide_advance_hint();
        sink.clear_text();

        self.input.disarm();
        self.current = Some(scene_id.to_string());
        self.state = PlaybackState::Revealing;
        self.reveal = Some(self.scheduler.reveal(segments, self.config.type_delay(), now));

        // The first character shows up immediately.
        self.tick(now, sink);
        Ok(())
    }

    fn finish_scene(&mut self, sink: &mut impl RenderSink) {
        let transition = self
            .current
            .as_deref()
            .and_then(|id| self.graph.get(id))
            .map(|scene| scene.transition());

        match transition {
            Some(Transition::Choices(choices)) => {
                sink.show_choices(choices);
                self.input.arm(Armed::Choices(choices.len()));
                self.state = PlaybackState::AwaitingChoice;
            }
            Some(Transition::Next(_)) => {
                sink.show_advance_hint();
                self.input.arm(Armed::Advance);
                self.state = PlaybackState::AwaitingAdvance;
            }
            Some(Transition::Ending) | None => {
                self.input.disarm();
                self.state = PlaybackState::Terminal;
            }
        }
        debug!(scene = ?self.current, state = ?self.state, "scene revealed");
    }
}
