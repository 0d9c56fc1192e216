/// Rendering sink — where playback output goes.
use serde::Serialize;

use crate::schema::effect::EffectKind;
use crate::schema::scene::Choice;

/// Receives everything the player wants shown.
///
/// Implementations own the actual presentation (a terminal, a DOM tree, a
/// test log); the engine only decides what and when.
pub trait RenderSink {
    /// Append one revealed character, styled by `effect` if present.
    fn emit_char(&mut self, ch: char, effect: Option<&EffectKind>);
    /// Wipe the text area before a new scene starts revealing.
    fn clear_text(&mut self);
    fn show_choices(&mut self, choices: &[Choice]);
    fn hide_choices(&mut self);
    fn show_advance_hint(&mut self);
    fn hide_advance_hint(&mut self);
}

/// One call made on a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkEvent {
    Char {
        ch: char,
        #[serde(skip_serializing_if = "Option::is_none")]
        effect: Option<String>,
    },
    ClearText,
    ShowChoices {
        choices: Vec<Choice>,
    },
    HideChoices,
    ShowAdvanceHint,
    HideAdvanceHint,
}

/// A sink that logs every call, for tests and for hosts that render in
/// batches (the WASM front end drains it once per animation frame).
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    /// Take the recorded events, leaving the log empty.
    pub fn drain(&mut self) -> Vec<SinkEvent> {
        std::mem::take(&mut self.events)
    }

    /// Characters emitted since the last `ClearText`, as a string.
    pub fn visible_text(&self) -> String {
        let start = self
            .events
            .iter()
            .rposition(|e| *e == SinkEvent::ClearText)
            .map_or(0, |idx| idx + 1);
        self.events[start..]
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Char { ch, .. } => Some(*ch),
                _ => None,
            })
            .collect()
    }

    /// Every character emitted, across scenes.
    pub fn all_chars(&self) -> String {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Char { ch, .. } => Some(*ch),
                _ => None,
            })
            .collect()
    }
}

impl RenderSink for RecordingSink {
    fn emit_char(&mut self, ch: char, effect: Option<&EffectKind>) {
        self.events.push(SinkEvent::Char {
            ch,
            effect: effect.map(|e| e.name().to_string()),
        });
    }

    fn clear_text(&mut self) {
        self.events.push(SinkEvent::ClearText);
    }

    fn show_choices(&mut self, choices: &[Choice]) {
        self.events.push(SinkEvent::ShowChoices {
            choices: choices.to_vec(),
        });
    }

    fn hide_choices(&mut self) {
        self.events.push(SinkEvent::HideChoices);
    }

    fn show_advance_hint(&mut self) {
        self.events.push(SinkEvent::ShowAdvanceHint);
    }

    fn hide_advance_hint(&mut self) {
        self.events.push(SinkEvent::HideAdvanceHint);
    }
}
