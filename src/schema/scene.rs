use serde::{Deserialize, Serialize};

use super::effect::EffectRange;

/// One branch offered at the end of a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    /// Target scene id.
    pub next: String,
}

impl Choice {
    pub fn new(text: impl Into<String>, next: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            next: next.into(),
        }
    }
}

/// A single node of the story graph.
///
/// A scene moves on either linearly through `next` or by player choice
/// through `choices`. When both are present, `choices` wins; when neither
/// is, the scene is an ending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<EffectRange>,
}

/// How playback leaves a scene once its text has been revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<'a> {
    Choices(&'a [Choice]),
    Next(&'a str),
    Ending,
}

impl Scene {
    /// A scene with text only; an ending until a transition is attached.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            next: None,
            choices: None,
            effects: Vec::new(),
        }
    }

    pub fn with_next(mut self, next: impl Into<String>) -> Self {
        self.next = Some(next.into());
        self
    }

    pub fn with_choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = Some(choices);
        self
    }

    pub fn with_effects(mut self, effects: Vec<EffectRange>) -> Self {
        self.effects = effects;
        self
    }

    /// Resolve the transition mode. An empty `choices` list offers nothing
    /// to pick, so it falls through to `next`.
    pub fn transition(&self) -> Transition<'_> {
        match (&self.choices, &self.next) {
            (Some(choices), _) if !choices.is_empty() => Transition::Choices(choices),
            (_, Some(next)) => Transition::Next(next),
            _ => Transition::Ending,
        }
    }

    pub fn is_ending(&self) -> bool {
        self.transition() == Transition::Ending
    }
}
