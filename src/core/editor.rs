/// Story editor — command operations for authoring a story graph.
///
/// Edits happen on a [`SceneDraft`], the loosely typed form state an
/// authoring UI holds. The graph only changes when a draft is saved, and a
/// draft that fails validation changes nothing.
use thiserror::Error;
use tracing::info;

use crate::core::segment::{validate_effects, EffectError};
use crate::schema::effect::{EffectKind, EffectRange};
use crate::schema::scene::{Choice, Scene};
use crate::schema::story::{StoryError, StoryGraph};

/// File name used when exporting a story.
pub const EXPORT_FILE_NAME: &str = "story.json";

/// Placeholder text for freshly added scenes.
pub const NEW_SCENE_TEXT: &str = "Enter the text for the new scene";

/// Characters of scene text shown in the scene list.
const PREVIEW_CHARS: usize = 30;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("scene id must not be empty")]
    EmptySceneId,
    #[error("effect {index}: {field} '{value}' is not a non-negative integer")]
    InvalidEffectBound {
        index: usize,
        field: &'static str,
        value: String,
    },
    #[error("invalid effect: {0}")]
    Effect(#[from] EffectError),
    #[error("no scene selected")]
    NoSelection,
    #[error("scene not found: {0}")]
    UnknownScene(String),
    #[error("story error: {0}")]
    Story(#[from] StoryError),
}

/// A choice row as typed into the editor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChoiceDraft {
    pub text: String,
    pub next: String,
}

/// An effect row as typed into the editor; bounds are still raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectDraft {
    pub start: String,
    pub end: String,
    pub kind: EffectKind,
}

impl Default for EffectDraft {
    fn default() -> Self {
        Self {
            start: "0".to_string(),
            end: "10".to_string(),
            kind: EffectKind::Large,
        }
    }
}

/// Which transition section of the form is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionDraft {
    Next(String),
    Choices(Vec<ChoiceDraft>),
}

/// Editable form state for one scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneDraft {
    pub id: String,
    pub text: String,
    pub transition: TransitionDraft,
    pub effects: Vec<EffectDraft>,
}

impl SceneDraft {
    /// A blank draft for a scene with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: String::new(),
            transition: TransitionDraft::Next(String::new()),
            effects: Vec::new(),
        }
    }

    /// Fill the form from a stored scene.
    pub fn from_scene(id: &str, scene: &Scene) -> Self {
        let transition = match &scene.choices {
            Some(choices) => TransitionDraft::Choices(
                choices
                    .iter()
                    .map(|c| ChoiceDraft {
                        text: c.text.clone(),
                        next: c.next.clone(),
                    })
                    .collect(),
            ),
            None => TransitionDraft::Next(scene.next.clone().unwrap_or_default()),
        };
        let effects = scene
            .effects
            .iter()
            .map(|e| EffectDraft {
                start: e.start.to_string(),
                end: e.end.to_string(),
                kind: e.kind.clone(),
            })
            .collect();

        Self {
            id: id.to_string(),
            text: scene.text.clone(),
            transition,
            effects,
        }
    }

    /// Validate the form and produce the scene id and scene to store.
    ///
    /// Ids and targets are trimmed. A blank `next` is dropped, and so is any
    /// choice missing its text or target; if no choice survives, the scene
    /// gets no `choices` at all.
    pub fn build(&self) -> Result<(String, Scene), EditorError> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(EditorError::EmptySceneId);
        }

        let mut scene = Scene::new(self.text.clone());
        match &self.transition {
            TransitionDraft::Next(next) => {
                let next = next.trim();
                if !next.is_empty() {
                    scene.next = Some(next.to_string());
                }
            }
            TransitionDraft::Choices(drafts) => {
                let choices: Vec<Choice> = drafts
                    .iter()
                    .map(|c| (c.text.trim(), c.next.trim()))
                    .filter(|(text, next)| !text.is_empty() && !next.is_empty())
                    .map(|(text, next)| Choice::new(text, next))
                    .collect();
                if !choices.is_empty() {
                    scene.choices = Some(choices);
                }
            }
        }

        for (index, draft) in self.effects.iter().enumerate() {
            let start = parse_bound(index, "start", &draft.start)?;
            let end = parse_bound(index, "end", &draft.end)?;
            if start > end {
                return Err(EffectError::Inverted { index, start, end }.into());
            }
            scene.effects.push(EffectRange::new(start, end, draft.kind.clone()));
        }

        Ok((id.to_string(), scene))
    }
}

fn parse_bound(index: usize, field: &'static str, value: &str) -> Result<usize, EditorError> {
    value
        .trim()
        .parse()
        .map_err(|_| EditorError::InvalidEffectBound {
            index,
            field,
            value: value.to_string(),
        })
}

/// One row of the scene list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSummary {
    pub id: String,
    pub preview: String,
}

/// Authoring session over a story graph.
#[derive(Debug, Clone, Default)]
pub struct StoryEditor {
    graph: StoryGraph,
    selected: Option<String>,
}

impl StoryEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_graph(graph: StoryGraph) -> Self {
        Self {
            graph,
            selected: None,
        }
    }

    pub fn graph(&self) -> &StoryGraph {
        &self.graph
    }

    pub fn into_graph(self) -> StoryGraph {
        self.graph
    }

    /// Id of the scene open in the form.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Open a scene for editing.
    pub fn select(&mut self, id: &str) -> Result<SceneDraft, EditorError> {
        let scene = self
            .graph
            .get(id)
            .ok_or_else(|| EditorError::UnknownScene(id.to_string()))?;
        let draft = SceneDraft::from_scene(id, scene);
        self.selected = Some(id.to_string());
        Ok(draft)
    }

    /// Insert a placeholder scene under the first free `new_scene` id and
    /// open it.
    pub fn add_scene(&mut self) -> SceneDraft {
        let mut id = "new_scene".to_string();
        let mut counter = 1;
        while self.graph.contains(&id) {
            id = format!("new_scene_{counter}");
            counter += 1;
        }

        let scene = Scene::new(NEW_SCENE_TEXT);
        let draft = SceneDraft::from_scene(&id, &scene);
        self.graph.put(id.clone(), scene);
        self.selected = Some(id);
        draft
    }

    /// Validate `draft` and store it. Returns the saved id.
    ///
    /// If the draft's id differs from the selected scene's, the scene is
    /// renamed: the old entry is removed.
    pub fn save_scene(&mut self, draft: &SceneDraft) -> Result<String, EditorError> {
        let (id, scene) = draft.build()?;

        if let Some(previous) = self.selected.take() {
            if previous != id {
                self.graph.remove(&previous);
                info!(from = %previous, to = %id, "scene renamed");
            }
        }

        self.graph.put(id.clone(), scene);
        self.selected = Some(id.clone());
        info!(scene = %id, "scene saved");
        Ok(id)
    }

    /// Remove the selected scene.
    pub fn delete_current(&mut self) -> Result<Scene, EditorError> {
        let id = self.selected.take().ok_or(EditorError::NoSelection)?;
        let scene = self
            .graph
            .remove(&id)
            .ok_or_else(|| EditorError::UnknownScene(id.clone()))?;
        info!(scene = %id, "scene deleted");
        Ok(scene)
    }

    /// Scene ids with a one-line preview of their text, in story order.
    pub fn scene_list(&self) -> Vec<SceneSummary> {
        self.graph
            .iter()
            .map(|(id, scene)| SceneSummary {
                id: id.to_string(),
                preview: scene
                    .text
                    .chars()
                    .take(PREVIEW_CHARS)
                    .map(|ch| if ch == '\n' { ' ' } else { ch })
                    .collect(),
            })
            .collect()
    }

    /// Effect lists that are unordered, overlapping, or run past their text.
    ///
    /// Playback tolerates all of these; this is a report for authors.
    pub fn effect_issues(&self) -> Vec<(String, EffectError)> {
        self.graph
            .iter()
            .filter_map(|(id, scene)| {
                validate_effects(&scene.text, &scene.effects)
                    .err()
                    .map(|e| (id.to_string(), e))
            })
            .collect()
    }

    /// Replace the whole story with the one in `bytes`. On a parse error
    /// the current story is kept. Returns the number of scenes loaded.
    pub fn import(&mut self, bytes: &[u8]) -> Result<usize, EditorError> {
        let graph = StoryGraph::from_json(bytes)?;
        self.graph = graph;
        self.selected = None;
        info!(scenes = self.graph.len(), "story imported");
        Ok(self.graph.len())
    }

    /// Serialize the story for download as [`EXPORT_FILE_NAME`].
    pub fn export(&self) -> Result<Vec<u8>, EditorError> {
        Ok(self.graph.to_json()?)
    }
}
