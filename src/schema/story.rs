/// Story graph — scene storage, ordered keys, and the JSON story format.
use rustc_hash::FxHashMap;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;
use thiserror::Error;

use super::scene::Scene;

#[derive(Debug, Error)]
pub enum StoryError {
    #[error("story JSON error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Mapping from scene id to scene.
///
/// Keys keep insertion order: a loaded story lists its scenes in file order,
/// and scenes added later are appended. Replacing an existing scene keeps
/// its position.
#[derive(Debug, Clone, Default)]
pub struct StoryGraph {
    scenes: FxHashMap<String, Scene>,
    order: Vec<String>,
}

impl StoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Scene> {
        self.scenes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.scenes.contains_key(id)
    }

    /// Insert or replace a scene. Returns the scene previously stored under
    /// `id`, if any.
    pub fn put(&mut self, id: impl Into<String>, scene: Scene) -> Option<Scene> {
        let id = id.into();
        if !self.scenes.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.scenes.insert(id, scene)
    }

    pub fn remove(&mut self, id: &str) -> Option<Scene> {
        let removed = self.scenes.remove(id)?;
        self.order.retain(|key| key != id);
        Some(removed)
    }

    /// Scene ids in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// `(id, scene)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scene)> {
        self.order
            .iter()
            .filter_map(|id| self.scenes.get(id).map(|scene| (id.as_str(), scene)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Parse a story from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<StoryGraph, StoryError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Serialize to pretty-printed JSON with two-space indentation.
    pub fn to_json(&self) -> Result<Vec<u8>, StoryError> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Load a story from a JSON file.
    pub fn load_from_json(path: &Path) -> Result<StoryGraph, StoryError> {
        let bytes = std::fs::read(path)?;
        Self::from_json(&bytes)
    }

    /// Write the story to a JSON file, replacing its contents.
    pub fn save_to_json(&self, path: &Path) -> Result<(), StoryError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl PartialEq for StoryGraph {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order && self.scenes == other.scenes
    }
}

impl Eq for StoryGraph {}

impl FromIterator<(String, Scene)> for StoryGraph {
    fn from_iter<I: IntoIterator<Item = (String, Scene)>>(iter: I) -> Self {
        let mut graph = StoryGraph::new();
        for (id, scene) in iter {
            graph.put(id, scene);
        }
        graph
    }
}

// The story file is a plain JSON object keyed by scene id. Going through a
// visitor keeps the file's key order without pulling in an ordered map.

impl Serialize for StoryGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (id, scene) in self.iter() {
            map.serialize_entry(id, scene)?;
        }
        map.end()
    }
}

struct StoryGraphVisitor;

impl<'de> Visitor<'de> for StoryGraphVisitor {
    type Value = StoryGraph;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping scene ids to scenes")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<StoryGraph, A::Error> {
        let mut graph = StoryGraph::new();
        while let Some((id, scene)) = access.next_entry::<String, Scene>()? {
            graph.put(id, scene);
        }
        Ok(graph)
    }
}

impl<'de> Deserialize<'de> for StoryGraph {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StoryGraphVisitor)
    }
}
