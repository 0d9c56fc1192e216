use serde::{Deserialize, Serialize};
use std::fmt;

/// Inline text effect applied to a range of scene text.
///
/// The engine treats the tag as opaque: the four built-in kinds are what the
/// bundled renderers style, and any other string survives a load/save cycle
/// untouched as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EffectKind {
    Large,
    Small,
    Shake,
    Emphasis,
    Custom(String),
}

impl EffectKind {
    /// The tag as written in story files (e.g. `"shake"`).
    pub fn name(&self) -> &str {
        match self {
            Self::Large => "large",
            Self::Small => "small",
            Self::Shake => "shake",
            Self::Emphasis => "emphasis",
            Self::Custom(name) => name,
        }
    }

    /// Kinds offered by the editor, in display order.
    pub fn builtin() -> [EffectKind; 4] {
        [Self::Large, Self::Small, Self::Shake, Self::Emphasis]
    }
}

impl From<String> for EffectKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "large" => Self::Large,
            "small" => Self::Small,
            "shake" => Self::Shake,
            "emphasis" => Self::Emphasis,
            _ => Self::Custom(s),
        }
    }
}

impl From<&str> for EffectKind {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<EffectKind> for String {
    fn from(kind: EffectKind) -> Self {
        match kind {
            EffectKind::Custom(name) => name,
            other => other.name().to_string(),
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A tagged span of scene text.
///
/// `start` is inclusive and `end` exclusive, both counted in UTF-16 code
/// units so that offsets written by browser-based editors stay valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectRange {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: EffectKind,
}

impl EffectRange {
    pub fn new(start: usize, end: usize, kind: impl Into<EffectKind>) -> Self {
        Self {
            start,
            end,
            kind: kind.into(),
        }
    }
}
