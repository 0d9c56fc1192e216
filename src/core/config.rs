/// Player configuration — typing cadence and start scene, loaded from RON.
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Settings for a playback session.
///
/// Every field is optional in the RON file:
///
/// ```text
/// (
///     type_delay_ms: 50,
///     start_scene: "start",
///     number_shortcuts: true,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Pause after each revealed character, in milliseconds.
    pub type_delay_ms: u64,
    /// Scene played first and on restart.
    pub start_scene: String,
    /// Let number keys pick choices (`1` is the first choice).
    pub number_shortcuts: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            type_delay_ms: 50,
            start_scene: "start".to_string(),
            number_shortcuts: true,
        }
    }
}

impl PlayerConfig {
    pub fn type_delay(&self) -> Duration {
        Duration::from_millis(self.type_delay_ms)
    }

    /// Load a configuration from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<PlayerConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a configuration from a RON string.
    pub fn parse_ron(input: &str) -> Result<PlayerConfig, ConfigError> {
        Ok(ron::from_str(input)?)
    }
}
