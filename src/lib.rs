//! Gamebook Engine — branching-narrative playback with typed-text reveal.
//!
//! Scenes from a [`schema::story::StoryGraph`] are split into effect-tagged
//! segments, revealed one character per tick by a cancellable scheduler, and
//! advanced by a small state machine driven by advance and choice signals.

pub mod core;
pub mod schema;
