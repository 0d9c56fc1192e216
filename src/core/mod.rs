pub mod config;
pub mod editor;
pub mod input;
pub mod player;
pub mod reveal;
pub mod segment;
pub mod sink;
