pub mod effect;
pub mod scene;
pub mod story;
