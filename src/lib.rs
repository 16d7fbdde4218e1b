pub mod assets;
pub mod camera;
pub mod cli;
pub mod config;
pub mod ecs;
pub mod input;
pub mod renderer;
pub mod runtime;
pub mod scene;
pub mod scripts;
pub mod time;

pub use runtime::{LoadSummary, RuntimeState, SceneRuntime, SharedState};
