pub mod physics;
pub mod systems;
pub mod transform;
pub mod types;
pub mod world;

pub use physics::PhysicsParams;
pub use types::{AnimationState, CameraState, Entity, EntityHandle, EntityKind, LightState, PhysicsBody};
pub use world::{HandleError, SceneWorld};
