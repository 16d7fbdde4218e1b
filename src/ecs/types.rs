use crate::assets::AnimationLibrary;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityHandle(u32);

impl EntityHandle {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn to_script(self) -> rhai::INT {
        self.0 as rhai::INT
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum EntityKind {
    #[default]
    Cube,
    Sphere,
    Plane,
    Light,
    Camera,
}

impl TryFrom<u8> for EntityKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EntityKind::Cube),
            1 => Ok(EntityKind::Sphere),
            2 => Ok(EntityKind::Plane),
            3 => Ok(EntityKind::Light),
            4 => Ok(EntityKind::Camera),
            other => Err(format!("unknown object type {other}")),
        }
    }
}

impl From<EntityKind> for u8 {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Cube => 0,
            EntityKind::Sphere => 1,
            EntityKind::Plane => 2,
            EntityKind::Light => 3,
            EntityKind::Camera => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhysicsBody {
    pub enabled: bool,
    pub is_static: bool,
    pub velocity: Vec3,
}

impl PhysicsBody {
    pub fn is_dynamic(&self) -> bool {
        self.enabled && !self.is_static
    }
}

#[derive(Clone, Default)]
pub struct AnimationState {
    pub source: Option<Arc<AnimationLibrary>>,
    pub clip_names: Vec<String>,
    pub current_clip: Option<String>,
    pub playing: bool,
    /// Clip clock in source ticks, not seconds.
    pub clock: f32,
}

impl AnimationState {
    pub fn play(&mut self, clip: impl Into<String>) {
        self.current_clip = Some(clip.into());
        self.playing = true;
        self.clock = 0.0;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }
}

impl fmt::Debug for AnimationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationState")
            .field("has_source", &self.source.is_some())
            .field("clip_names", &self.clip_names)
            .field("current_clip", &self.current_clip)
            .field("playing", &self.playing)
            .field("clock", &self.clock)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightState {
    pub intensity: f32,
    pub color: Vec3,
    pub radius: f32,
}

impl Default for LightState {
    fn default() -> Self {
        Self { intensity: 1.0, color: Vec3::ONE, radius: 10.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self { fov: 45.0, near: 0.1, far: 100.0 }
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub name: String,
    pub kind: EntityKind,
    position: Vec3,
    /// Euler angles in degrees, applied X then Y then Z.
    rotation: Vec3,
    scale: Vec3,
    world_transform: Mat4,
    pub visible: bool,
    pub color: Vec3,
    pub texture_name: Option<String>,
    pub texture_path: Option<String>,
    pub model_path: Option<String>,
    pub script: Option<String>,
    pub physics: PhysicsBody,
    pub animation: AnimationState,
    pub light: LightState,
    pub camera: CameraState,
}

impl Entity {
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        let mut entity = Self {
            name: name.into(),
            kind,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            world_transform: Mat4::IDENTITY,
            visible: true,
            color: Vec3::ONE,
            texture_name: None,
            texture_path: None,
            model_path: None,
            script: None,
            physics: PhysicsBody::default(),
            animation: AnimationState::default(),
            light: LightState::default(),
            camera: CameraState::default(),
        };
        entity.refresh_transform();
        entity
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self.refresh_transform();
        self
    }

    pub fn with_physics(mut self, is_static: bool) -> Self {
        self.physics.enabled = true;
        self.physics.is_static = is_static;
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn world_transform(&self) -> Mat4 {
        self.world_transform
    }

    pub(crate) fn refresh_transform(&mut self) {
        self.world_transform = super::transform::compose_world(self.position, self.rotation, self.scale);
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.refresh_transform();
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
        self.refresh_transform();
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.refresh_transform();
    }
}
