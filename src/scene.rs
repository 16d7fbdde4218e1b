use crate::ecs::{Entity, EntityKind, SceneWorld};
use anyhow::{Context, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const LOG_TARGET: &str = "scene_player::scene";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub objects: Vec<SceneObject>,
    /// Index into `objects` of the camera that drives the view. Negative means the free camera.
    #[serde(rename = "sceneCamera", default, skip_serializing_if = "Option::is_none")]
    pub scene_camera: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawScene {
    #[serde(default)]
    objects: Vec<serde_json::Value>,
    #[serde(rename = "sceneCamera", default)]
    scene_camera: Option<i64>,
}

fn default_name() -> String {
    "Object".to_string()
}

const fn zero3() -> [f32; 3] {
    [0.0, 0.0, 0.0]
}

const fn one3() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

const fn default_light_intensity() -> f32 {
    1.0
}

const fn default_light_radius() -> f32 {
    10.0
}

const fn default_camera_fov() -> f32 {
    45.0
}

const fn default_camera_near() -> f32 {
    0.1
}

const fn default_camera_far() -> f32 {
    100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneObject {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: EntityKind,
    #[serde(default = "zero3")]
    pub position: [f32; 3],
    #[serde(default = "zero3")]
    pub rotation: [f32; 3],
    #[serde(default = "one3")]
    pub scale: [f32; 3],
    #[serde(default = "one3")]
    pub color: [f32; 3],
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub texture_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub texture_path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model_path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub script: String,
    #[serde(default)]
    pub has_physics: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default = "default_light_intensity")]
    pub light_intensity: f32,
    #[serde(default = "one3")]
    pub light_color: [f32; 3],
    #[serde(default = "default_light_radius")]
    pub light_radius: f32,
    #[serde(rename = "cameraFOV", default = "default_camera_fov")]
    pub camera_fov: f32,
    #[serde(default = "default_camera_near")]
    pub camera_near: f32,
    #[serde(default = "default_camera_far")]
    pub camera_far: f32,
}

impl Default for SceneObject {
    fn default() -> Self {
        Self::from_entity(&Entity::new(default_name(), EntityKind::default()))
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl SceneObject {
    pub fn into_entity(self) -> Entity {
        let mut entity = Entity::new(self.name, self.kind);
        entity.set_position(Vec3::from_array(self.position));
        entity.set_rotation(Vec3::from_array(self.rotation));
        entity.set_scale(Vec3::from_array(self.scale));
        entity.color = Vec3::from_array(self.color);
        entity.texture_name = non_empty(&self.texture_name);
        entity.texture_path = non_empty(&self.texture_path);
        entity.model_path = non_empty(&self.model_path);
        entity.script = non_empty(&self.script);
        entity.physics.enabled = self.has_physics;
        entity.physics.is_static = self.is_static;
        entity.light.intensity = self.light_intensity;
        entity.light.color = Vec3::from_array(self.light_color);
        entity.light.radius = self.light_radius;
        entity.camera.fov = self.camera_fov;
        entity.camera.near = self.camera_near;
        entity.camera.far = self.camera_far;
        entity
    }

    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            name: entity.name.clone(),
            kind: entity.kind,
            position: entity.position().to_array(),
            rotation: entity.rotation().to_array(),
            scale: entity.scale().to_array(),
            color: entity.color.to_array(),
            texture_name: entity.texture_name.clone().unwrap_or_default(),
            texture_path: entity.texture_path.clone().unwrap_or_default(),
            model_path: entity.model_path.clone().unwrap_or_default(),
            script: entity.script.clone().unwrap_or_default(),
            has_physics: entity.physics.enabled,
            is_static: entity.physics.is_static,
            light_intensity: entity.light.intensity,
            light_color: entity.light.color.to_array(),
            light_radius: entity.light.radius,
            camera_fov: entity.camera.fov,
            camera_near: entity.camera.near,
            camera_far: entity.camera.far,
        }
    }
}

impl Scene {
    /// Parses a scene document. Records that fail to deserialize are skipped with a warning;
    /// a document that is not valid JSON is an error.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let raw: RawScene = serde_json::from_slice(bytes)?;
        let mut objects = Vec::with_capacity(raw.objects.len());
        for (index, value) in raw.objects.into_iter().enumerate() {
            match serde_json::from_value::<SceneObject>(value) {
                Ok(object) => objects.push(object),
                Err(err) => log::warn!(target: LOG_TARGET, "Skipping scene object {index}: {err}"),
            }
        }
        Ok(Self { objects, scene_camera: raw.scene_camera })
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("Reading scene file {}", path.display()))?;
        Self::parse(&bytes).with_context(|| format!("Parsing scene file {}", path.display()))
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating scene directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json.as_bytes()).with_context(|| format!("Writing scene file {}", path.display()))?;
        Ok(())
    }

    pub fn from_world(world: &SceneWorld) -> Self {
        Self {
            objects: world.iter().map(|(_, entity)| SceneObject::from_entity(entity)).collect(),
            scene_camera: Some(world.scene_camera().map_or(-1, |handle| handle.index() as i64)),
        }
    }

    pub fn build_entities(&self) -> Vec<Entity> {
        self.objects.iter().cloned().map(SceneObject::into_entity).collect()
    }
}
