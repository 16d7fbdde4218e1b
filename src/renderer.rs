use crate::assets::{MeshId, ResourceArena, TextureId};
use crate::camera::{Camera, CameraView};
use crate::ecs::{EntityHandle, EntityKind, SceneWorld};
use glam::Vec3;
use smallvec::SmallVec;

pub const MAX_LIGHTS: usize = 8;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub handle: EntityHandle,
    pub mesh: MeshId,
    pub texture: Option<TextureId>,
    pub instance: DrawInstance,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightItem {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub radius: f32,
}

/// Read-only state handed to the rendering backend once per tick.
#[derive(Debug, Clone)]
pub struct RenderFrame {
    pub draws: Vec<DrawItem>,
    pub lights: SmallVec<[LightItem; MAX_LIGHTS]>,
    pub camera: CameraView,
}

impl RenderFrame {
    pub fn collect(world: &SceneWorld, arena: &ResourceArena, camera: &Camera) -> Self {
        let mut draws = Vec::new();
        let mut lights: SmallVec<[LightItem; MAX_LIGHTS]> = SmallVec::new();
        for (handle, entity) in world.iter() {
            if !entity.visible {
                continue;
            }
            if entity.kind == EntityKind::Light && lights.len() < MAX_LIGHTS {
                lights.push(LightItem {
                    position: entity.position(),
                    color: entity.light.color,
                    intensity: entity.light.intensity,
                    radius: entity.light.radius,
                });
            }
            if entity.kind == EntityKind::Camera {
                continue;
            }
            let Some(mesh) = arena.mesh(handle) else {
                continue;
            };
            let texture = entity.texture_name.as_deref().and_then(|name| arena.texture(name)).map(|t| t.id);
            draws.push(DrawItem {
                handle,
                mesh: mesh.id,
                texture,
                instance: DrawInstance {
                    model: entity.world_transform().to_cols_array_2d(),
                    color: entity.color.extend(1.0).to_array(),
                },
            });
        }
        Self { draws, lights, camera: camera.view() }
    }

    pub fn instance_bytes(&self) -> Vec<u8> {
        let instances: Vec<DrawInstance> = self.draws.iter().map(|draw| draw.instance).collect();
        bytemuck::cast_slice(&instances).to_vec()
    }
}
