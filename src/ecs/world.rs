use super::{Entity, EntityHandle, EntityKind};
use glam::Vec3;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HandleError {
    #[error("entity handle {handle} is out of range (scene holds {count} entities)")]
    OutOfRange { handle: i64, count: usize },
}

/// Handles are dense indices and stay valid until the next [`SceneWorld::replace`].
#[derive(Debug, Default)]
pub struct SceneWorld {
    entities: Vec<Entity>,
    scene_camera: Option<EntityHandle>,
}

impl SceneWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, entities: Vec<Entity>) {
        self.entities = entities;
        self.scene_camera = None;
        for entity in &mut self.entities {
            entity.refresh_transform();
        }
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.scene_camera = None;
    }

    pub fn count(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn resolve(&self, raw: i64) -> Result<EntityHandle, HandleError> {
        if raw < 0 || raw as u64 >= self.entities.len() as u64 {
            return Err(HandleError::OutOfRange { handle: raw, count: self.entities.len() });
        }
        Ok(EntityHandle::new(raw as u32))
    }

    pub fn get(&self, handle: EntityHandle) -> Result<&Entity, HandleError> {
        let count = self.entities.len();
        self.entities
            .get(handle.index())
            .ok_or(HandleError::OutOfRange { handle: handle.index() as i64, count })
    }

    pub fn get_mut(&mut self, handle: EntityHandle) -> Result<&mut Entity, HandleError> {
        let count = self.entities.len();
        self.entities
            .get_mut(handle.index())
            .ok_or(HandleError::OutOfRange { handle: handle.index() as i64, count })
    }

    /// Linear scan in store order; the lowest handle wins on duplicate names.
    pub fn find_first_by_name(&self, name: &str) -> Option<EntityHandle> {
        self.entities
            .iter()
            .position(|entity| entity.name == name)
            .map(|index| EntityHandle::new(index as u32))
    }

    pub fn set_scene_camera(&mut self, handle: Option<EntityHandle>) -> Result<(), HandleError> {
        if let Some(handle) = handle {
            self.get(handle)?;
        }
        self.scene_camera = handle;
        Ok(())
    }

    pub fn scene_camera(&self) -> Option<EntityHandle> {
        self.scene_camera
    }

    pub fn first_camera(&self) -> Option<EntityHandle> {
        self.entities
            .iter()
            .position(|entity| entity.kind == EntityKind::Camera)
            .map(|index| EntityHandle::new(index as u32))
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityHandle, &Entity)> {
        self.entities.iter().enumerate().map(|(index, entity)| (EntityHandle::new(index as u32), entity))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityHandle, &mut Entity)> {
        self.entities
            .iter_mut()
            .enumerate()
            .map(|(index, entity)| (EntityHandle::new(index as u32), entity))
    }

    pub fn distance(&self, a: EntityHandle, b: EntityHandle) -> Result<f32, HandleError> {
        let a = self.get(a)?.position();
        let b = self.get(b)?.position();
        Ok(a.distance(b))
    }

    pub fn play_animation(&mut self, handle: EntityHandle, clip: &str) -> Result<(), HandleError> {
        self.get_mut(handle)?.animation.play(clip);
        Ok(())
    }

    pub fn stop_animation(&mut self, handle: EntityHandle) -> Result<(), HandleError> {
        self.get_mut(handle)?.animation.stop();
        Ok(())
    }

    pub fn translate(&mut self, handle: EntityHandle, delta: Vec3) -> Result<(), HandleError> {
        let entity = self.get_mut(handle)?;
        let position = entity.position() + delta;
        entity.set_position(position);
        Ok(())
    }

    pub fn rotate(&mut self, handle: EntityHandle, delta_degrees: Vec3) -> Result<(), HandleError> {
        let entity = self.get_mut(handle)?;
        let rotation = entity.rotation() + delta_degrees;
        entity.set_rotation(rotation);
        Ok(())
    }
}
