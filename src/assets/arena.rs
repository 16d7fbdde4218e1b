use crate::ecs::EntityHandle;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(u32);

#[derive(Debug, Clone)]
pub struct MeshRecord {
    pub id: MeshId,
    pub source: PathBuf,
    pub mesh_count: usize,
    pub vertex_count: usize,
}

#[derive(Debug, Clone)]
pub struct TextureRecord {
    pub id: TextureId,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseSummary {
    pub meshes: usize,
    pub textures: usize,
}

/// Everything is dropped together by [`ResourceArena::release`] when a scene is replaced.
#[derive(Debug, Default)]
pub struct ResourceArena {
    meshes: Vec<Option<MeshRecord>>,
    textures: HashMap<String, TextureRecord>,
    next_mesh: u32,
    next_texture: u32,
}

impl ResourceArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_mesh(
        &mut self,
        handle: EntityHandle,
        source: impl Into<PathBuf>,
        mesh_count: usize,
        vertex_count: usize,
    ) -> MeshId {
        let id = MeshId(self.next_mesh);
        self.next_mesh += 1;
        let index = handle.index();
        if index >= self.meshes.len() {
            self.meshes.resize(index + 1, None);
        }
        self.meshes[index] = Some(MeshRecord { id, source: source.into(), mesh_count, vertex_count });
        id
    }

    pub fn mesh(&self, handle: EntityHandle) -> Option<&MeshRecord> {
        self.meshes.get(handle.index()).and_then(|slot| slot.as_ref())
    }

    pub fn load_texture(&mut self, name: &str, path: &Path) -> Result<TextureId> {
        if let Some(existing) = self.textures.get(name) {
            return Ok(existing.id);
        }
        let (width, height) = image::image_dimensions(path)
            .with_context(|| format!("Failed to load texture {}", path.display()))?;
        Ok(self.register_texture(name, path, width, height))
    }

    pub fn register_texture(&mut self, name: &str, path: impl Into<PathBuf>, width: u32, height: u32) -> TextureId {
        if let Some(existing) = self.textures.get(name) {
            return existing.id;
        }
        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(name.to_string(), TextureRecord { id, path: path.into(), width, height });
        id
    }

    pub fn texture(&self, name: &str) -> Option<&TextureRecord> {
        self.textures.get(name)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn release(&mut self) -> ReleaseSummary {
        let summary = ReleaseSummary { meshes: self.mesh_count(), textures: self.texture_count() };
        self.meshes.clear();
        self.textures.clear();
        summary
    }
}
