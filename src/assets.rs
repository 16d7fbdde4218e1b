use anyhow::Result;
use glam::{Quat, Vec3};
use std::path::Path;
use std::sync::Arc;

pub mod arena;
pub mod gltf_import;

pub use arena::{MeshId, MeshRecord, ResourceArena, TextureId, TextureRecord};
pub use gltf_import::GltfImporter;

/// Ticks per second assumed when a clip declares zero.
pub const DEFAULT_TICKS_PER_SECOND: f32 = 25.0;

#[derive(Clone, Debug, PartialEq)]
pub struct ClipKeyframe<T> {
    pub time: f32,
    pub value: T,
}

#[derive(Clone, Debug, Default)]
pub struct NodeChannel {
    pub node_name: String,
    pub position_keys: Vec<ClipKeyframe<Vec3>>,
    pub rotation_keys: Vec<ClipKeyframe<Quat>>,
    pub scale_keys: Vec<ClipKeyframe<Vec3>>,
}

#[derive(Clone, Debug)]
pub struct AnimationClip {
    pub name: Arc<str>,
    pub duration: f32,
    pub ticks_per_second: f32,
    pub channels: Vec<NodeChannel>,
}

impl AnimationClip {
    pub fn effective_ticks_per_second(&self) -> f32 {
        if self.ticks_per_second != 0.0 {
            self.ticks_per_second
        } else {
            DEFAULT_TICKS_PER_SECOND
        }
    }

    /// Channel bound to `root_name`, else the first channel.
    pub fn channel_for_root(&self, root_name: Option<&str>) -> Option<&NodeChannel> {
        root_name
            .and_then(|root| self.channels.iter().find(|channel| channel.node_name == root))
            .or_else(|| self.channels.first())
    }
}

#[derive(Clone, Debug, Default)]
pub struct AnimationLibrary {
    pub clips: Vec<AnimationClip>,
    pub root_node_name: Option<String>,
}

impl AnimationLibrary {
    pub fn clip_names(&self) -> Vec<String> {
        self.clips.iter().map(|clip| clip.name.to_string()).collect()
    }

    pub fn find_clip(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.iter().find(|clip| clip.name.as_ref() == name)
    }
}

pub fn fallback_clip_name(index: usize) -> String {
    format!("Animation_{index}")
}

pub struct ImportedAsset {
    pub animations: AnimationLibrary,
    pub mesh_count: usize,
    pub vertex_count: usize,
}

pub trait AssetImporter {
    fn import(&self, path: &Path) -> Result<ImportedAsset>;
}
