use super::{fallback_clip_name, AnimationClip, AnimationLibrary, AssetImporter, ClipKeyframe, ImportedAsset, NodeChannel};
use anyhow::{bail, Context, Result};
use glam::{Quat, Vec3};
use gltf::animation::util::{ReadOutputs, Rotations};
use gltf::animation::{Interpolation, Property};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// glTF key times are already seconds, so one tick is one second.
const GLTF_TICKS_PER_SECOND: f32 = 1.0;

#[derive(Debug, Default, Clone, Copy)]
pub struct GltfImporter;

impl AssetImporter for GltfImporter {
    fn import(&self, path: &Path) -> Result<ImportedAsset> {
        load_gltf_asset(path)
    }
}

pub fn load_gltf_asset(path: impl AsRef<Path>) -> Result<ImportedAsset> {
    let path_ref = path.as_ref();
    let (document, buffers, _) =
        gltf::import(path_ref).with_context(|| format!("Failed to import GLTF asset from {}", path_ref.display()))?;

    let mesh_count = document.meshes().count();
    if mesh_count == 0 {
        bail!("GLTF '{}' does not contain any mesh", path_ref.display());
    }
    let vertex_count = document
        .meshes()
        .flat_map(|mesh| mesh.primitives())
        .filter_map(|primitive| primitive.get(&gltf::Semantic::Positions).map(|accessor| accessor.count()))
        .sum();

    let root_node_name = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .and_then(|scene| scene.nodes().next())
        .map(|node| node_label(&node));

    let mut clips = Vec::new();
    for (anim_index, animation) in document.animations().enumerate() {
        let clip_name: Arc<str> = animation
            .name()
            .filter(|name| !name.is_empty())
            .map(Arc::<str>::from)
            .unwrap_or_else(|| Arc::<str>::from(fallback_clip_name(anim_index)));

        // Keyed by node index so channel order follows the document, not hash order.
        let mut channels: BTreeMap<usize, NodeChannel> = BTreeMap::new();
        for channel in animation.channels() {
            let target_node = channel.target().node();
            if matches!(channel.sampler().interpolation(), Interpolation::CubicSpline) {
                log::warn!(
                    target: "scene_player::assets",
                    "animation '{}' uses CubicSpline interpolation; skipping channel (node {}).",
                    clip_name,
                    target_node.index()
                );
                continue;
            }

            let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
            let Some(inputs) = reader.read_inputs() else {
                continue;
            };
            let times: Vec<f32> = inputs.collect();
            if times.is_empty() {
                continue;
            }
            let Some(outputs) = reader.read_outputs() else {
                continue;
            };

            let entry = channels.entry(target_node.index()).or_insert_with(|| NodeChannel {
                node_name: node_label(&target_node),
                ..NodeChannel::default()
            });
            match (channel.target().property(), outputs) {
                (Property::Translation, ReadOutputs::Translations(values)) => {
                    entry.position_keys = build_keyframes(&times, values.map(Vec3::from_array).collect())
                        .with_context(|| format!("Animation '{clip_name}' translation channel"))?;
                }
                (Property::Scale, ReadOutputs::Scales(values)) => {
                    entry.scale_keys = build_keyframes(&times, values.map(Vec3::from_array).collect())
                        .with_context(|| format!("Animation '{clip_name}' scale channel"))?;
                }
                (Property::Rotation, ReadOutputs::Rotations(rotations)) => {
                    entry.rotation_keys = build_keyframes(&times, convert_rotations(rotations))
                        .with_context(|| format!("Animation '{clip_name}' rotation channel"))?;
                }
                _ => {}
            }
        }

        let channels: Vec<NodeChannel> = channels.into_values().collect();
        let duration = channels.iter().map(channel_end_time).fold(0.0_f32, f32::max);
        clips.push(AnimationClip { name: clip_name, duration, ticks_per_second: GLTF_TICKS_PER_SECOND, channels });
    }

    Ok(ImportedAsset { animations: AnimationLibrary { clips, root_node_name }, mesh_count, vertex_count })
}

fn node_label(node: &gltf::Node<'_>) -> String {
    node.name().map(str::to_string).unwrap_or_else(|| format!("node_{}", node.index()))
}

fn channel_end_time(channel: &NodeChannel) -> f32 {
    let last = |time: Option<f32>| time.unwrap_or(0.0);
    last(channel.position_keys.last().map(|kf| kf.time))
        .max(last(channel.rotation_keys.last().map(|kf| kf.time)))
        .max(last(channel.scale_keys.last().map(|kf| kf.time)))
}

fn build_keyframes<T>(times: &[f32], values: Vec<T>) -> Result<Vec<ClipKeyframe<T>>> {
    if times.len() != values.len() {
        bail!("time/value count mismatch ({} vs {})", times.len(), values.len());
    }
    let mut frames: Vec<ClipKeyframe<T>> = Vec::with_capacity(times.len());
    for (time, value) in times.iter().copied().zip(values) {
        if !time.is_finite() {
            bail!("channel contains non-finite time value");
        }
        if time < 0.0 {
            bail!("channel time cannot be negative");
        }
        frames.push(ClipKeyframe { time: time * GLTF_TICKS_PER_SECOND, value });
    }
    Ok(frames)
}

fn convert_rotations(rotations: Rotations) -> Vec<Quat> {
    rotations
        .into_f32()
        .map(|components| {
            let quat = Quat::from_xyzw(components[0], components[1], components[2], components[3]);
            if quat.length_squared() > 0.0 {
                quat.normalize()
            } else {
                Quat::IDENTITY
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyframes_require_matching_counts() {
        let err = build_keyframes(&[0.0, 1.0], vec![Vec3::ZERO]).unwrap_err();
        assert!(err.to_string().contains("mismatch"));
    }

    #[test]
    fn keyframes_reject_negative_time() {
        assert!(build_keyframes(&[-0.5], vec![Vec3::ONE]).is_err());
    }

    #[test]
    fn end_time_spans_all_key_kinds() {
        let channel = NodeChannel {
            node_name: "Root".into(),
            position_keys: vec![ClipKeyframe { time: 0.0, value: Vec3::ZERO }, ClipKeyframe { time: 2.0, value: Vec3::ONE }],
            rotation_keys: vec![ClipKeyframe { time: 3.5, value: Quat::IDENTITY }],
            scale_keys: Vec::new(),
        };
        assert_eq!(channel_end_time(&channel), 3.5);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = GltfImporter.import(Path::new("definitely/missing/model.gltf")).err().expect("import fails");
        assert!(format!("{err:#}").contains("definitely/missing/model.gltf"));
    }
}
