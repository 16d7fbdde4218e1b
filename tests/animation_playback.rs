use glam::Vec3;
use scene_player::assets::{AssetImporter, GltfImporter};
use scene_player::ecs::{EntityHandle, EntityKind};
use scene_player::scene::{Scene, SceneObject};
use scene_player::SceneRuntime;
use std::io::Write;
use std::path::{Path, PathBuf};

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/bobbing_cube.gltf")
}

fn animated_runtime(script: Option<&Path>) -> SceneRuntime {
    let object = SceneObject {
        name: "Bobber".into(),
        kind: EntityKind::Cube,
        position: [3.0, 0.0, 0.0],
        model_path: fixture().to_string_lossy().into_owned(),
        script: script.map(|path| path.to_string_lossy().into_owned()).unwrap_or_default(),
        ..SceneObject::default()
    };
    let mut runtime = SceneRuntime::new();
    let summary = runtime.load_scene_data(&Scene { objects: vec![object], scene_camera: None });
    assert_eq!((summary.meshes, summary.failed_imports), (1, 0));
    runtime
}

fn assert_vec3_near(actual: Vec3, expected: Vec3, eps: f32) {
    assert!((actual - expected).length() < eps, "expected {expected:?}, got {actual:?}");
}

#[test]
fn gltf_clips_are_named_and_timed() {
    let asset = GltfImporter.import(&fixture()).expect("import fixture");
    assert_eq!(asset.mesh_count, 1);
    assert_eq!(asset.vertex_count, 3);
    assert_eq!(asset.animations.clip_names(), vec!["Bob".to_string(), "Animation_1".to_string()]);
    assert_eq!(asset.animations.root_node_name.as_deref(), Some("Root"));
    let bob = asset.animations.find_clip("Bob").expect("Bob clip");
    assert_eq!(bob.duration, 2.0);
    assert_eq!(bob.effective_ticks_per_second(), 1.0);
}

#[test]
fn playing_clip_drives_only_keyed_components() {
    let mut runtime = animated_runtime(None);
    let handle = EntityHandle::new(0);
    assert_eq!(runtime.world().get(handle).expect("bobber").animation.clip_names.len(), 2);
    runtime.world_mut().play_animation(handle, "Bob").expect("valid handle");

    runtime.tick(0.05);
    runtime.tick(0.05);
    runtime.tick(0.05);
    runtime.tick(0.05);
    runtime.tick(0.05);
    let world = runtime.world();
    let bobber = world.get(handle).expect("bobber");
    assert_vec3_near(bobber.position(), Vec3::new(0.0, 0.5, 0.0), 1e-4);
    assert_eq!(bobber.scale(), Vec3::ONE);
}

#[test]
fn clip_loops_back_to_first_key() {
    let mut runtime = animated_runtime(None);
    let handle = EntityHandle::new(0);
    runtime.world_mut().play_animation(handle, "Bob").expect("valid handle");
    for _ in 0..25 {
        runtime.tick(0.1);
    }
    let world = runtime.world();
    let bobber = world.get(handle).expect("bobber");
    assert!(bobber.animation.clock < 2.0, "clock wrapped: {}", bobber.animation.clock);
    assert_vec3_near(bobber.position(), Vec3::new(0.0, 1.0, 0.0), 1e-3);
}

#[test]
fn unnamed_clip_plays_under_fallback_name() {
    let mut runtime = animated_runtime(None);
    let handle = EntityHandle::new(0);
    runtime.world_mut().play_animation(handle, "Animation_1").expect("valid handle");
    for _ in 0..10 {
        runtime.tick(0.1);
    }
    let world = runtime.world();
    let bobber = world.get(handle).expect("bobber");
    assert_vec3_near(bobber.scale(), Vec3::splat(2.0), 1e-4);
    assert_eq!(bobber.position(), Vec3::new(3.0, 0.0, 0.0));
}

#[test]
fn scripts_can_stop_playback() {
    let mut script = tempfile::NamedTempFile::new().expect("temp script");
    write!(script, "StopAnimation(GetSelf());").expect("write script");
    let mut runtime = animated_runtime(Some(script.path()));
    let handle = EntityHandle::new(0);
    runtime.world_mut().play_animation(handle, "Bob").expect("valid handle");
    runtime.tick(0.5);
    let frozen = runtime.world().get(handle).expect("bobber").position();
    runtime.tick(0.1);
    let world = runtime.world();
    let bobber = world.get(handle).expect("bobber");
    assert!(!bobber.animation.playing);
    assert_eq!(bobber.position(), frozen);
    assert_vec3_near(frozen, Vec3::new(0.0, 1.0, 0.0), 1e-4);
}

#[test]
fn render_frame_draws_imported_mesh() {
    let runtime = animated_runtime(None);
    let frame = runtime.render_frame();
    assert_eq!(frame.draws.len(), 1);
    assert_eq!(frame.draws[0].handle, EntityHandle::new(0));
    assert!(frame.lights.is_empty());
}
