use glam::Vec3;
use scene_player::ecs::{EntityHandle, EntityKind};
use scene_player::scene::Scene;
use scene_player::SceneRuntime;
use std::fs;

const SCENE: &str = r#"{
  "objects": [
    { "name": "Ground", "type": 2, "position": [0, -1, 0], "scale": [10, 1, 10], "isStatic": true, "hasPhysics": true },
    { "name": "Lamp", "type": 3, "position": [0, 4, 0], "lightColor": [1, 0.5, 0.25], "lightIntensity": 2.0 },
    { "name": "Broken", "type": 17 },
    { "name": "Overview", "type": 4, "position": [0, 10, 10], "rotation": [-45, -90, 0], "cameraFOV": 60 },
    { "name": "Close", "type": 4, "position": [1, 2, 3] },
    { "name": "Crate", "type": 0, "modelPath": "missing/crate.glb", "textureName": "wood", "texturePath": "missing/wood.png" }
  ],
  "sceneCamera": 3
}"#;

fn write_scene(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("game.scene");
    fs::write(&path, contents).expect("write scene");
    path
}

#[test]
fn records_load_with_defaults_and_skips() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut runtime = SceneRuntime::new();
    let summary = runtime.load_scene(write_scene(&dir, SCENE)).expect("load scene");

    assert_eq!(summary.entities, 5, "bad record is dropped");
    assert_eq!(summary.failed_imports, 1);
    assert_eq!(summary.textures, 0);

    let world = runtime.world();
    let names: Vec<_> = world.iter().map(|(_, entity)| entity.name.clone()).collect();
    assert_eq!(names, ["Ground", "Lamp", "Overview", "Close", "Crate"]);

    let lamp = world.get(EntityHandle::new(1)).expect("lamp");
    assert_eq!(lamp.light.color, Vec3::new(1.0, 0.5, 0.25));
    assert_eq!((lamp.light.intensity, lamp.light.radius), (2.0, 10.0));
    let close = world.get(EntityHandle::new(3)).expect("close camera");
    assert_eq!((close.camera.fov, close.camera.near, close.camera.far), (45.0, 0.1, 100.0));
}

#[test]
fn explicit_scene_camera_drives_view() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut runtime = SceneRuntime::new();
    let summary = runtime.load_scene(write_scene(&dir, SCENE)).expect("load scene");
    assert_eq!(summary.scene_camera, Some(EntityHandle::new(3)));

    let camera = runtime.camera();
    assert_eq!(camera.position, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(camera.fov, 45.0);
}

#[test]
fn first_camera_is_used_without_index() {
    let dir = tempfile::tempdir().expect("temp dir");
    let without_index = SCENE.replace(",\n  \"sceneCamera\": 3", "");
    assert!(!without_index.contains("sceneCamera"));
    let mut runtime = SceneRuntime::new();
    let summary = runtime.load_scene(write_scene(&dir, &without_index)).expect("load scene");
    assert_eq!(summary.scene_camera, Some(EntityHandle::new(2)));
    let camera = runtime.camera();
    assert_eq!(camera.position, Vec3::new(0.0, 10.0, 10.0));
    assert_eq!((camera.yaw, camera.pitch, camera.fov), (-90.0, -45.0, 60.0));
}

#[test]
fn negative_index_keeps_free_camera() {
    let dir = tempfile::tempdir().expect("temp dir");
    let free = SCENE.replace(r#""sceneCamera": 3"#, r#""sceneCamera": -1"#);
    let mut runtime = SceneRuntime::new();
    let summary = runtime.load_scene(write_scene(&dir, &free)).expect("load scene");
    assert_eq!(summary.scene_camera, None);
    let camera = runtime.camera();
    assert_eq!(camera.position, Vec3::new(5.0, 5.0, 5.0));
    assert_eq!((camera.yaw, camera.fov), (-90.0, 45.0));

    let saved_path = dir.path().join("free.scene");
    Scene::from_world(&runtime.world()).save_to_path(&saved_path).expect("save scene");
    assert_eq!(Scene::load_from_path(&saved_path).expect("reload").scene_camera, Some(-1));
}

#[test]
fn direct_transform_edits_reach_the_render_frame() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut runtime = SceneRuntime::new();
    runtime.load_scene(write_scene(&dir, SCENE)).expect("load scene");
    runtime.world_mut().get_mut(EntityHandle::new(1)).expect("lamp").set_position(Vec3::new(4.0, 0.0, 0.0));
    let world = runtime.world();
    let lamp = world.get(EntityHandle::new(1)).expect("lamp");
    assert_eq!(lamp.world_transform().w_axis, glam::Vec4::new(4.0, 0.0, 0.0, 1.0));
    drop(world);
    assert_eq!(runtime.render_frame().lights[0].position, Vec3::new(4.0, 0.0, 0.0));
}

#[test]
fn static_bodies_never_move() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut runtime = SceneRuntime::new();
    runtime.load_scene(write_scene(&dir, SCENE)).expect("load scene");
    for _ in 0..20 {
        runtime.tick(0.1);
    }
    let world = runtime.world();
    assert_eq!(world.get(EntityHandle::new(0)).expect("ground").position(), Vec3::new(0.0, -1.0, 0.0));
}

#[test]
fn render_frame_lists_visible_lights() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut runtime = SceneRuntime::new();
    runtime.load_scene(write_scene(&dir, SCENE)).expect("load scene");
    let frame = runtime.render_frame();
    assert_eq!(frame.lights.len(), 1);
    assert_eq!(frame.lights[0].position, Vec3::new(0.0, 4.0, 0.0));
    assert!(frame.draws.is_empty(), "no entity owns an imported mesh");
    assert_eq!(frame.camera.position, Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn malformed_scene_discards_previous_state() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut runtime = SceneRuntime::new();
    runtime.load_scene(write_scene(&dir, SCENE)).expect("load scene");
    let broken = dir.path().join("broken.scene");
    fs::write(&broken, "{ \"objects\": [").expect("write broken scene");
    let err = runtime.load_scene(&broken).unwrap_err();
    assert!(format!("{err:#}").contains("broken.scene"));
    assert!(runtime.world().is_empty());
}

#[test]
fn saved_world_reloads_identically() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut runtime = SceneRuntime::new();
    runtime.load_scene(write_scene(&dir, SCENE)).expect("load scene");
    let saved_path = dir.path().join("saved/copy.scene");
    Scene::from_world(&runtime.world()).save_to_path(&saved_path).expect("save scene");

    let reloaded = Scene::load_from_path(&saved_path).expect("reload");
    assert_eq!(reloaded.objects.len(), 5);
    assert_eq!(reloaded.scene_camera, Some(3));
    assert_eq!(reloaded.objects[4].kind, EntityKind::Cube);
    assert_eq!(reloaded.objects[4].model_path, "missing/crate.glb");
}
