use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Result;

use crate::assets::{AnimationLibrary, AssetImporter, GltfImporter, ImportedAsset, ResourceArena};
use crate::camera::Camera;
use crate::config::GameConfig;
use crate::ecs::systems::{sys_drive_clips, sys_integrate_bodies};
use crate::ecs::{EntityHandle, PhysicsParams, SceneWorld};
use crate::input::InputState;
use crate::renderer::RenderFrame;
use crate::scene::Scene;
use crate::scripts::{ScriptHost, ScriptLogEntry};
use crate::time::{clamp_delta, DEFAULT_MAX_DELTA_SECONDS};

const SCENE_TARGET: &str = "scene_player::scene";
const ASSET_TARGET: &str = "scene_player::assets";

#[derive(Debug, Default)]
pub struct RuntimeState {
    pub world: SceneWorld,
    pub input: InputState,
    pub delta_seconds: f32,
    pub current_self: Option<EntityHandle>,
}

pub type SharedState = Rc<RefCell<RuntimeState>>;

impl RuntimeState {
    pub fn shared() -> SharedState {
        Rc::new(RefCell::new(Self::default()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub entities: usize,
    pub meshes: usize,
    pub textures: usize,
    pub failed_imports: usize,
    pub scene_camera: Option<EntityHandle>,
}

pub struct SceneRuntime {
    state: SharedState,
    scripts: ScriptHost,
    arena: ResourceArena,
    camera: Camera,
    importer: Box<dyn AssetImporter>,
    physics: PhysicsParams,
    max_delta_seconds: f32,
    ticks: u64,
}

impl Default for SceneRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneRuntime {
    pub fn new() -> Self {
        Self::with_importer(Box::new(GltfImporter))
    }

    pub fn with_importer(importer: Box<dyn AssetImporter>) -> Self {
        let state = RuntimeState::shared();
        Self {
            scripts: ScriptHost::new(state.clone()),
            state,
            arena: ResourceArena::new(),
            camera: Camera::new(),
            importer,
            physics: PhysicsParams::default(),
            max_delta_seconds: DEFAULT_MAX_DELTA_SECONDS,
            ticks: 0,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        let mut runtime = Self::new();
        runtime.max_delta_seconds = config.tick_limit();
        runtime
    }

    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    pub fn world(&self) -> Ref<'_, SceneWorld> {
        Ref::map(self.state.borrow(), |state| &state.world)
    }

    pub fn world_mut(&self) -> RefMut<'_, SceneWorld> {
        RefMut::map(self.state.borrow_mut(), |state| &mut state.world)
    }

    pub fn input_mut(&self) -> RefMut<'_, InputState> {
        RefMut::map(self.state.borrow_mut(), |state| &mut state.input)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn arena(&self) -> &ResourceArena {
        &self.arena
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn take_script_logs(&mut self) -> Vec<ScriptLogEntry> {
        self.scripts.take_logs()
    }

    /// On error the runtime is left with an empty scene.
    pub fn load_scene(&mut self, path: impl AsRef<Path>) -> Result<LoadSummary> {
        self.unload();
        let scene = Scene::load_from_path(path.as_ref())?;
        log::info!(target: SCENE_TARGET, "Loading scene {} ({} objects)", path.as_ref().display(), scene.objects.len());
        Ok(self.load_scene_data(&scene))
    }

    pub fn load_scene_data(&mut self, scene: &Scene) -> LoadSummary {
        self.unload();
        self.world_mut().replace(scene.build_entities());

        let failed_imports = self.import_models();
        self.load_textures();
        let scene_camera = self.designate_camera(scene.scene_camera);
        self.sync_camera();

        let summary = LoadSummary {
            entities: self.world().count(),
            meshes: self.arena.mesh_count(),
            textures: self.arena.texture_count(),
            failed_imports,
            scene_camera,
        };
        log::info!(
            target: SCENE_TARGET,
            "Scene ready: {} entities, {} meshes, {} textures",
            summary.entities,
            summary.meshes,
            summary.textures
        );
        summary
    }

    fn unload(&mut self) {
        let released = self.arena.release();
        if released.meshes > 0 || released.textures > 0 {
            log::info!(
                target: ASSET_TARGET,
                "Released {} meshes and {} textures",
                released.meshes,
                released.textures
            );
        }
        self.world_mut().clear();
    }

    fn import_models(&mut self) -> usize {
        let requests: Vec<(EntityHandle, String)> = self
            .world()
            .iter()
            .filter_map(|(handle, entity)| entity.model_path.clone().map(|path| (handle, path)))
            .collect();

        let mut imported: HashMap<String, Option<(Arc<AnimationLibrary>, usize, usize)>> = HashMap::new();
        let mut failed = 0;
        for (handle, path) in requests {
            let entry = imported.entry(path.clone()).or_insert_with(|| {
                match self.importer.import(Path::new(&path)) {
                    Ok(ImportedAsset { animations, mesh_count, vertex_count }) => {
                        log::info!(
                            target: ASSET_TARGET,
                            "Imported {path}: {mesh_count} meshes, {} clips",
                            animations.clips.len()
                        );
                        Some((Arc::new(animations), mesh_count, vertex_count))
                    }
                    Err(err) => {
                        log::warn!(target: ASSET_TARGET, "Failed to load model {path}: {err:#}");
                        None
                    }
                }
            });
            let Some((library, mesh_count, vertex_count)) = entry.clone() else {
                failed += 1;
                continue;
            };
            self.arena.bind_mesh(handle, PathBuf::from(&path), mesh_count, vertex_count);
            if let Ok(entity) = self.world_mut().get_mut(handle) {
                entity.animation.clip_names = library.clip_names();
                entity.animation.source = Some(library);
            }
        }
        failed
    }

    fn load_textures(&mut self) {
        let requests: Vec<(String, String)> = self
            .world()
            .iter()
            .filter_map(|(_, entity)| entity.texture_name.clone().zip(entity.texture_path.clone()))
            .collect();
        for (name, path) in requests {
            if let Err(err) = self.arena.load_texture(&name, Path::new(&path)) {
                log::warn!(target: ASSET_TARGET, "Texture '{name}' unavailable: {err:#}");
            }
        }
    }

    /// A missing index picks the first camera in store order; a negative one keeps the free camera.
    fn designate_camera(&mut self, requested: Option<i64>) -> Option<EntityHandle> {
        let mut world = self.world_mut();
        let handle = match requested {
            None => world.first_camera(),
            Some(index) if index < 0 => None,
            Some(index) => match world.resolve(index) {
                Ok(handle) => Some(handle),
                Err(err) => {
                    log::warn!(target: SCENE_TARGET, "Ignoring sceneCamera: {err}");
                    None
                }
            },
        };
        if let Err(err) = world.set_scene_camera(handle) {
            log::warn!(target: SCENE_TARGET, "Scene camera unavailable: {err}");
        }
        world.scene_camera()
    }

    fn sync_camera(&mut self) {
        let state = self.state.borrow();
        self.camera.sync_from_world(&state.world);
    }

    pub fn tick(&mut self, raw_dt: f32) -> f32 {
        let dt = clamp_delta(raw_dt, self.max_delta_seconds);
        {
            let mut state = self.state.borrow_mut();
            state.delta_seconds = dt;
            sys_integrate_bodies(&mut state.world, &self.physics, dt);
            sys_drive_clips(&mut state.world, dt);
        }
        self.scripts.run_all();
        self.sync_camera();
        self.ticks += 1;
        dt
    }

    pub fn render_frame(&self) -> RenderFrame {
        RenderFrame::collect(&self.world(), &self.arena, &self.camera)
    }
}
