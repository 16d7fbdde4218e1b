use crate::ecs::{EntityKind, SceneWorld};
use glam::{Mat4, Vec3};
use winit::dpi::PhysicalSize;

const WORLD_UP: Vec3 = Vec3::Y;

/// Yaw/pitch perspective camera. Angles are stored in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub front: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        let mut camera = Self {
            position: Vec3::new(5.0, 5.0, 5.0),
            front: Vec3::NEG_Z,
            up: WORLD_UP,
            right: Vec3::X,
            yaw: -90.0,
            pitch: 0.0,
            fov: 45.0,
            near: 0.1,
            far: 100.0,
        };
        camera.update_vectors();
        camera
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub position: Vec3,
    pub front: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        let direction = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos());
        self.front = direction.normalize();
        self.right = self.front.cross(WORLD_UP).normalize();
        self.up = self.right.cross(self.front).normalize();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), aspect.max(0.0001), self.near, self.far)
    }

    pub fn view_projection(&self, viewport: PhysicalSize<u32>) -> Mat4 {
        let aspect = if viewport.height > 0 { viewport.width as f32 / viewport.height as f32 } else { 1.0 };
        self.projection_matrix(aspect) * self.view_matrix()
    }

    pub fn view(&self) -> CameraView {
        CameraView {
            position: self.position,
            front: self.front,
            up: self.up,
            fov: self.fov,
            near: self.near,
            far: self.far,
        }
    }

    /// Returns false and leaves the camera untouched when no camera is designated
    /// or the designated entity is not of kind `Camera`.
    pub fn sync_from_world(&mut self, world: &SceneWorld) -> bool {
        let Some(handle) = world.scene_camera() else {
            return false;
        };
        let Ok(entity) = world.get(handle) else {
            return false;
        };
        if entity.kind != EntityKind::Camera {
            return false;
        }
        self.position = entity.position();
        self.yaw = entity.rotation().y;
        self.pitch = entity.rotation().x;
        self.fov = entity.camera.fov;
        self.near = entity.camera.near;
        self.far = entity.camera.far;
        self.update_vectors();
        true
    }
}
