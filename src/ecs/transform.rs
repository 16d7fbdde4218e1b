use super::Entity;
use glam::{Mat4, Vec3};

/// Builds `Translate * RotateX * RotateY * RotateZ * Scale` from Euler degrees.
pub fn compose_world(position: Vec3, rotation_degrees: Vec3, scale: Vec3) -> Mat4 {
    let rotation = Mat4::from_rotation_x(rotation_degrees.x.to_radians())
        * Mat4::from_rotation_y(rotation_degrees.y.to_radians())
        * Mat4::from_rotation_z(rotation_degrees.z.to_radians());
    Mat4::from_translation(position) * rotation * Mat4::from_scale(scale)
}

pub fn recompute(entity: &mut Entity) {
    entity.refresh_transform();
}
