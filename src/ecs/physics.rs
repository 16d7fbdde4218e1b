use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsParams {
    pub gravity: Vec3,
    pub ground_height: f32,
    /// Fraction of vertical speed kept after a ground bounce.
    pub restitution: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self { gravity: Vec3::new(0.0, -9.81, 0.0), ground_height: -1.0, restitution: 0.5 }
    }
}
