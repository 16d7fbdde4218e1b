use crate::ecs::physics::PhysicsParams;
use crate::ecs::{Entity, SceneWorld};

pub fn sys_integrate_bodies(world: &mut SceneWorld, params: &PhysicsParams, dt: f32) {
    let mut stepped = 0usize;
    for (_handle, entity) in world.iter_mut() {
        if !entity.physics.is_dynamic() {
            continue;
        }
        integrate_body(entity, params, dt);
        stepped += 1;
    }
    log::trace!(target: "scene_player::physics", "integrated {stepped} bodies over {dt:.4}s");
}

pub fn integrate_body(entity: &mut Entity, params: &PhysicsParams, dt: f32) {
    entity.physics.velocity += params.gravity * dt;
    let mut position = entity.position() + entity.physics.velocity * dt;
    if position.y < params.ground_height {
        position.y = params.ground_height;
        entity.physics.velocity.y = -entity.physics.velocity.y * params.restitution;
    }
    entity.set_position(position);
}
