use crate::assets::{AnimationClip, ClipKeyframe, NodeChannel};
use crate::ecs::{Entity, SceneWorld};
use glam::{Mat3, Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeySpan {
    pub current: usize,
    pub next: usize,
    pub fraction: f32,
}

/// `next` wraps to key 0 after the last key, so a clip whose first and last keys
/// differ snaps back to the first pose when it loops.
pub fn bracket<T>(keys: &[ClipKeyframe<T>], clock: f32) -> Option<KeySpan> {
    let count = keys.len();
    if count == 0 {
        return None;
    }
    let current = (0..count - 1).find(|&i| clock < keys[i + 1].time).unwrap_or(count - 1);
    let next = (current + 1) % count;
    let start = keys[current].time;
    let span = keys[next].time - start;
    let fraction = if span == 0.0 { 0.0 } else { ((clock - start) / span).clamp(0.0, 1.0) };
    Some(KeySpan { current, next, fraction })
}

pub fn sample_vec3(keys: &[ClipKeyframe<Vec3>], clock: f32) -> Option<Vec3> {
    let span = bracket(keys, clock)?;
    let from = keys[span.current].value;
    let to = keys[span.next].value;
    Some(from + (to - from) * span.fraction)
}

pub fn sample_quat(keys: &[ClipKeyframe<Quat>], clock: f32) -> Option<Quat> {
    let span = bracket(keys, clock)?;
    let from = keys[span.current].value;
    let to = keys[span.next].value;
    Some(from.slerp(to, span.fraction).normalize())
}

/// Decomposes `R = Rx(a) * Ry(b) * Rz(c)`. `c` is solved against the recovered `a`, so near
/// gimbal lock any error in `a` is absorbed by `c`.
pub fn quat_to_euler_degrees(rotation: Quat) -> Vec3 {
    let m = Mat3::from_quat(rotation);
    let at = |row: usize, col: usize| m.col(col)[row];
    let cos_b = (at(0, 0) * at(0, 0) + at(0, 1) * at(0, 1)).sqrt();
    let b = at(0, 2).atan2(cos_b);
    let a = (-at(1, 2)).atan2(at(2, 2));
    let (sin_a, cos_a) = a.sin_cos();
    let c = (cos_a * at(1, 0) + sin_a * at(2, 0)).atan2(cos_a * at(1, 1) + sin_a * at(2, 1));
    Vec3::new(a.to_degrees(), b.to_degrees(), c.to_degrees())
}

pub fn advance_clock(clock: f32, dt: f32, clip: &AnimationClip) -> f32 {
    let mut clock = clock + dt * clip.effective_ticks_per_second();
    if clock > clip.duration {
        clock = if clip.duration > 0.0 { clock % clip.duration } else { 0.0 };
    }
    clock
}

pub fn apply_channel(entity: &mut Entity, channel: &NodeChannel, clock: f32) {
    if let Some(position) = sample_vec3(&channel.position_keys, clock) {
        entity.set_position(position);
    }
    if let Some(rotation) = sample_quat(&channel.rotation_keys, clock) {
        entity.set_rotation(quat_to_euler_degrees(rotation));
    }
    if let Some(scale) = sample_vec3(&channel.scale_keys, clock) {
        entity.set_scale(scale);
    }
}

pub fn sys_drive_clips(world: &mut SceneWorld, dt: f32) {
    for (_handle, entity) in world.iter_mut() {
        drive_entity(entity, dt);
    }
}

fn drive_entity(entity: &mut Entity, dt: f32) {
    if !entity.animation.playing {
        return;
    }
    let Some(clip_name) = entity.animation.current_clip.clone() else {
        entity.animation.playing = false;
        return;
    };
    let Some(library) = entity.animation.source.clone() else {
        return;
    };
    let Some(clip) = library.find_clip(&clip_name) else {
        return;
    };

    entity.animation.clock = advance_clock(entity.animation.clock, dt, clip);
    let Some(channel) = clip.channel_for_root(library.root_node_name.as_deref()) else {
        return;
    };
    let clock = entity.animation.clock;
    apply_channel(entity, channel, clock);
}
