pub mod animation;
pub mod physics;

pub use animation::sys_drive_clips;
pub use physics::sys_integrate_bodies;
