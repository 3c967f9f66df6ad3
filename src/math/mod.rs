mod aabb;
mod billboard;
mod transform;

pub use aabb::AABB;
pub use billboard::{billboard_position, face_camera, DEFAULT_PLANE_DISTANCE};
pub use transform::Transform;
