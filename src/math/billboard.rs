use glam::Vec3;

use super::Transform;

/// Distance of a revealed plane from the world origin
pub const DEFAULT_PLANE_DISTANCE: f32 = 10.0;

/// Position of a billboard plane for the given camera.
///
/// The plane sits on the ray from the origin through the camera, `distance`
/// units from the origin: the direction from the camera toward the origin,
/// scaled and negated. Returns `None` when the camera is at the origin and
/// the direction is undefined.
pub fn billboard_position(camera: Vec3, distance: f32) -> Option<Vec3> {
    let to_origin = (Vec3::ZERO - camera).normalize_or_zero();
    if to_origin == Vec3::ZERO {
        return None;
    }
    Some(to_origin * -distance)
}

/// Re-pose `transform` as a billboard: placed by [`billboard_position`],
/// facing the camera. Leaves the transform untouched if the pose is undefined.
pub fn face_camera(transform: &mut Transform, camera: Vec3, distance: f32) -> bool {
    match billboard_position(camera, distance) {
        Some(position) => {
            transform.translation = position;
            transform.look_at(camera);
            true
        }
        None => false,
    }
}
