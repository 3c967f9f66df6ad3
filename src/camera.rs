use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

pub const ORBIT_SPEED: f32 = 0.005;
pub const ZOOM_STEP: f32 = 0.1;
const MIN_DISTANCE: f32 = 1.0;
const MAX_PITCH: f32 = 1.5;

/// Perspective camera orbiting the world origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl OrbitCamera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let start = Vec3::from_array(config.position);
        let distance = start.length().max(MIN_DISTANCE);
        let dir = start.normalize_or(Vec3::Z);

        Self {
            distance,
            yaw: dir.x.atan2(dir.z),
            pitch: dir.y.clamp(-1.0, 1.0).asin().clamp(-MAX_PITCH, MAX_PITCH),
            fov_y: config.fov_degrees.to_radians(),
            aspect,
            near: config.near,
            far: config.far.max(config.near + f32::EPSILON),
        }
    }

    /// Unit vector from the origin toward the camera
    pub fn direction(&self) -> Vec3 {
        Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.cos() * self.pitch.cos(),
        )
    }

    pub fn position(&self) -> Vec3 {
        self.direction() * self.distance
    }

    /// Orbit by a pointer drag in physical pixels
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * ORBIT_SPEED;
        self.pitch = (self.pitch + dy * ORBIT_SPEED).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Positive `lines` moves closer
    pub fn zoom(&mut self, lines: f32) {
        let factor = (1.0 - lines * ZOOM_STEP).max(0.1);
        let max_distance = (self.far * 0.9).max(MIN_DISTANCE);
        self.distance = (self.distance * factor).clamp(MIN_DISTANCE, max_distance);
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), Vec3::ZERO, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }
}
