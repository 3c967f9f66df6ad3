use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

/// Translation, rotation and scale of a scene object or glTF node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Build from a position, XYZ euler angles in radians and a uniform scale
    pub fn from_placement(position: [f32; 3], euler: [f32; 3], scale: f32) -> Self {
        Self {
            translation: Vec3::from_array(position),
            rotation: Quat::from_euler(EulerRot::XYZ, euler[0], euler[1], euler[2]),
            scale: Vec3::splat(scale),
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Local +Z axis in world space
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Rotate so the local +Z axis points at `target`, keeping +Y as close
    /// to world up as possible. No-op when `target` equals the translation.
    pub fn look_at(&mut self, target: Vec3) {
        let z = (target - self.translation).normalize_or_zero();
        if z == Vec3::ZERO {
            return;
        }

        let up = if z.cross(Vec3::Y).length_squared() < 1e-8 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let x = up.cross(z).normalize();
        let y = z.cross(x);

        self.rotation = Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize();
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
