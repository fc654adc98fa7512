use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Identity transform placed at `position`.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Rotate by `angle` radians about a world-space `axis`.
    ///
    /// The new rotation is applied on top of the current one, then renormalized
    /// so repeated small rotations do not drift.
    pub fn rotate(&mut self, axis: Vec3, angle: f32) {
        self.rotation = (Quat::from_axis_angle(axis.normalize(), angle) * self.rotation).normalize();
    }

    /// Move along `dir` by `amount` units.
    pub fn translate(&mut self, dir: Vec3, amount: f32) {
        self.position += dir * amount;
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    pub fn back(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn left(&self) -> Vec3 {
        self.rotation * Vec3::NEG_X
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Model matrix: scale, then rotate, then translate.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// World-to-view matrix for a viewer located at this transform.
    /// Scale is ignored.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation.conjugate()) * Mat4::from_translation(-self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn identity_axes() {
        let t = Transform::default();
        assert_eq!(t.forward(), Vec3::Z);
        assert_eq!(t.back(), Vec3::NEG_Z);
        assert_eq!(t.right(), Vec3::X);
        assert_eq!(t.left(), Vec3::NEG_X);
        assert_eq!(t.up(), Vec3::Y);
    }

    #[test]
    fn yaw_turns_forward_towards_right() {
        let mut t = Transform::default();
        t.rotate(Vec3::Y, FRAC_PI_2);
        assert!(approx(t.forward(), Vec3::X));
        assert!(approx(t.right(), Vec3::NEG_Z));
    }

    #[test]
    fn negative_pitch_about_right_looks_up() {
        let mut t = Transform::default();
        let right = t.right();
        t.rotate(right, -0.3);
        assert!(t.forward().y > 0.0);
    }

    #[test]
    fn rotation_stays_normalized() {
        let mut t = Transform::default();
        for i in 0..1000 {
            t.rotate(Vec3::Y, 0.01);
            t.rotate(t.right(), if i % 2 == 0 { 0.003 } else { -0.002 });
        }
        assert!((t.rotation.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn translate_moves_along_direction() {
        let mut t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        t.translate(Vec3::Z, 2.5);
        assert_eq!(t.position, Vec3::new(1.0, 2.0, 5.5));
    }

    #[test]
    fn view_matrix_maps_position_to_origin() {
        let mut t = Transform::from_position(Vec3::new(4.0, -2.0, 7.0));
        t.rotate(Vec3::Y, 0.7);
        let eye = t.view_matrix().transform_point3(t.position);
        assert!(approx(eye, Vec3::ZERO));
        let ahead = t.view_matrix().transform_point3(t.position + t.forward() * 3.0);
        assert!(approx(ahead, Vec3::new(0.0, 0.0, 3.0)));
    }
}
