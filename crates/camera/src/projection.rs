use glam::{Mat4, Vec4};
use serde::{Deserialize, Serialize};

/// Projection parameters, chosen when the camera is built.
///
/// Both variants are left-handed (the camera looks down +Z) and map the
/// near/far planes to NDC depth -1 and +1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    Perspective {
        /// Vertical field of view in radians.
        fov: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        /// Visible vertical extent in world units; width is `height * aspect`.
        height: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
}

impl Projection {
    pub fn aspect(&self) -> f32 {
        match *self {
            Projection::Perspective { aspect, .. } | Projection::Orthographic { aspect, .. } => {
                aspect
            }
        }
    }

    pub fn set_aspect(&mut self, value: f32) {
        match self {
            Projection::Perspective { aspect, .. } | Projection::Orthographic { aspect, .. } => {
                *aspect = value
            }
        }
    }

    pub fn near(&self) -> f32 {
        match *self {
            Projection::Perspective { near, .. } | Projection::Orthographic { near, .. } => near,
        }
    }

    pub fn far(&self) -> f32 {
        match *self {
            Projection::Perspective { far, .. } | Projection::Orthographic { far, .. } => far,
        }
    }

    /// Build the projection matrix.
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Projection::Perspective {
                fov,
                aspect,
                near,
                far,
            } => {
                let tan_half_fov = (fov / 2.0).tan();
                let z_range = near - far;
                Mat4::from_cols(
                    Vec4::new(1.0 / (tan_half_fov * aspect), 0.0, 0.0, 0.0),
                    Vec4::new(0.0, 1.0 / tan_half_fov, 0.0, 0.0),
                    Vec4::new(0.0, 0.0, (-near - far) / z_range, 1.0),
                    Vec4::new(0.0, 0.0, 2.0 * far * near / z_range, 0.0),
                )
            }
            Projection::Orthographic {
                height,
                aspect,
                near,
                far,
            } => {
                let width = height * aspect;
                let depth = far - near;
                Mat4::from_cols(
                    Vec4::new(2.0 / width, 0.0, 0.0, 0.0),
                    Vec4::new(0.0, 2.0 / height, 0.0, 0.0),
                    Vec4::new(0.0, 0.0, 2.0 / depth, 0.0),
                    Vec4::new(0.0, 0.0, -(far + near) / depth, 1.0),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    const EPS: f32 = 1e-5;

    fn ndc_depth(m: Mat4, z: f32) -> f32 {
        m.project_point3(Vec3::new(0.0, 0.0, z)).z
    }

    #[test]
    fn perspective_matches_closed_form() {
        for &(fov_deg, aspect, near, far) in &[
            (70.0_f32, 16.0 / 9.0, 0.01, 1000.0),
            (45.0, 1.0, 0.1, 100.0),
            (120.0, 0.5, 1.0, 2.0),
            (1.0, 4.0 / 3.0, 0.5, 5000.0),
        ] {
            let fov = fov_deg.to_radians();
            let m = Projection::Perspective {
                fov,
                aspect,
                near,
                far,
            }
            .matrix();
            let t = (fov / 2.0).tan();

            // m.col(c)[r] is row r, column c.
            assert!((m.col(0)[0] - 1.0 / (t * aspect)).abs() < EPS);
            assert!((m.col(1)[1] - 1.0 / t).abs() < EPS * m.col(1)[1].abs().max(1.0));
            assert!((m.col(2)[2] - (-near - far) / (near - far)).abs() < EPS);
            assert!((m.col(3)[2] - 2.0 * far * near / (near - far)).abs() < EPS * far);
            assert_eq!(m.col(2)[3], 1.0);
            assert_eq!(m.col(3)[3], 0.0);

            for (r, c) in [(0, 1), (0, 2), (0, 3), (1, 0), (1, 2), (1, 3), (2, 0), (2, 1), (3, 0), (3, 1)] {
                assert_eq!(m.col(c)[r], 0.0, "term ({r}, {c})");
            }
        }
    }

    #[test]
    fn perspective_maps_planes_to_ndc_bounds() {
        let m = Projection::Perspective {
            fov: 60.0_f32.to_radians(),
            aspect: 1.5,
            near: 0.5,
            far: 50.0,
        }
        .matrix();
        assert!((ndc_depth(m, 0.5) + 1.0).abs() < 1e-4);
        assert!((ndc_depth(m, 50.0) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn orthographic_maps_extents() {
        let m = Projection::Orthographic {
            height: 10.0,
            aspect: 2.0,
            near: 1.0,
            far: 11.0,
        }
        .matrix();
        let corner = m.project_point3(Vec3::new(10.0, 5.0, 1.0));
        assert!((corner - Vec3::new(1.0, 1.0, -1.0)).length() < EPS);
        assert!((ndc_depth(m, 11.0) - 1.0).abs() < EPS);
    }

    #[test]
    fn aspect_accessors() {
        let mut p = Projection::Orthographic {
            height: 2.0,
            aspect: 1.0,
            near: 0.0,
            far: 1.0,
        };
        p.set_aspect(3.0);
        assert_eq!(p.aspect(), 3.0);
        assert_eq!(p.near(), 0.0);
        assert_eq!(p.far(), 1.0);
    }
}
