use crate::projection::Projection;
use ember_common::Transform;
use ember_gl::GlBackend;
use ember_input::{InputSource, KeyBindings};
use glam::{Mat4, Vec3};

/// Speed multiplier while the boost key is held.
pub const BOOST_MULTIPLIER: f32 = 10.0;

/// A camera with a cached projection matrix and an optional transform.
///
/// Until a transform is attached the camera has no view matrix, and input
/// handling does nothing.
#[derive(Debug, Clone)]
pub struct Camera {
    projection: Projection,
    projection_matrix: Mat4,
    projection_revision: u64,
    transform: Option<Transform>,
    view: Option<Mat4>,
    bindings: KeyBindings,
}

impl Camera {
    pub fn new(projection: Projection) -> Self {
        let mut camera = Self {
            projection,
            projection_matrix: Mat4::IDENTITY,
            projection_revision: 0,
            transform: None,
            view: None,
            bindings: KeyBindings::default(),
        };
        camera.calculate_projection_matrix();
        camera
    }

    /// Perspective camera; `fov` is the vertical field of view in radians.
    pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::Perspective {
            fov,
            aspect,
            near,
            far,
        })
    }

    pub fn orthographic(height: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::Orthographic {
            height,
            aspect,
            near,
            far,
        })
    }

    /// Attach a transform at construction time.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.set_transform(transform);
        self
    }

    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// The cached projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    /// How many times the projection matrix has been computed.
    pub fn projection_revision(&self) -> u64 {
        self.projection_revision
    }

    /// Recompute and cache the projection matrix.
    pub fn calculate_projection_matrix(&mut self) -> Mat4 {
        self.projection_matrix = self.projection.matrix();
        self.projection_revision += 1;
        self.projection_matrix
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    /// Mutable access to the transform. Call
    /// [`calculate_view_matrix`](Self::calculate_view_matrix) after editing.
    pub fn transform_mut(&mut self) -> Option<&mut Transform> {
        self.transform.as_mut()
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = Some(transform);
        self.calculate_view_matrix();
    }

    /// Recompute the view matrix from the transform.
    ///
    /// Returns `None`, leaving the view absent, when there is no transform.
    pub fn calculate_view_matrix(&mut self) -> Option<Mat4> {
        self.view = self.transform.as_ref().map(Transform::view_matrix);
        self.view
    }

    pub fn view_matrix(&self) -> Option<Mat4> {
        self.view
    }

    /// `projection * view`, once a view exists.
    pub fn view_projection(&self) -> Option<Mat4> {
        self.view.map(|view| self.projection_matrix * view)
    }

    /// Fit the camera to a `width` x `height` pixel viewport and resize the
    /// native viewport to match.
    pub fn adjust_to_viewport<B: GlBackend>(&mut self, gl: &B, width: u32, height: u32) {
        let aspect = width as f32 / height.max(1) as f32;
        self.projection.set_aspect(aspect);
        self.calculate_projection_matrix();
        self.calculate_view_matrix();
        tracing::debug!("camera viewport {width}x{height}, aspect {aspect:.3}");
        gl.viewport(0, 0, width as i32, height as i32);
    }

    /// Apply one frame of mouse look and movement.
    ///
    /// Rotation happens first, so movement follows the updated orientation.
    /// `sens` is degrees per unit of mouse delta; `speed` is units per second.
    pub fn process_input(&mut self, input: &impl InputSource, dt: f32, speed: f32, sens: f32) {
        let Some(transform) = self.transform.as_mut() else {
            return;
        };

        let delta = input.mouse_delta();
        transform.rotate(Vec3::Y, (delta.x * sens).to_radians());
        let right = transform.right();
        transform.rotate(right, -(delta.y * sens).to_radians());

        let speed = if input.is_key_down(self.bindings.boost) {
            speed * BOOST_MULTIPLIER
        } else {
            speed
        };
        let amount = speed * dt;

        if input.is_key_down(self.bindings.forward) {
            let dir = transform.forward();
            transform.translate(dir, amount);
        }
        if input.is_key_down(self.bindings.back) {
            let dir = transform.forward();
            transform.translate(dir, -amount);
        }
        if input.is_key_down(self.bindings.left) {
            let dir = transform.left();
            transform.translate(dir, amount);
        }
        if input.is_key_down(self.bindings.right) {
            let dir = transform.right();
            transform.translate(dir, amount);
        }

        self.calculate_view_matrix();
    }
}
