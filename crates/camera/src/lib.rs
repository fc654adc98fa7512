//! Camera: cached projection, optional view, fly-style input.
//!
//! # Invariants
//! - The projection matrix is recomputed only at construction and on aspect
//!   changes; [`Camera::projection_revision`] counts those recomputations.
//! - The view matrix is absent until the camera has a transform.

mod camera;
mod projection;

pub use camera::{BOOST_MULTIPLIER, Camera};
pub use projection::Projection;

pub fn crate_info() -> &'static str {
    "ember-camera v0.1.0"
}
