//! Graphics API seam for the ember engine.
//!
//! Every native call the engine makes goes through [`GlBackend`]. Two
//! implementations exist:
//! - [`GlowBackend`] drives a real OpenGL context through `glow`.
//! - [`RecordingBackend`] fakes handles and records calls, for headless runs
//!   and tests.
//!
//! # Invariants
//! - Backends never validate engine-level data; callers own that.
//! - Creation failures surface as [`GlError`]; everything else is assumed to
//!   succeed, as with the underlying API.

mod backend;
mod glow_backend;
mod recording;

pub use backend::{BufferTarget, GlBackend, GlError, ShaderStage};
pub use glow_backend::GlowBackend;
pub use recording::{GlCall, RecordingBackend};

pub fn crate_info() -> &'static str {
    "ember-gl v0.1.0"
}
