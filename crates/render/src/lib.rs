//! GPU resources: shader programs and indexed meshes.
//!
//! # Invariants
//! - Every resource owns its native objects and releases them on drop.
//! - Resources hold an `Arc` to the backend that created them and never mix
//!   handles across backends.
//! - Vertex layout is fixed: position (attribute 0, 3 floats) followed by
//!   texture coordinate (attribute 1, 2 floats), 20-byte stride.

mod mesh;
mod model;
mod shader;
mod shaders;

pub use mesh::{FLOATS_PER_VERTEX, MeshData, POSITION_ATTRIB, TEX_COORD_ATTRIB, VERTEX_STRIDE, Vertex};
pub use model::{Model, ModelError};
pub use shader::{Shader, ShaderError};
pub use shaders::{BASIC_FRAGMENT_SHADER, BASIC_VERTEX_SHADER};

pub fn crate_info() -> &'static str {
    "ember-render v0.1.0"
}
