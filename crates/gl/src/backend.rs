use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors raised by a backend when a native object cannot be created.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GlError {
    #[error("failed to create {kind}: {message}")]
    Create { kind: &'static str, message: String },
}

impl GlError {
    pub fn create(kind: &'static str, message: impl Into<String>) -> Self {
        Self::Create {
            kind,
            message: message.into(),
        }
    }
}

/// Programmable pipeline stage a shader object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// Conventional file extension for sources of this stage, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vert",
            ShaderStage::Fragment => "frag",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Buffer binding point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BufferTarget {
    /// Vertex attribute data.
    Array,
    /// Index data.
    ElementArray,
}

/// The native graphics API surface used by the engine.
///
/// Methods mirror OpenGL entry points one-to-one. Handles are plain copies;
/// ownership and release are the caller's job (see `ember-render`).
pub trait GlBackend {
    type Program: Copy + fmt::Debug;
    type Shader: Copy + fmt::Debug;
    type VertexArray: Copy + fmt::Debug;
    type Buffer: Copy + fmt::Debug;
    type UniformLocation: fmt::Debug;

    // Programs and shaders
    fn create_program(&self) -> Result<Self::Program, GlError>;
    fn delete_program(&self, program: Self::Program);
    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, GlError>;
    fn delete_shader(&self, shader: Self::Shader);
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn validate_program(&self, program: Self::Program);
    fn program_validate_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn use_program(&self, program: Option<Self::Program>);

    // Uniforms
    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation>;
    fn uniform_1_f32(&self, location: Option<&Self::UniformLocation>, x: f32);
    fn uniform_2_f32(&self, location: Option<&Self::UniformLocation>, x: f32, y: f32);
    fn uniform_3_f32(&self, location: Option<&Self::UniformLocation>, x: f32, y: f32, z: f32);
    fn uniform_4_f32(
        &self,
        location: Option<&Self::UniformLocation>,
        x: f32,
        y: f32,
        z: f32,
        w: f32,
    );
    /// Upload a 4x4 matrix given as 16 floats in column-major order.
    fn uniform_matrix_4_f32(
        &self,
        location: Option<&Self::UniformLocation>,
        transpose: bool,
        data: &[f32; 16],
    );

    // Vertex arrays and buffers
    fn create_vertex_array(&self) -> Result<Self::VertexArray, GlError>;
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    fn create_buffer(&self) -> Result<Self::Buffer, GlError>;
    fn delete_buffer(&self, buffer: Self::Buffer);
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>);
    /// Upload `data` to the buffer bound at `target` with static-draw usage.
    fn buffer_data_static(&self, target: BufferTarget, data: &[u8]);
    /// Describe a float attribute sourced from the bound array buffer.
    /// `stride` and `offset` are in bytes.
    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32);
    fn enable_vertex_attrib_array(&self, index: u32);
    fn disable_vertex_attrib_array(&self, index: u32);

    // Drawing
    /// Indexed triangle-list draw of `count` u32 indices starting at byte `offset`.
    fn draw_triangles_u32(&self, count: i32, offset: i32);
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn set_depth_test(&self, enabled: bool);
    fn clear_depth(&self);
}
