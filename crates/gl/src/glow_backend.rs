use crate::backend::{BufferTarget, GlBackend, GlError, ShaderStage};
use glow::HasContext;
use std::sync::Arc;

type Native = glow::Context;

/// [`GlBackend`] over a live OpenGL context.
///
/// All calls require the context to be current on the calling thread.
#[derive(Clone)]
pub struct GlowBackend {
    gl: Arc<glow::Context>,
}

impl GlowBackend {
    pub fn new(gl: Arc<glow::Context>) -> Self {
        let version = gl.version();
        tracing::debug!(
            "glow backend on GL {}.{} (embedded={})",
            version.major,
            version.minor,
            version.is_embedded
        );
        Self { gl }
    }

    /// The wrapped context.
    pub fn context(&self) -> &Arc<glow::Context> {
        &self.gl
    }
}

impl std::fmt::Debug for GlowBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlowBackend").finish_non_exhaustive()
    }
}

fn stage_enum(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn target_enum(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
    }
}

// SAFETY (all blocks below): arguments are handles created by this context
// or plain values; the caller keeps the context current.
impl GlBackend for GlowBackend {
    type Program = <Native as HasContext>::Program;
    type Shader = <Native as HasContext>::Shader;
    type VertexArray = <Native as HasContext>::VertexArray;
    type Buffer = <Native as HasContext>::Buffer;
    type UniformLocation = <Native as HasContext>::UniformLocation;

    fn create_program(&self) -> Result<Self::Program, GlError> {
        unsafe { self.gl.create_program() }.map_err(|e| GlError::create("program", e))
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { self.gl.delete_program(program) }
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, GlError> {
        unsafe { self.gl.create_shader(stage_enum(stage)) }
            .map_err(|e| GlError::create("shader", e))
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.delete_shader(shader) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { self.gl.shader_source(shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.compile_shader(shader) }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.gl.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.gl.get_shader_info_log(shader) }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.attach_shader(program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.detach_shader(program, shader) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { self.gl.link_program(program) }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.gl.get_program_link_status(program) }
    }

    fn validate_program(&self, program: Self::Program) {
        unsafe { self.gl.validate_program(program) }
    }

    fn program_validate_status(&self, program: Self::Program) -> bool {
        unsafe { self.gl.get_program_parameter_i32(program, glow::VALIDATE_STATUS) != 0 }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.gl.get_program_info_log(program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { self.gl.use_program(program) }
    }

    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn uniform_1_f32(&self, location: Option<&Self::UniformLocation>, x: f32) {
        unsafe { self.gl.uniform_1_f32(location, x) }
    }

    fn uniform_2_f32(&self, location: Option<&Self::UniformLocation>, x: f32, y: f32) {
        unsafe { self.gl.uniform_2_f32(location, x, y) }
    }

    fn uniform_3_f32(&self, location: Option<&Self::UniformLocation>, x: f32, y: f32, z: f32) {
        unsafe { self.gl.uniform_3_f32(location, x, y, z) }
    }

    fn uniform_4_f32(
        &self,
        location: Option<&Self::UniformLocation>,
        x: f32,
        y: f32,
        z: f32,
        w: f32,
    ) {
        unsafe { self.gl.uniform_4_f32(location, x, y, z, w) }
    }

    fn uniform_matrix_4_f32(
        &self,
        location: Option<&Self::UniformLocation>,
        transpose: bool,
        data: &[f32; 16],
    ) {
        unsafe { self.gl.uniform_matrix_4_f32_slice(location, transpose, data) }
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, GlError> {
        unsafe { self.gl.create_vertex_array() }.map_err(|e| GlError::create("vertex array", e))
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { self.gl.delete_vertex_array(vertex_array) }
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        unsafe { self.gl.bind_vertex_array(vertex_array) }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, GlError> {
        unsafe { self.gl.create_buffer() }.map_err(|e| GlError::create("buffer", e))
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { self.gl.delete_buffer(buffer) }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>) {
        unsafe { self.gl.bind_buffer(target_enum(target), buffer) }
    }

    fn buffer_data_static(&self, target: BufferTarget, data: &[u8]) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(target_enum(target), data, glow::STATIC_DRAW)
        }
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(index, size, glow::FLOAT, false, stride, offset)
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) }
    }

    fn disable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.gl.disable_vertex_attrib_array(index) }
    }

    fn draw_triangles_u32(&self, count: i32, offset: i32) {
        unsafe {
            self.gl
                .draw_elements(glow::TRIANGLES, count, glow::UNSIGNED_INT, offset)
        }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn set_depth_test(&self, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(glow::DEPTH_TEST);
            } else {
                self.gl.disable(glow::DEPTH_TEST);
            }
        }
    }

    fn clear_depth(&self) {
        unsafe { self.gl.clear(glow::DEPTH_BUFFER_BIT) }
    }
}
