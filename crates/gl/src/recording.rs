use crate::backend::{BufferTarget, GlBackend, GlError, ShaderStage};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A state-changing call captured by [`RecordingBackend`].
///
/// Status and info-log queries are not recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GlCall {
    CreateProgram(u32),
    DeleteProgram(u32),
    CreateShader { shader: u32, stage: ShaderStage },
    DeleteShader(u32),
    ShaderSource { shader: u32, bytes: usize },
    CompileShader(u32),
    AttachShader { program: u32, shader: u32 },
    DetachShader { program: u32, shader: u32 },
    LinkProgram(u32),
    ValidateProgram(u32),
    UseProgram(Option<u32>),
    GetUniformLocation { program: u32, name: String },
    Uniform1f { location: Option<u32>, x: f32 },
    Uniform2f { location: Option<u32>, x: f32, y: f32 },
    Uniform3f { location: Option<u32>, x: f32, y: f32, z: f32 },
    Uniform4f { location: Option<u32>, x: f32, y: f32, z: f32, w: f32 },
    UniformMatrix4 { location: Option<u32>, transpose: bool, data: [f32; 16] },
    CreateVertexArray(u32),
    DeleteVertexArray(u32),
    BindVertexArray(Option<u32>),
    CreateBuffer(u32),
    DeleteBuffer(u32),
    BindBuffer { target: BufferTarget, buffer: Option<u32> },
    BufferData { target: BufferTarget, bytes: usize },
    VertexAttribPointer { index: u32, size: i32, stride: i32, offset: i32 },
    EnableVertexAttribArray(u32),
    DisableVertexAttribArray(u32),
    DrawElements { count: i32, offset: i32 },
    Viewport { x: i32, y: i32, width: i32, height: i32 },
    SetDepthTest(bool),
    ClearDepth,
}

#[derive(Debug, Default)]
struct Failures {
    compile: Option<(ShaderStage, String)>,
    link: Option<String>,
    validate: Option<String>,
}

#[derive(Debug)]
struct State {
    next_handle: u32,
    calls: Vec<GlCall>,
    shader_stages: HashMap<u32, ShaderStage>,
    uniform_names: Vec<String>,
    live: BTreeSet<u32>,
    failures: Failures,
}

impl Default for State {
    fn default() -> Self {
        Self {
            // Zero is reserved as "no object" in GL.
            next_handle: 1,
            calls: Vec::new(),
            shader_stages: HashMap::new(),
            uniform_names: Vec::new(),
            live: BTreeSet::new(),
            failures: Failures::default(),
        }
    }
}

impl State {
    fn allocate(&mut self) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.live.insert(handle);
        handle
    }
}

/// Headless [`GlBackend`] that hands out sequential integer handles and
/// records every state-changing call.
///
/// Every uniform name resolves to a location, stable per name. Compile, link,
/// and validate succeed unless a failure was configured with the `failing_*`
/// builders.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    state: Mutex<State>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make compilation of `stage` shaders fail with `log`.
    pub fn failing_compile(self, stage: ShaderStage, log: impl Into<String>) -> Self {
        self.lock().failures.compile = Some((stage, log.into()));
        self
    }

    /// Make program linking fail with `log`.
    pub fn failing_link(self, log: impl Into<String>) -> Self {
        self.lock().failures.link = Some(log.into());
        self
    }

    /// Make program validation fail with `log`.
    pub fn failing_validate(self, log: impl Into<String>) -> Self {
        self.lock().failures.validate = Some(log.into());
        self
    }

    /// Snapshot of the recorded calls.
    pub fn calls(&self) -> Vec<GlCall> {
        self.lock().calls.clone()
    }

    /// Drain the recorded calls.
    pub fn take_calls(&self) -> Vec<GlCall> {
        std::mem::take(&mut self.lock().calls)
    }

    /// Number of created objects not yet deleted.
    pub fn live_objects(&self) -> usize {
        self.lock().live.len()
    }

    /// Uniform name a location was handed out for.
    pub fn uniform_name(&self, location: u32) -> Option<String> {
        self.lock().uniform_names.get(location as usize).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: GlCall) {
        tracing::trace!(?call, "gl");
        self.lock().calls.push(call);
    }

    fn create(&self, make: impl FnOnce(u32) -> GlCall) -> u32 {
        let mut state = self.lock();
        let handle = state.allocate();
        state.calls.push(make(handle));
        handle
    }

    fn delete(&self, handle: u32, call: GlCall) {
        let mut state = self.lock();
        state.live.remove(&handle);
        state.calls.push(call);
    }
}

impl GlBackend for RecordingBackend {
    type Program = u32;
    type Shader = u32;
    type VertexArray = u32;
    type Buffer = u32;
    type UniformLocation = u32;

    fn create_program(&self) -> Result<u32, GlError> {
        Ok(self.create(GlCall::CreateProgram))
    }

    fn delete_program(&self, program: u32) {
        self.delete(program, GlCall::DeleteProgram(program));
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, GlError> {
        let shader = self.create(|shader| GlCall::CreateShader { shader, stage });
        self.lock().shader_stages.insert(shader, stage);
        Ok(shader)
    }

    fn delete_shader(&self, shader: u32) {
        self.delete(shader, GlCall::DeleteShader(shader));
    }

    fn shader_source(&self, shader: u32, source: &str) {
        self.record(GlCall::ShaderSource {
            shader,
            bytes: source.len(),
        });
    }

    fn compile_shader(&self, shader: u32) {
        self.record(GlCall::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        let state = self.lock();
        match (&state.failures.compile, state.shader_stages.get(&shader)) {
            (Some((failing, _)), Some(stage)) => failing != stage,
            _ => true,
        }
    }

    fn shader_info_log(&self, shader: u32) -> String {
        let state = self.lock();
        match (&state.failures.compile, state.shader_stages.get(&shader)) {
            (Some((failing, log)), Some(stage)) if failing == stage => log.clone(),
            _ => String::new(),
        }
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.record(GlCall::AttachShader { program, shader });
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        self.record(GlCall::DetachShader { program, shader });
    }

    fn link_program(&self, program: u32) {
        self.record(GlCall::LinkProgram(program));
    }

    fn program_link_status(&self, _program: u32) -> bool {
        self.lock().failures.link.is_none()
    }

    fn validate_program(&self, program: u32) {
        self.record(GlCall::ValidateProgram(program));
    }

    fn program_validate_status(&self, _program: u32) -> bool {
        self.lock().failures.validate.is_none()
    }

    fn program_info_log(&self, _program: u32) -> String {
        let state = self.lock();
        state
            .failures
            .link
            .clone()
            .or_else(|| state.failures.validate.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<u32>) {
        self.record(GlCall::UseProgram(program));
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        let mut state = self.lock();
        state.calls.push(GlCall::GetUniformLocation {
            program,
            name: name.to_string(),
        });
        let index = match state.uniform_names.iter().position(|n| n == name) {
            Some(index) => index,
            None => {
                state.uniform_names.push(name.to_string());
                state.uniform_names.len() - 1
            }
        };
        Some(index as u32)
    }

    fn uniform_1_f32(&self, location: Option<&u32>, x: f32) {
        self.record(GlCall::Uniform1f {
            location: location.copied(),
            x,
        });
    }

    fn uniform_2_f32(&self, location: Option<&u32>, x: f32, y: f32) {
        self.record(GlCall::Uniform2f {
            location: location.copied(),
            x,
            y,
        });
    }

    fn uniform_3_f32(&self, location: Option<&u32>, x: f32, y: f32, z: f32) {
        self.record(GlCall::Uniform3f {
            location: location.copied(),
            x,
            y,
            z,
        });
    }

    fn uniform_4_f32(&self, location: Option<&u32>, x: f32, y: f32, z: f32, w: f32) {
        self.record(GlCall::Uniform4f {
            location: location.copied(),
            x,
            y,
            z,
            w,
        });
    }

    fn uniform_matrix_4_f32(&self, location: Option<&u32>, transpose: bool, data: &[f32; 16]) {
        self.record(GlCall::UniformMatrix4 {
            location: location.copied(),
            transpose,
            data: *data,
        });
    }

    fn create_vertex_array(&self) -> Result<u32, GlError> {
        Ok(self.create(GlCall::CreateVertexArray))
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        self.delete(vertex_array, GlCall::DeleteVertexArray(vertex_array));
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.record(GlCall::BindVertexArray(vertex_array));
    }

    fn create_buffer(&self) -> Result<u32, GlError> {
        Ok(self.create(GlCall::CreateBuffer))
    }

    fn delete_buffer(&self, buffer: u32) {
        self.delete(buffer, GlCall::DeleteBuffer(buffer));
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<u32>) {
        self.record(GlCall::BindBuffer { target, buffer });
    }

    fn buffer_data_static(&self, target: BufferTarget, data: &[u8]) {
        self.record(GlCall::BufferData {
            target,
            bytes: data.len(),
        });
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32) {
        self.record(GlCall::VertexAttribPointer {
            index,
            size,
            stride,
            offset,
        });
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(GlCall::EnableVertexAttribArray(index));
    }

    fn disable_vertex_attrib_array(&self, index: u32) {
        self.record(GlCall::DisableVertexAttribArray(index));
    }

    fn draw_triangles_u32(&self, count: i32, offset: i32) {
        self.record(GlCall::DrawElements { count, offset });
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport {
            x,
            y,
            width,
            height,
        });
    }

    fn set_depth_test(&self, enabled: bool) {
        self.record(GlCall::SetDepthTest(enabled));
    }

    fn clear_depth(&self) {
        self.record(GlCall::ClearDepth);
    }
}
