use ember_gl::{GlBackend, GlError, ShaderStage};
use glam::Mat4;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Errors from building a shader program.
///
/// Every variant carrying a `log` holds the driver's diagnostic output.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to read shader source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Gl(#[from] GlError),
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("shader program failed to link:\n{log}")]
    Link { log: String },
    #[error("shader program failed validation:\n{log}")]
    Validate { log: String },
}

/// A linked GPU program built from a vertex and a fragment shader.
pub struct Shader<B: GlBackend> {
    gl: Arc<B>,
    program: B::Program,
}

impl<B: GlBackend> Shader<B> {
    /// Load `<base>.vert` and `<base>.frag` and build a program from them.
    ///
    /// The extension is appended to the whole path, so `shaders/basic.v2`
    /// reads `shaders/basic.v2.vert`.
    pub fn load(gl: Arc<B>, base: impl AsRef<Path>) -> Result<Self, ShaderError> {
        let base = base.as_ref();
        let vertex = read_source(base, ShaderStage::Vertex)?;
        let fragment = read_source(base, ShaderStage::Fragment)?;
        let shader = Self::from_sources(gl, &vertex, &fragment)?;
        tracing::debug!("loaded shader program {:?} from {}", shader.program, base.display());
        Ok(shader)
    }

    /// Compile both stages, attach them to one program, link, and validate.
    ///
    /// Diagnostics are logged at error level before the error is returned.
    /// Nothing created along the way outlives a failure.
    pub fn from_sources(gl: Arc<B>, vertex: &str, fragment: &str) -> Result<Self, ShaderError> {
        let program = gl.create_program()?;

        let mut attached = Vec::with_capacity(2);
        let mut result = Ok(());
        for (stage, source) in [
            (ShaderStage::Vertex, vertex),
            (ShaderStage::Fragment, fragment),
        ] {
            match compile(gl.as_ref(), stage, source) {
                Ok(shader) => {
                    gl.attach_shader(program, shader);
                    attached.push(shader);
                }
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }

        if result.is_ok() {
            result = link_and_validate(gl.as_ref(), program);
        }

        for shader in attached {
            gl.detach_shader(program, shader);
            gl.delete_shader(shader);
        }

        if let Err(e) = result {
            gl.delete_program(program);
            return Err(e);
        }

        Ok(Self { gl, program })
    }

    /// Make this program current.
    pub fn bind(&self) {
        self.gl.use_program(Some(self.program));
    }

    /// Clear the current program.
    pub fn unbind(&self) {
        self.gl.use_program(None);
    }

    /// Native program handle.
    pub fn program(&self) -> B::Program {
        self.program
    }

    /// Look up a uniform by name. Not cached; every call queries the driver.
    pub fn uniform_location(&self, name: &str) -> Option<B::UniformLocation> {
        self.gl.uniform_location(self.program, name)
    }

    /// Set a float, vec2, vec3, or vec4 uniform depending on `values.len()`.
    ///
    /// Any other length is ignored without touching the driver.
    pub fn set_uniform_f32(&self, name: &str, values: &[f32]) {
        match *values {
            [x] => self.gl.uniform_1_f32(self.uniform_location(name).as_ref(), x),
            [x, y] => self.gl.uniform_2_f32(self.uniform_location(name).as_ref(), x, y),
            [x, y, z] => self
                .gl
                .uniform_3_f32(self.uniform_location(name).as_ref(), x, y, z),
            [x, y, z, w] => self
                .gl
                .uniform_4_f32(self.uniform_location(name).as_ref(), x, y, z, w),
            _ => tracing::trace!(
                "ignoring uniform {name} with {} components",
                values.len()
            ),
        }
    }

    /// Upload a 4x4 matrix in column-major order.
    pub fn set_uniform_mat4(&self, name: &str, matrix: &Mat4) {
        let location = self.uniform_location(name);
        self.gl
            .uniform_matrix_4_f32(location.as_ref(), false, &matrix.to_cols_array());
    }
}

impl<B: GlBackend> Drop for Shader<B> {
    fn drop(&mut self) {
        tracing::debug!("releasing shader program {:?}", self.program);
        self.gl.delete_program(self.program);
    }
}

impl<B: GlBackend> std::fmt::Debug for Shader<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shader")
            .field("program", &self.program)
            .finish()
    }
}

fn source_path(base: &Path, stage: ShaderStage) -> PathBuf {
    let mut path = OsString::from(base.as_os_str());
    path.push(".");
    path.push(stage.extension());
    PathBuf::from(path)
}

fn read_source(base: &Path, stage: ShaderStage) -> Result<String, ShaderError> {
    let path = source_path(base, stage);
    std::fs::read_to_string(&path).map_err(|source| {
        tracing::error!("cannot read {stage} shader {}: {source}", path.display());
        ShaderError::Io { path, source }
    })
}

fn compile<B: GlBackend>(gl: &B, stage: ShaderStage, source: &str) -> Result<B::Shader, ShaderError> {
    let shader = gl.create_shader(stage)?;
    gl.shader_source(shader, source);
    gl.compile_shader(shader);

    if !gl.shader_compile_status(shader) {
        let log = gl.shader_info_log(shader);
        tracing::error!("{stage} shader compile failed:\n{log}");
        gl.delete_shader(shader);
        return Err(ShaderError::Compile { stage, log });
    }

    Ok(shader)
}

fn link_and_validate<B: GlBackend>(gl: &B, program: B::Program) -> Result<(), ShaderError> {
    gl.link_program(program);
    if !gl.program_link_status(program) {
        let log = gl.program_info_log(program);
        tracing::error!("shader link failed:\n{log}");
        return Err(ShaderError::Link { log });
    }

    gl.validate_program(program);
    if !gl.program_validate_status(program) {
        let log = gl.program_info_log(program);
        tracing::error!("shader validation failed:\n{log}");
        return Err(ShaderError::Validate { log });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BASIC_FRAGMENT_SHADER, BASIC_VERTEX_SHADER};
    use ember_gl::{GlCall, RecordingBackend};
    use glam::Vec4;

    fn basic(gl: &Arc<RecordingBackend>) -> Shader<RecordingBackend> {
        Shader::from_sources(gl.clone(), BASIC_VERTEX_SHADER, BASIC_FRAGMENT_SHADER).unwrap()
    }

    #[test]
    fn build_pipeline_order() {
        let gl = Arc::new(RecordingBackend::new());
        let shader = basic(&gl);
        assert_eq!(shader.program(), 1);
        assert_eq!(
            gl.calls(),
            vec![
                GlCall::CreateProgram(1),
                GlCall::CreateShader {
                    shader: 2,
                    stage: ShaderStage::Vertex
                },
                GlCall::ShaderSource {
                    shader: 2,
                    bytes: BASIC_VERTEX_SHADER.len()
                },
                GlCall::CompileShader(2),
                GlCall::AttachShader {
                    program: 1,
                    shader: 2
                },
                GlCall::CreateShader {
                    shader: 3,
                    stage: ShaderStage::Fragment
                },
                GlCall::ShaderSource {
                    shader: 3,
                    bytes: BASIC_FRAGMENT_SHADER.len()
                },
                GlCall::CompileShader(3),
                GlCall::AttachShader {
                    program: 1,
                    shader: 3
                },
                GlCall::LinkProgram(1),
                GlCall::ValidateProgram(1),
                GlCall::DetachShader {
                    program: 1,
                    shader: 2
                },
                GlCall::DeleteShader(2),
                GlCall::DetachShader {
                    program: 1,
                    shader: 3
                },
                GlCall::DeleteShader(3),
            ]
        );
        // Only the program stays alive.
        assert_eq!(gl.live_objects(), 1);
    }

    #[test]
    fn drop_releases_program() {
        let gl = Arc::new(RecordingBackend::new());
        drop(basic(&gl));
        assert_eq!(gl.live_objects(), 0);
        assert_eq!(gl.calls().last(), Some(&GlCall::DeleteProgram(1)));
    }

    #[test]
    fn compile_failure_cleans_up() {
        let gl = Arc::new(
            RecordingBackend::new().failing_compile(ShaderStage::Fragment, "0:3: 'vec5' undeclared"),
        );
        let err = Shader::from_sources(gl.clone(), "v", "f").unwrap_err();
        match err {
            ShaderError::Compile { stage, log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(log.contains("vec5"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(gl.live_objects(), 0);
        assert!(!gl.calls().contains(&GlCall::LinkProgram(1)));
    }

    #[test]
    fn link_failure_skips_validation() {
        let gl = Arc::new(RecordingBackend::new().failing_link("missing main"));
        let err = Shader::from_sources(gl.clone(), "v", "f").unwrap_err();
        assert!(matches!(err, ShaderError::Link { ref log } if log == "missing main"));
        assert!(!gl.calls().contains(&GlCall::ValidateProgram(1)));
        assert_eq!(gl.live_objects(), 0);
    }

    #[test]
    fn validate_failure_is_reported() {
        let gl = Arc::new(RecordingBackend::new().failing_validate("sampler mismatch"));
        let err = Shader::from_sources(gl.clone(), "v", "f").unwrap_err();
        assert!(matches!(err, ShaderError::Validate { .. }));
        assert_eq!(gl.live_objects(), 0);
    }

    #[test]
    fn bind_and_unbind() {
        let gl = Arc::new(RecordingBackend::new());
        let shader = basic(&gl);
        gl.take_calls();
        shader.bind();
        shader.unbind();
        assert_eq!(
            gl.calls(),
            vec![GlCall::UseProgram(Some(1)), GlCall::UseProgram(None)]
        );
    }

    #[test]
    fn uniform_arity_dispatch() {
        let gl = Arc::new(RecordingBackend::new());
        let shader = basic(&gl);
        gl.take_calls();

        shader.set_uniform_f32("u_a", &[1.0]);
        shader.set_uniform_f32("u_b", &[1.0, 2.0]);
        shader.set_uniform_f32("u_c", &[1.0, 2.0, 3.0]);
        shader.set_uniform_f32("u_d", &[1.0, 2.0, 3.0, 4.0]);

        let uploads: Vec<GlCall> = gl
            .calls()
            .into_iter()
            .filter(|c| !matches!(c, GlCall::GetUniformLocation { .. }))
            .collect();
        assert_eq!(
            uploads,
            vec![
                GlCall::Uniform1f {
                    location: Some(0),
                    x: 1.0
                },
                GlCall::Uniform2f {
                    location: Some(1),
                    x: 1.0,
                    y: 2.0
                },
                GlCall::Uniform3f {
                    location: Some(2),
                    x: 1.0,
                    y: 2.0,
                    z: 3.0
                },
                GlCall::Uniform4f {
                    location: Some(3),
                    x: 1.0,
                    y: 2.0,
                    z: 3.0,
                    w: 4.0
                },
            ]
        );
    }

    #[test]
    fn out_of_range_arity_is_a_no_op() {
        let gl = Arc::new(RecordingBackend::new());
        let shader = basic(&gl);
        gl.take_calls();

        shader.set_uniform_f32("u_empty", &[]);
        shader.set_uniform_f32("u_five", &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn location_is_looked_up_every_call() {
        let gl = Arc::new(RecordingBackend::new());
        let shader = basic(&gl);
        gl.take_calls();

        shader.set_uniform_f32("u_time", &[0.5]);
        shader.set_uniform_f32("u_time", &[0.6]);
        let lookups = gl
            .calls()
            .iter()
            .filter(|c| matches!(c, GlCall::GetUniformLocation { name, .. } if name == "u_time"))
            .count();
        assert_eq!(lookups, 2);
    }

    #[test]
    fn matrix_uploads_column_major() {
        let gl = Arc::new(RecordingBackend::new());
        let shader = basic(&gl);
        gl.take_calls();

        let m = Mat4::from_cols(
            Vec4::new(1.0, 2.0, 3.0, 4.0),
            Vec4::new(5.0, 6.0, 7.0, 8.0),
            Vec4::new(9.0, 10.0, 11.0, 12.0),
            Vec4::new(13.0, 14.0, 15.0, 16.0),
        );
        shader.set_uniform_mat4("u_mvp", &m);

        let expected: [f32; 16] = std::array::from_fn(|i| (i + 1) as f32);
        assert_eq!(
            gl.calls().last(),
            Some(&GlCall::UniformMatrix4 {
                location: Some(0),
                transpose: false,
                data: expected
            })
        );
    }

    #[test]
    fn source_path_appends_extension() {
        assert_eq!(
            source_path(Path::new("shaders/basic"), ShaderStage::Vertex),
            PathBuf::from("shaders/basic.vert")
        );
        assert_eq!(
            source_path(Path::new("shaders/basic.v2"), ShaderStage::Fragment),
            PathBuf::from("shaders/basic.v2.frag")
        );
    }

    #[test]
    fn load_reads_vert_and_frag_pair() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("lit");
        std::fs::write(base.with_extension("vert"), "vertex source").unwrap();
        std::fs::write(base.with_extension("frag"), "fragment src").unwrap();

        let gl = Arc::new(RecordingBackend::new());
        let _shader = Shader::load(gl.clone(), &base).unwrap();
        let sizes: Vec<usize> = gl
            .calls()
            .iter()
            .filter_map(|c| match c {
                GlCall::ShaderSource { bytes, .. } => Some(*bytes),
                _ => None,
            })
            .collect();
        assert_eq!(sizes, vec!["vertex source".len(), "fragment src".len()]);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("missing");
        let gl = Arc::new(RecordingBackend::new());
        let err = Shader::load(gl.clone(), &base).unwrap_err();
        match err {
            ShaderError::Io { path, .. } => assert_eq!(path, dir.path().join("missing.vert")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(gl.calls().is_empty());
    }
}
