use crate::mesh::{FLOATS_PER_VERTEX, POSITION_ATTRIB, TEX_COORD_ATTRIB, VERTEX_STRIDE, Vertex};
use ember_gl::{BufferTarget, GlBackend, GlError};
use std::sync::Arc;

/// Errors from uploading a model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("vertex data has {len} floats, not a multiple of {FLOATS_PER_VERTEX}")]
    VertexLayout { len: usize },
    #[error("index {index} at position {position} references a missing vertex (have {vertex_count})")]
    IndexOutOfRange {
        index: u32,
        position: usize,
        vertex_count: usize,
    },
    #[error("{count} indices exceed the draw call limit")]
    TooManyIndices { count: usize },
    #[error(transparent)]
    Gl(#[from] GlError),
}

/// An indexed triangle mesh living on the GPU.
///
/// Immutable once loaded: one vertex array, one interleaved vertex buffer,
/// one index buffer, and the number of indices to draw.
pub struct Model<B: GlBackend> {
    gl: Arc<B>,
    vertex_array: B::VertexArray,
    vertex_buffer: B::Buffer,
    index_buffer: B::Buffer,
    index_count: i32,
}

impl<B: GlBackend> Model<B> {
    /// Upload interleaved `position[3] + tex_coord[2]` vertex data and u32 indices.
    pub fn load(gl: Arc<B>, vertices: &[f32], indices: &[u32]) -> Result<Self, ModelError> {
        let index_count = check_layout(vertices, indices)?;

        let vertex_array = gl.create_vertex_array()?;
        gl.bind_vertex_array(Some(vertex_array));

        let buffers = gl.create_buffer().and_then(|index_buffer| {
            match gl.create_buffer() {
                Ok(vertex_buffer) => Ok((index_buffer, vertex_buffer)),
                Err(e) => {
                    gl.delete_buffer(index_buffer);
                    Err(e)
                }
            }
        });
        let (index_buffer, vertex_buffer) = match buffers {
            Ok(buffers) => buffers,
            Err(e) => {
                gl.bind_vertex_array(None);
                gl.delete_vertex_array(vertex_array);
                return Err(e.into());
            }
        };

        // The element binding is vertex array state, so it stays bound.
        gl.bind_buffer(BufferTarget::ElementArray, Some(index_buffer));
        gl.buffer_data_static(BufferTarget::ElementArray, bytemuck::cast_slice(indices));

        gl.bind_buffer(BufferTarget::Array, Some(vertex_buffer));
        gl.buffer_data_static(BufferTarget::Array, bytemuck::cast_slice(vertices));
        gl.vertex_attrib_pointer_f32(POSITION_ATTRIB, 3, VERTEX_STRIDE, 0);
        gl.vertex_attrib_pointer_f32(TEX_COORD_ATTRIB, 2, VERTEX_STRIDE, 3 * 4);
        gl.bind_buffer(BufferTarget::Array, None);

        gl.bind_vertex_array(None);

        tracing::debug!(
            "loaded model {:?}: {} vertices, {} indices",
            vertex_array,
            vertices.len() / FLOATS_PER_VERTEX,
            index_count
        );

        Ok(Self {
            gl,
            vertex_array,
            vertex_buffer,
            index_buffer,
            index_count,
        })
    }

    /// Typed variant of [`load`](Self::load).
    pub fn from_vertices(gl: Arc<B>, vertices: &[Vertex], indices: &[u32]) -> Result<Self, ModelError> {
        Self::load(gl, bytemuck::cast_slice(vertices), indices)
    }

    /// Bind, enable both attributes, draw every index, then restore state.
    pub fn draw(&self) {
        self.bind();
        Self::enable_attribs(self.gl.as_ref());
        self.gl.draw_triangles_u32(self.index_count, 0);
        Self::disable_attribs(self.gl.as_ref());
        self.unbind();
    }

    /// Draw without touching attribute state.
    ///
    /// For batches bracketed by [`enable_attribs`](Self::enable_attribs) and
    /// [`disable_attribs`](Self::disable_attribs).
    pub fn draw_batched(&self) {
        self.bind();
        self.gl.draw_triangles_u32(self.index_count, 0);
        self.unbind();
    }

    pub fn bind(&self) {
        self.gl.bind_vertex_array(Some(self.vertex_array));
    }

    pub fn unbind(&self) {
        self.gl.bind_vertex_array(None);
    }

    pub fn enable_attribs(gl: &B) {
        gl.enable_vertex_attrib_array(POSITION_ATTRIB);
        gl.enable_vertex_attrib_array(TEX_COORD_ATTRIB);
    }

    pub fn disable_attribs(gl: &B) {
        gl.disable_vertex_attrib_array(POSITION_ATTRIB);
        gl.disable_vertex_attrib_array(TEX_COORD_ATTRIB);
    }

    /// Native vertex array handle.
    pub fn vertex_array(&self) -> B::VertexArray {
        self.vertex_array
    }

    pub fn index_count(&self) -> usize {
        self.index_count as usize
    }
}

impl<B: GlBackend> Drop for Model<B> {
    fn drop(&mut self) {
        tracing::debug!("releasing model {:?}", self.vertex_array);
        self.gl.delete_buffer(self.vertex_buffer);
        self.gl.delete_buffer(self.index_buffer);
        self.gl.delete_vertex_array(self.vertex_array);
    }
}

impl<B: GlBackend> std::fmt::Debug for Model<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("vertex_array", &self.vertex_array)
            .field("index_count", &self.index_count)
            .finish()
    }
}

fn check_layout(vertices: &[f32], indices: &[u32]) -> Result<i32, ModelError> {
    if vertices.len() % FLOATS_PER_VERTEX != 0 {
        return Err(ModelError::VertexLayout {
            len: vertices.len(),
        });
    }
    let vertex_count = vertices.len() / FLOATS_PER_VERTEX;
    if let Some((position, &index)) = indices
        .iter()
        .enumerate()
        .find(|(_, index)| **index as usize >= vertex_count)
    {
        return Err(ModelError::IndexOutOfRange {
            index,
            position,
            vertex_count,
        });
    }
    i32::try_from(indices.len()).map_err(|_| ModelError::TooManyIndices {
        count: indices.len(),
    })
}
