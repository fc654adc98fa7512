use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Attribute index of the vertex position.
pub const POSITION_ATTRIB: u32 = 0;
/// Attribute index of the texture coordinate.
pub const TEX_COORD_ATTRIB: u32 = 1;
/// Interleaved floats per vertex: position[3] + tex_coord[2].
pub const FLOATS_PER_VERTEX: usize = 5;
/// Vertex stride in bytes.
pub const VERTEX_STRIDE: i32 = (FLOATS_PER_VERTEX * std::mem::size_of::<f32>()) as i32;

/// One interleaved vertex as laid out in the vertex buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl Vertex {
    pub fn new(position: Vec3, tex_coord: Vec2) -> Self {
        Self {
            position: position.to_array(),
            tex_coord: tex_coord.to_array(),
        }
    }
}

/// CPU-side mesh data ready for [`Model::from_vertices`](crate::Model::from_vertices).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Unit quad in the XY plane facing -Z, centred on the origin.
    pub fn quad() -> Self {
        let vertices = vec![
            Vertex::new(Vec3::new(-0.5, -0.5, 0.0), Vec2::new(0.0, 0.0)),
            Vertex::new(Vec3::new(0.5, -0.5, 0.0), Vec2::new(1.0, 0.0)),
            Vertex::new(Vec3::new(0.5, 0.5, 0.0), Vec2::new(1.0, 1.0)),
            Vertex::new(Vec3::new(-0.5, 0.5, 0.0), Vec2::new(0.0, 1.0)),
        ];
        Self {
            vertices,
            indices: vec![0, 1, 2, 2, 3, 0],
        }
    }

    /// Unit cube centred on the origin, four vertices per face so every face
    /// gets the full texture.
    pub fn cube() -> Self {
        // (normal, u axis, v axis) per face.
        let faces = [
            (Vec3::Z, Vec3::NEG_X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::X, Vec3::Y),
            (Vec3::X, Vec3::Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::NEG_Z),
        ];
        let corners = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];

        let mut mesh = Self::default();
        for (normal, u, v) in faces {
            let base = mesh.vertices.len() as u32;
            for uv in corners {
                let position = normal * 0.5 + u * (uv.x - 0.5) + v * (uv.y - 0.5);
                mesh.vertices.push(Vertex::new(position, uv));
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }
        mesh
    }

    /// Vertex data as the flat float slice [`Model::load`](crate::Model::load) takes.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_matches_stride() {
        assert_eq!(std::mem::size_of::<Vertex>(), 20);
        assert_eq!(VERTEX_STRIDE, 20);
    }

    #[test]
    fn quad_counts() {
        let quad = MeshData::quad();
        assert_eq!(quad.vertices.len(), 4);
        assert_eq!(quad.indices.len(), 6);
        assert_eq!(quad.as_floats().len(), 20);
    }

    #[test]
    fn cube_counts_and_bounds() {
        let cube = MeshData::cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert!(cube.indices.iter().all(|&i| (i as usize) < cube.vertices.len()));
        for v in &cube.vertices {
            for c in v.position {
                assert!((c.abs() - 0.5).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn floats_are_interleaved() {
        let quad = MeshData::quad();
        let floats = quad.as_floats();
        assert_eq!(&floats[..5], &[-0.5, -0.5, 0.0, 0.0, 0.0]);
        assert_eq!(&floats[5..10], &[0.5, -0.5, 0.0, 1.0, 0.0]);
    }
}
