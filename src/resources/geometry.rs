use bytemuck::{Pod, Zeroable};

/// Interleaved vertex of the terrain grid.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl TerrainVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    /// Layout shared by the visual and the depth pipelines.
    #[must_use]
    pub const fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TerrainVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// CPU-side mesh data. Static after creation: displacement happens in the
/// vertex stage, never on these vertices.
#[derive(Debug, Clone)]
pub struct Geometry {
    vertices: Vec<TerrainVertex>,
    indices: Vec<u32>,
}

impl Geometry {
    #[must_use]
    pub fn new(vertices: Vec<TerrainVertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[TerrainVertex] {
        &self.vertices
    }

    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    #[must_use]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}
