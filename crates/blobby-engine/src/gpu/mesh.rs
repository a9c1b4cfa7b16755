use std::ops::Range;

use bytemuck::{Pod, Zeroable};

use super::buffer::Buffer;
use super::error::ResourceError;

/// Vertex buffer plus an optional `u16` index buffer.
pub struct Mesh<V: Pod> {
    vertices: Buffer<V>,
    indices: Option<Buffer<u16>>,
}

impl<V: Pod> Mesh<V> {
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        vertices: &[V],
        indices: Option<&[u16]>,
    ) -> Result<Self, ResourceError> {
        let vertices = Buffer::with_contents(
            device,
            &format!("{label} vbo"),
            vertices,
            wgpu::BufferUsages::VERTEX,
        )?;

        let indices = indices
            .map(|idx| {
                Buffer::with_contents(device, &format!("{label} ibo"), idx, wgpu::BufferUsages::INDEX)
            })
            .transpose()?;

        Ok(Self { vertices, indices })
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn index_count(&self) -> Option<u32> {
        self.indices.as_ref().map(|b| b.len() as u32)
    }

    /// Binds the mesh at vertex slot `slot` and issues the draw.
    ///
    /// Per-instance buffers must already be bound at the other slots.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, slot: u32, instances: Range<u32>) {
        if instances.is_empty() {
            return;
        }

        pass.set_vertex_buffer(slot, self.vertices.slice());
        match &self.indices {
            Some(ibo) => {
                pass.set_index_buffer(ibo.slice(), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..ibo.len() as u32, 0, instances);
            }
            None => pass.draw(0..self.vertices.len() as u32, instances),
        }
    }
}

/// Corner of the unit billboard, in [-1, 1]².
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct QuadVertex {
    pub corner: [f32; 2],
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub const fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

pub const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { corner: [-1.0, -1.0] },
    QuadVertex { corner: [1.0, -1.0] },
    QuadVertex { corner: [1.0, 1.0] },
    QuadVertex { corner: [-1.0, 1.0] },
];

pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Full-screen quad in NDC, two triangles, no index buffer.
pub const SCREEN_VERTICES: [QuadVertex; 6] = [
    QuadVertex { corner: [-1.0, -1.0] },
    QuadVertex { corner: [1.0, 1.0] },
    QuadVertex { corner: [1.0, -1.0] },
    QuadVertex { corner: [-1.0, -1.0] },
    QuadVertex { corner: [-1.0, 1.0] },
    QuadVertex { corner: [1.0, 1.0] },
];
