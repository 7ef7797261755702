//! GPU-side layouts for MSDF text geometry and per-instance data.

use bytemuck::{Pod, Zeroable};

/// One corner of a glyph quad.
///
/// `vertex_id` is the vertex's absolute index in the shared vertex buffer;
/// the shader compares it against [`TextInstance::vertex_range`] to decide
/// whether the quad belongs to the instance being drawn.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct MsdfVertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
    pub fill: [u8; 4],
    pub stroke: [u8; 4],
    pub vertex_id: u32,
}

impl MsdfVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 5] = [
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: 0,
            shader_location: 0,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: 8,
            shader_location: 1,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Unorm8x4,
            offset: 16,
            shader_location: 2,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Unorm8x4,
            offset: 20,
            shader_location: 3,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Uint32,
            offset: 24,
            shader_location: 4,
        },
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MsdfVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Per-instance placement of a piece of text geometry.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TextInstance {
    /// Column-major world transform.
    pub world: [[f32; 4]; 4],
    /// `[screen_px_range, distance_range]`
    pub pixel_ranges: [f32; 2],
    /// `[first_vertex, end_vertex)` of the geometry this instance draws.
    pub vertex_range: [u32; 2],
}

impl Default for TextInstance {
    fn default() -> Self {
        Self {
            world: glam::Mat4::IDENTITY.to_cols_array_2d(),
            pixel_ranges: [0.0; 2],
            vertex_range: [0; 2],
        }
    }
}

impl TextInstance {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 6] = [
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x4,
            offset: 0,
            shader_location: 5,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x4,
            offset: 16,
            shader_location: 6,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x4,
            offset: 32,
            shader_location: 7,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x4,
            offset: 48,
            shader_location: 8,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: 64,
            shader_location: 9,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Uint32x2,
            offset: 72,
            shader_location: 10,
        },
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TextInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size_matches_layout() {
        assert_eq!(std::mem::size_of::<MsdfVertex>(), 28);
        assert_eq!(MsdfVertex::layout().array_stride, 28);
    }

    #[test]
    fn test_instance_size_matches_layout() {
        assert_eq!(std::mem::size_of::<TextInstance>(), 80);
        let last = TextInstance::ATTRIBUTES[5];
        assert_eq!(last.offset + 8, 80);
    }
}
