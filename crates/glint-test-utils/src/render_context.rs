//! Trait abstracting the GPU operations the text renderer needs.

use crate::gpu_types::*;
use wgpu::BufferDescriptor;

/// One batched instanced draw of text geometry.
///
/// Every instance is drawn against the full index buffer; the shader uses
/// the per-instance vertex range to discard quads that belong to other
/// geometry.
#[derive(Clone, Debug)]
pub struct InstancedDraw {
    /// Name of the rendering technique (pipeline variant) to select.
    pub technique: &'static str,
    pub vertex_buffer: GpuBuffer,
    pub index_buffer: GpuBuffer,
    pub instance_buffer: GpuBuffer,
    /// The atlas texture sampled by the fragment stage.
    pub atlas: GpuTexture,
    pub index_count: u32,
    pub instance_count: u32,
    /// Column-major `projection * view`.
    pub view_projection: [[f32; 4]; 4],
    /// Length of the view matrix's x basis, used for small-text sharpening.
    pub zoom: f32,
}

/// Trait abstracting GPU resource creation and draw submission.
///
/// Methods take `&self` and return owned wrapper types, so the trait stays
/// object-safe and mock implementations can use interior mutability.
///
/// ```rust,no_run
/// use glint_test_utils::RenderContext;
/// use wgpu::{BufferDescriptor, BufferUsages};
///
/// fn upload(ctx: &dyn RenderContext, bytes: &[u8]) {
///     let buffer = ctx.create_buffer(&BufferDescriptor {
///         label: Some("upload"),
///         size: bytes.len() as u64,
///         usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
///         mapped_at_creation: false,
///     });
///     ctx.write_buffer(&buffer, 0, bytes);
/// }
/// ```
pub trait RenderContext: Send + Sync {
    /// Create a GPU buffer.
    fn create_buffer(&self, desc: &BufferDescriptor) -> GpuBuffer;

    /// Write data to a buffer at a byte offset.
    ///
    /// For real buffers, this maps to `queue.write_buffer()`.
    fn write_buffer(&self, buffer: &GpuBuffer, offset: u64, data: &[u8]);

    /// Submit one instanced draw.
    ///
    /// Implementations may record the draw and encode it later into a render
    /// pass; all referenced buffers are kept alive by the clones in `draw`.
    fn draw_instanced(&self, draw: &InstancedDraw);
}
