//! Per-frame instance batch.

use glint_core::profiling::profile_function;
use glint_render::TextInstance;
use glint_test_utils::{GpuBuffer, RenderContext};

const INSTANCE_STRIDE: u64 = std::mem::size_of::<TextInstance>() as u64;

/// Instances accumulated since the last flush, mirrored into one GPU buffer.
pub(crate) struct InstanceBatch {
    instances: Vec<TextInstance>,
    capacity: u32,
    buffer: GpuBuffer,
}

impl InstanceBatch {
    pub(crate) fn new(ctx: &dyn RenderContext, capacity: u32) -> Self {
        let capacity = capacity.max(1);
        Self {
            instances: Vec::with_capacity(capacity as usize),
            capacity,
            buffer: create_instance_buffer(ctx, capacity),
        }
    }

    /// Append an instance, doubling the GPU buffer when full.
    pub(crate) fn push(&mut self, ctx: &dyn RenderContext, instance: TextInstance) {
        if self.instances.len() as u32 >= self.capacity {
            self.capacity *= 2;
            self.buffer = create_instance_buffer(ctx, self.capacity);
            tracing::debug!("Grew text instance buffer to {} instances", self.capacity);
        }
        self.instances.push(instance);
    }

    /// Write the accumulated instances to the GPU buffer.
    pub(crate) fn upload(&self, ctx: &dyn RenderContext) {
        profile_function!();
        if self.instances.is_empty() {
            return;
        }
        ctx.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&self.instances));
    }

    pub(crate) fn clear(&mut self) {
        self.instances.clear();
    }

    pub(crate) fn len(&self) -> u32 {
        self.instances.len() as u32
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub(crate) fn capacity(&self) -> u32 {
        self.capacity
    }

    pub(crate) fn instances(&self) -> &[TextInstance] {
        &self.instances
    }

    pub(crate) fn buffer(&self) -> &GpuBuffer {
        &self.buffer
    }
}

fn create_instance_buffer(ctx: &dyn RenderContext, capacity: u32) -> GpuBuffer {
    ctx.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Text Instance Buffer"),
        size: capacity as u64 * INSTANCE_STRIDE,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_test_utils::MockRenderContext;

    #[test]
    fn test_batch_doubles_when_full() {
        let mock = MockRenderContext::new();
        let mut batch = InstanceBatch::new(&mock, 2);
        assert_eq!(mock.count_buffer_creates(), 1);

        for _ in 0..3 {
            batch.push(&mock, TextInstance::default());
        }
        assert_eq!(batch.capacity(), 4);
        assert_eq!(batch.len(), 3);
        assert_eq!(mock.count_buffer_creates(), 2);
        assert_eq!(batch.buffer().size(), 4 * INSTANCE_STRIDE);
    }

    #[test]
    fn test_upload_writes_all_instances() {
        let mock = MockRenderContext::new();
        let mut batch = InstanceBatch::new(&mock, 4);
        batch.upload(&mock);
        assert_eq!(mock.count_buffer_writes(), 0);

        let mut instance = TextInstance::default();
        instance.vertex_range = [8, 16];
        batch.push(&mock, instance);
        batch.upload(&mock);

        let bytes = mock.buffer_contents(batch.buffer()).unwrap();
        let uploaded: Vec<TextInstance> = bytemuck::pod_collect_to_vec(&bytes[..INSTANCE_STRIDE as usize]);
        assert_eq!(uploaded[0].vertex_range, [8, 16]);

        batch.clear();
        assert!(batch.is_empty());
        assert_eq!(batch.capacity(), 4);
    }
}
