//! Mock implementation of RenderContext for testing.
//!
//! This module provides a mock GPU context that records operations and
//! mirrors buffer contents in memory, without touching a GPU.

use crate::{gpu_types::*, render_context::*};
use parking_lot::Mutex;
use wgpu::*;

/// Records a GPU operation call for verification in tests.
#[derive(Debug, Clone)]
pub enum RenderCall {
    CreateBuffer {
        buffer_id: usize,
        label: Option<String>,
        size: u64,
        usage: BufferUsages,
    },
    WriteBuffer {
        buffer_id: usize,
        offset: u64,
        size: usize,
    },
    DrawInstanced {
        technique: &'static str,
        index_count: u32,
        instance_count: u32,
        vertex_buffer_id: Option<usize>,
        instance_buffer_id: Option<usize>,
    },
}

/// Mock buffer stored in the context, with a CPU mirror of its contents.
#[derive(Debug, Clone)]
struct MockBuffer {
    size: u64,
    data: Vec<u8>,
}

/// Mock implementation of RenderContext for testing.
///
/// Methods take `&self` but record calls, so state lives behind
/// `parking_lot::Mutex` (which is `Send + Sync`, as the trait requires).
///
/// # Example
///
/// ```rust
/// use glint_test_utils::{MockRenderContext, RenderContext};
/// use wgpu::*;
///
/// let mock = MockRenderContext::new();
/// let buffer = mock.create_buffer(&BufferDescriptor {
///     label: None,
///     size: 16,
///     usage: BufferUsages::VERTEX,
///     mapped_at_creation: false,
/// });
///
/// assert!(buffer.is_mock());
/// assert_eq!(mock.count_buffer_creates(), 1);
/// ```
pub struct MockRenderContext {
    /// Recorded calls for verification
    calls: Mutex<Vec<RenderCall>>,

    /// Mock buffers indexed by mock id
    buffers: Mutex<Vec<MockBuffer>>,

    next_texture_id: Mutex<usize>,
}

impl MockRenderContext {
    /// Create a new mock render context.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            buffers: Mutex::new(Vec::new()),
            next_texture_id: Mutex::new(0),
        }
    }

    /// Create a mock atlas texture to hand to the renderer.
    pub fn create_mock_texture(&self, width: u32, height: u32) -> GpuTexture {
        let mut id = self.next_texture_id.lock();
        let texture_id = *id;
        *id += 1;
        GpuTexture::mock(texture_id, width, height)
    }

    /// Get a copy of all recorded calls (for test assertions).
    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().clone()
    }

    /// Count buffer creates.
    pub fn count_buffer_creates(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, RenderCall::CreateBuffer { .. }))
            .count()
    }

    /// Count buffer write operations.
    pub fn count_buffer_writes(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, RenderCall::WriteBuffer { .. }))
            .count()
    }

    /// Count instanced draws.
    pub fn count_draws(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, RenderCall::DrawInstanced { .. }))
            .count()
    }

    /// The most recent instanced draw, if any.
    pub fn last_draw(&self) -> Option<RenderCall> {
        self.calls
            .lock()
            .iter()
            .rev()
            .find(|call| matches!(call, RenderCall::DrawInstanced { .. }))
            .cloned()
    }

    /// Current contents of a mock buffer.
    pub fn buffer_contents(&self, buffer: &GpuBuffer) -> Option<Vec<u8>> {
        let id = buffer.mock_id()?;
        self.buffers.lock().get(id).map(|b| b.data.clone())
    }

    /// Clear recorded calls (useful between test steps).
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Get total number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Default for MockRenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext for MockRenderContext {
    fn create_buffer(&self, desc: &BufferDescriptor) -> GpuBuffer {
        let mut buffers = self.buffers.lock();
        let id = buffers.len();

        buffers.push(MockBuffer {
            size: desc.size,
            data: vec![0; desc.size as usize],
        });

        self.calls.lock().push(RenderCall::CreateBuffer {
            buffer_id: id,
            label: desc.label.map(|s| s.to_string()),
            size: desc.size,
            usage: desc.usage,
        });

        GpuBuffer::mock(id, desc.size)
    }

    fn write_buffer(&self, buffer: &GpuBuffer, offset: u64, data: &[u8]) {
        let Some(buffer_id) = buffer.mock_id() else {
            return;
        };

        {
            let mut buffers = self.buffers.lock();
            let mock = &mut buffers[buffer_id];
            let end = offset + data.len() as u64;
            assert!(
                end <= mock.size,
                "write of {} bytes at offset {} overflows buffer {} of size {}",
                data.len(),
                offset,
                buffer_id,
                mock.size
            );
            mock.data[offset as usize..end as usize].copy_from_slice(data);
        }

        self.calls.lock().push(RenderCall::WriteBuffer {
            buffer_id,
            offset,
            size: data.len(),
        });
    }

    fn draw_instanced(&self, draw: &InstancedDraw) {
        self.calls.lock().push(RenderCall::DrawInstanced {
            technique: draw.technique,
            index_count: draw.index_count,
            instance_count: draw.instance_count,
            vertex_buffer_id: draw.vertex_buffer.mock_id(),
            instance_buffer_id: draw.instance_buffer.mock_id(),
        });
    }
}
