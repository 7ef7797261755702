//! Free-list allocator for text geometry.
//!
//! Vertex and index space are carved up together: every range holds whole
//! quads, four vertices to six indices. The index buffer is a fixed quad
//! pattern generated once per capacity, so allocating a range only ever
//! writes vertices.
//!
//! When no free range is large enough the pool doubles its storage, copies
//! the existing vertices into fresh GPU buffers and bumps its
//! [`generation`](TextBufferPool::generation). Offsets handed out before the
//! growth stay valid; GPU buffer handles do not.

use glint_core::profiling::{profile_function, profile_scope};
use glint_render::MsdfVertex;
use glint_test_utils::{GpuBuffer, RenderContext};

pub const VERTICES_PER_QUAD: u32 = 4;
pub const INDICES_PER_QUAD: u32 = 6;

const VERTEX_STRIDE: u64 = std::mem::size_of::<MsdfVertex>() as u64;
const INDEX_STRIDE: u64 = std::mem::size_of::<u32>() as u64;

/// Index count matching `vertex_count` vertices.
#[inline]
pub const fn indices_for(vertex_count: u32) -> u32 {
    vertex_count / VERTICES_PER_QUAD * INDICES_PER_QUAD
}

/// A contiguous run of quads in both vertex and index space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BufferRange {
    pub vertex_offset: u32,
    pub vertex_count: u32,
    pub index_offset: u32,
    pub index_count: u32,
}

impl BufferRange {
    pub const fn new(vertex_offset: u32, vertex_count: u32, index_offset: u32, index_count: u32) -> Self {
        Self {
            vertex_offset,
            vertex_count,
            index_offset,
            index_count,
        }
    }

    /// Range of whole quads starting at `vertex_offset`.
    pub const fn quads(vertex_offset: u32, vertex_count: u32) -> Self {
        Self::new(
            vertex_offset,
            vertex_count,
            indices_for(vertex_offset),
            indices_for(vertex_count),
        )
    }

    pub const fn vertex_end(&self) -> u32 {
        self.vertex_offset + self.vertex_count
    }

    pub const fn index_end(&self) -> u32 {
        self.index_offset + self.index_count
    }

    pub const fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }

    pub const fn quad_count(&self) -> u32 {
        self.vertex_count / VERTICES_PER_QUAD
    }

    /// `next` starts exactly where `self` ends, in both spaces.
    pub const fn precedes(&self, next: &BufferRange) -> bool {
        self.vertex_end() == next.vertex_offset && self.index_end() == next.index_offset
    }
}

/// Notification sent after the pool's storage was reallocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthEvent {
    pub generation: u64,
    pub vertex_capacity: u32,
    pub index_capacity: u32,
}

pub type GrowthListener = Box<dyn FnMut(&GrowthEvent) + Send>;

/// Offset-sorted list of free ranges.
#[derive(Debug, Clone, Default)]
pub struct FreeList {
    ranges: Vec<BufferRange>,
}

impl FreeList {
    /// A free list covering `[0, vertex_capacity)`.
    pub fn with_capacity(vertex_capacity: u32) -> Self {
        let mut list = Self::default();
        list.free(BufferRange::quads(0, vertex_capacity));
        list
    }

    /// First-fit allocation. Returns `None` if no single range is large enough.
    pub fn allocate(&mut self, vertex_count: u32) -> Option<BufferRange> {
        let index_count = indices_for(vertex_count);
        let slot = self
            .ranges
            .iter()
            .position(|r| r.vertex_count >= vertex_count && r.index_count >= index_count)?;

        let range = &mut self.ranges[slot];
        let allocated = BufferRange::new(range.vertex_offset, vertex_count, range.index_offset, index_count);

        range.vertex_offset += vertex_count;
        range.index_offset += index_count;
        range.vertex_count -= vertex_count;
        range.index_count -= index_count;
        if range.vertex_count == 0 || range.index_count == 0 {
            self.ranges.remove(slot);
        }

        Some(allocated)
    }

    /// Return a range and merge it with its neighbours.
    ///
    /// The range must not overlap one that is already free; debug builds
    /// assert this.
    pub fn free(&mut self, range: BufferRange) {
        if range.is_empty() {
            return;
        }
        debug_assert!(
            !self
                .ranges
                .iter()
                .any(|r| r.vertex_offset < range.vertex_end() && range.vertex_offset < r.vertex_end()),
            "freed range {range:?} overlaps a free range"
        );
        self.ranges.push(range);
        self.ranges.sort_unstable_by_key(|r| r.vertex_offset);

        let mut i = 0;
        while i + 1 < self.ranges.len() {
            let next = self.ranges[i + 1];
            let current = &mut self.ranges[i];
            if current.precedes(&next) {
                current.vertex_count += next.vertex_count;
                current.index_count += next.index_count;
                self.ranges.remove(i + 1);
            } else {
                i += 1;
            }
        }
    }

    pub fn ranges(&self) -> &[BufferRange] {
        &self.ranges
    }

    pub fn free_vertices(&self) -> u32 {
        self.ranges.iter().map(|r| r.vertex_count).sum()
    }

    /// Free vertices at the very end of `[0, vertex_capacity)`.
    fn trailing_free(&self, vertex_capacity: u32) -> u32 {
        self.ranges
            .last()
            .filter(|r| r.vertex_end() == vertex_capacity)
            .map_or(0, |r| r.vertex_count)
    }
}

/// CPU and GPU storage for all text geometry, with its free list.
pub struct TextBufferPool {
    free: FreeList,
    vertices: Vec<MsdfVertex>,
    indices: Vec<u32>,
    vertex_buffer: GpuBuffer,
    index_buffer: GpuBuffer,
    generation: u64,
    growth_listener: Option<GrowthListener>,
}

impl TextBufferPool {
    /// Create a pool with room for `max_characters` quads (at least one).
    pub fn new(ctx: &dyn RenderContext, max_characters: u32) -> Self {
        profile_function!();
        let vertex_capacity = max_characters.max(1) * VERTICES_PER_QUAD;
        let vertices = vec![MsdfVertex::default(); vertex_capacity as usize];
        let indices = quad_indices(vertex_capacity);
        let (vertex_buffer, index_buffer) = create_buffers(ctx, &vertices, &indices);

        tracing::debug!(
            "Created text buffer pool: {} vertices, {} indices",
            vertex_capacity,
            indices.len()
        );

        Self {
            free: FreeList::with_capacity(vertex_capacity),
            vertices,
            indices,
            vertex_buffer,
            index_buffer,
            generation: 0,
            growth_listener: None,
        }
    }

    /// Reserve `vertex_count` vertices (a multiple of four).
    ///
    /// Never fails: if no free range fits, the storage grows first.
    pub fn allocate(&mut self, ctx: &dyn RenderContext, vertex_count: u32) -> BufferRange {
        profile_function!();
        debug_assert_eq!(vertex_count % VERTICES_PER_QUAD, 0);

        loop {
            if let Some(range) = self.free.allocate(vertex_count) {
                tracing::trace!("Allocated {:?}", range);
                return range;
            }
            self.grow_to_fit(ctx, vertex_count);
        }
    }

    /// Release a range without touching its contents.
    pub fn free(&mut self, range: BufferRange) {
        profile_function!();
        debug_assert!(
            range.vertex_end() <= self.vertex_capacity(),
            "stale range {:?} beyond capacity {}",
            range,
            self.vertex_capacity()
        );
        tracing::trace!("Freed {:?}", range);
        self.free.free(range);
    }

    /// Zero a range's vertices on the CPU and GPU so nothing stale draws.
    pub fn invalidate(&mut self, ctx: &dyn RenderContext, range: BufferRange) {
        if range.is_empty() {
            return;
        }
        let start = range.vertex_offset as usize;
        let end = range.vertex_end() as usize;
        self.vertices[start..end].fill(MsdfVertex::default());
        self.upload(ctx, range.vertex_offset, range.vertex_count);
    }

    /// Zero and release a range.
    pub fn release(&mut self, ctx: &dyn RenderContext, range: BufferRange) {
        self.invalidate(ctx, range);
        self.free(range);
    }

    /// Push `count` CPU vertices starting at `offset` to the GPU buffer.
    pub fn upload(&self, ctx: &dyn RenderContext, offset: u32, count: u32) {
        if count == 0 {
            return;
        }
        let start = offset as usize;
        let end = start + count as usize;
        ctx.write_buffer(
            &self.vertex_buffer,
            offset as u64 * VERTEX_STRIDE,
            bytemuck::cast_slice(&self.vertices[start..end]),
        );
    }

    /// Mutable view of a range's vertices for the geometry generator.
    pub fn vertices_mut(&mut self, range: BufferRange) -> &mut [MsdfVertex] {
        &mut self.vertices[range.vertex_offset as usize..range.vertex_end() as usize]
    }

    pub fn vertices(&self) -> &[MsdfVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn free_ranges(&self) -> &[BufferRange] {
        self.free.ranges()
    }

    pub fn vertex_capacity(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn index_capacity(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn used_vertices(&self) -> u32 {
        self.vertex_capacity() - self.free.free_vertices()
    }

    /// Incremented every time the storage is reallocated.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn vertex_buffer(&self) -> &GpuBuffer {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &GpuBuffer {
        &self.index_buffer
    }

    /// Register a callback invoked after each growth.
    pub fn set_growth_listener(&mut self, listener: impl FnMut(&GrowthEvent) + Send + 'static) {
        self.growth_listener = Some(Box::new(listener));
    }

    /// Double the capacity until the tail can hold `vertex_count` vertices.
    fn grow_to_fit(&mut self, ctx: &dyn RenderContext, vertex_count: u32) {
        profile_scope!("text_buffer_grow");
        let old_capacity = self.vertex_capacity();
        let trailing = self.free.trailing_free(old_capacity);

        let mut new_capacity = old_capacity * 2;
        while new_capacity - old_capacity + trailing < vertex_count {
            new_capacity *= 2;
        }

        self.vertices
            .resize(new_capacity as usize, MsdfVertex::default());
        self.indices = quad_indices(new_capacity);
        let (vertex_buffer, index_buffer) = create_buffers(ctx, &self.vertices, &self.indices);
        self.vertex_buffer = vertex_buffer;
        self.index_buffer = index_buffer;

        self.free
            .free(BufferRange::quads(old_capacity, new_capacity - old_capacity));
        self.generation += 1;

        tracing::debug!(
            "Grew text buffer pool from {} to {} vertices (generation {})",
            old_capacity,
            new_capacity,
            self.generation
        );

        let event = GrowthEvent {
            generation: self.generation,
            vertex_capacity: new_capacity,
            index_capacity: self.index_capacity(),
        };
        if let Some(listener) = self.growth_listener.as_mut() {
            listener(&event);
        }
    }
}

impl std::fmt::Debug for TextBufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBufferPool")
            .field("vertex_capacity", &self.vertex_capacity())
            .field("used_vertices", &self.used_vertices())
            .field("free_ranges", &self.free.ranges().len())
            .field("generation", &self.generation)
            .finish()
    }
}

/// Two counter-clockwise triangles per quad: (0, 1, 2) and (0, 2, 3).
fn quad_indices(vertex_capacity: u32) -> Vec<u32> {
    let quads = vertex_capacity / VERTICES_PER_QUAD;
    let mut indices = Vec::with_capacity((quads * INDICES_PER_QUAD) as usize);
    for quad in 0..quads {
        let base = quad * VERTICES_PER_QUAD;
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    indices
}

fn create_buffers(
    ctx: &dyn RenderContext,
    vertices: &[MsdfVertex],
    indices: &[u32],
) -> (GpuBuffer, GpuBuffer) {
    let vertex_buffer = ctx.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Text Vertex Buffer"),
        size: vertices.len() as u64 * VERTEX_STRIDE,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    ctx.write_buffer(&vertex_buffer, 0, bytemuck::cast_slice(vertices));

    let index_buffer = ctx.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Text Index Buffer"),
        size: indices.len() as u64 * INDEX_STRIDE,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    ctx.write_buffer(&index_buffer, 0, bytemuck::cast_slice(indices));

    (vertex_buffer, index_buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_test_utils::MockRenderContext;

    /// Free ranges plus `allocated` must cover `[0, capacity)` exactly once.
    fn assert_tiles(free: &[BufferRange], allocated: &[BufferRange], capacity: u32) {
        let mut all: Vec<BufferRange> = free.iter().chain(allocated).copied().collect();
        all.retain(|r| !r.is_empty());
        all.sort_by_key(|r| r.vertex_offset);

        let mut cursor = 0;
        let mut index_cursor = 0;
        for range in &all {
            assert_eq!(range.vertex_offset, cursor, "gap or overlap at {:?}", range);
            assert_eq!(range.index_offset, index_cursor);
            assert_eq!(range.index_count, indices_for(range.vertex_count));
            cursor = range.vertex_end();
            index_cursor = range.index_end();
        }
        assert_eq!(cursor, capacity);
    }

    #[test]
    fn test_index_ratio() {
        let mut list = FreeList::with_capacity(400);
        for count in [4, 8, 40, 120, 0] {
            let range = list.allocate(count).unwrap();
            assert_eq!(range.index_count, (range.vertex_count / 4) * 6);
        }
    }

    #[test]
    fn test_first_fit_splits_front() {
        let mut list = FreeList::with_capacity(64);
        let a = list.allocate(8).unwrap();
        let b = list.allocate(16).unwrap();
        assert_eq!(a, BufferRange::new(0, 8, 0, 12));
        assert_eq!(b, BufferRange::new(8, 16, 12, 24));
        assert_eq!(list.ranges(), &[BufferRange::new(24, 40, 36, 60)]);
    }

    #[test]
    fn test_exact_fit_removes_range() {
        let mut list = FreeList::with_capacity(16);
        list.allocate(16).unwrap();
        assert!(list.ranges().is_empty());
        assert!(list.allocate(4).is_none());
    }

    #[test]
    fn test_adjacent_frees_merge() {
        let mut list = FreeList::with_capacity(48);
        let a = list.allocate(16).unwrap();
        let b = list.allocate(16).unwrap();
        let _c = list.allocate(16).unwrap();

        list.free(a);
        list.free(b);
        assert_eq!(list.ranges(), &[BufferRange::new(0, 32, 0, 48)]);
    }

    #[test]
    fn test_merge_across_gap_filled_later() {
        let mut list = FreeList::with_capacity(48);
        let a = list.allocate(16).unwrap();
        let b = list.allocate(16).unwrap();
        let c = list.allocate(16).unwrap();

        list.free(a);
        list.free(c);
        assert_eq!(list.ranges().len(), 2);
        list.free(b);
        assert_eq!(list.ranges(), &[BufferRange::quads(0, 48)]);
    }

    #[test]
    fn test_vertex_adjacent_but_index_gap_not_merged() {
        let mut list = FreeList::default();
        list.free(BufferRange::new(0, 4, 0, 6));
        list.free(BufferRange::new(4, 4, 12, 6));
        assert_eq!(list.ranges().len(), 2);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "overlaps a free range")]
    fn test_double_free_rejected() {
        let mut list = FreeList::with_capacity(32);
        let a = list.allocate(8).unwrap();
        let _b = list.allocate(8).unwrap();
        list.free(a);
        list.free(a);
    }

    #[test]
    fn test_first_fit_reuses_hole() {
        let mut list = FreeList::with_capacity(64);
        let a = list.allocate(16).unwrap();
        let _b = list.allocate(16).unwrap();
        list.free(a);

        let c = list.allocate(8).unwrap();
        assert_eq!(c.vertex_offset, 0);
    }

    #[test]
    fn test_tiling_under_churn() {
        let mut list = FreeList::with_capacity(256);
        let mut live: Vec<BufferRange> = Vec::new();

        // Deterministic pseudo-random churn.
        let mut seed: u32 = 0x1234_5678;
        for step in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            if live.is_empty() || seed % 3 != 0 {
                let quads = seed % 6 + 1;
                if let Some(range) = list.allocate(quads * 4) {
                    live.push(range);
                }
            } else {
                let victim = (seed as usize / 3) % live.len();
                list.free(live.swap_remove(victim));
            }

            if step % 25 == 0 {
                assert_tiles(list.ranges(), &live, 256);
                for pair in list.ranges().windows(2) {
                    assert!(!pair[0].precedes(&pair[1]), "unmerged neighbours {:?}", pair);
                }
            }
        }
        assert_tiles(list.ranges(), &live, 256);
    }

    #[test]
    fn test_pool_growth_preserves_vertices() {
        let ctx = MockRenderContext::new();
        let mut pool = TextBufferPool::new(&ctx, 4);
        assert_eq!(pool.vertex_capacity(), 16);

        let first = pool.allocate(&ctx, 16);
        for (i, v) in pool.vertices_mut(first).iter_mut().enumerate() {
            v.position = [i as f32, 1.0];
            v.vertex_id = i as u32;
        }
        pool.upload(&ctx, first.vertex_offset, first.vertex_count);
        let checksum: f32 = pool.vertices()[..16].iter().map(|v| v.position[0]).sum();

        let second = pool.allocate(&ctx, 8);
        assert_eq!(pool.generation(), 1);
        assert_eq!(pool.vertex_capacity(), 32);
        assert_eq!(second.vertex_offset, 16);

        let after: f32 = pool.vertices()[..16].iter().map(|v| v.position[0]).sum();
        assert_eq!(checksum, after);

        let gpu = ctx.buffer_contents(pool.vertex_buffer()).unwrap();
        let gpu_vertices: Vec<MsdfVertex> = bytemuck::pod_collect_to_vec(&gpu);
        assert_eq!(&gpu_vertices[..16], &pool.vertices()[..16]);
        assert_tiles(pool.free_ranges(), &[first, second], pool.vertex_capacity());
    }

    #[test]
    fn test_pool_growth_large_request_single_step() {
        let ctx = MockRenderContext::new();
        let mut pool = TextBufferPool::new(&ctx, 2);
        let range = pool.allocate(&ctx, 100 * 4);
        assert_eq!(pool.generation(), 1);
        assert!(pool.vertex_capacity() >= 408);
        assert_eq!(range.vertex_offset, 0);
        assert_eq!(pool.index_capacity(), indices_for(pool.vertex_capacity()));
    }

    #[test]
    fn test_growth_listener_notified() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicU32, Ordering};

        let ctx = MockRenderContext::new();
        let mut pool = TextBufferPool::new(&ctx, 1);
        let growths = Arc::new(AtomicU32::new(0));
        let capacity = Arc::new(AtomicU32::new(0));
        let (seen_growths, seen_capacity) = (Arc::clone(&growths), Arc::clone(&capacity));
        pool.set_growth_listener(move |event| {
            seen_growths.fetch_add(1, Ordering::SeqCst);
            seen_capacity.store(event.vertex_capacity, Ordering::SeqCst);
            assert_eq!(event.index_capacity, indices_for(event.vertex_capacity));
        });

        pool.allocate(&ctx, 4);
        pool.allocate(&ctx, 4);

        assert_eq!(growths.load(Ordering::SeqCst), 1);
        assert_eq!(capacity.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn test_quad_index_pattern() {
        let ctx = MockRenderContext::new();
        let pool = TextBufferPool::new(&ctx, 2);
        assert_eq!(pool.indices(), &[0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn test_release_zeroes_vertices() {
        let ctx = MockRenderContext::new();
        let mut pool = TextBufferPool::new(&ctx, 4);
        let range = pool.allocate(&ctx, 8);
        pool.vertices_mut(range)[3].position = [5.0, 5.0];
        pool.upload(&ctx, range.vertex_offset, range.vertex_count);

        pool.release(&ctx, range);
        assert!(pool.vertices()[..8].iter().all(|v| *v == MsdfVertex::default()));
        assert_eq!(pool.used_vertices(), 0);
        assert_eq!(pool.free_ranges(), &[BufferRange::quads(0, 16)]);
    }
}
