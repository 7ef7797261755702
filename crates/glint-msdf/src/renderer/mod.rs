//! MSDF text renderer.
//!
//! [`MsdfTextRenderer`] owns every piece of per-font state: the stylizer,
//! the loaded atlas, the shared vertex/index pool and the frame's instance
//! batch. A frame looks like this:
//!
//! 1. Generate or replace geometry for text that changed.
//! 2. Add one instance per placement of a geometry handle (or use
//!    [`one_shot_text`](MsdfTextRenderer::one_shot_text) for text that only
//!    lives for this frame).
//! 3. Call [`render_instances`](MsdfTextRenderer::render_instances) once.
//!    All instances go out in a single instanced draw, after which one-shot
//!    geometry is reclaimed.
//!
//! # Example
//!
//! ```ignore
//! use glint_msdf::{FontDrawType, MsdfTextRenderer, TextRendererConfig};
//!
//! let mut renderer = MsdfTextRenderer::new(device.clone(), TextRendererConfig::default());
//! renderer.load_atlas(GlyphAtlas::from_json_slice(&metadata)?, texture)?;
//!
//! let title = renderer.generate_geometry("|<Glint>", Color::WHITE, Color::BLACK)?;
//! renderer.add_text_instance(Vec2::new(32.0, 32.0), 48.0, title.range());
//! renderer.render_instances(Mat4::IDENTITY, projection, FontDrawType::Standard);
//! ```

mod config;
mod instances;

pub use config::{FontDrawType, TextRendererConfig};

use std::sync::Arc;

use glint_core::math::{Mat4, Vec2, Vec3};
use glint_core::profiling::profile_function;
use glint_render::{Color, TextInstance};
use glint_test_utils::{GpuTexture, InstancedDraw, RenderContext};

use crate::atlas::{FontAtlas, GlyphAtlas, Kerning};
use crate::buffer::{BufferRange, GrowthEvent, TextBufferPool, indices_for};
use crate::error::{AtlasError, AtlasResult};
use crate::geometry::generate_geometry;
use crate::layout::{LayoutContext, TextLayout};
use crate::preprocess::TextPreprocessor;
use crate::style::TextStylizer;
use instances::InstanceBatch;

/// A persistent piece of text geometry.
///
/// The handle is only valid until it is passed to
/// [`free_geometry`](MsdfTextRenderer::free_geometry) or superseded by the
/// handle returned from [`replace_geometry`](MsdfTextRenderer::replace_geometry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextGeometryHandle {
    geometry_id: u64,
    range: BufferRange,
}

impl TextGeometryHandle {
    /// Identifier kept across in-place and relocating replacements.
    pub fn geometry_id(&self) -> u64 {
        self.geometry_id
    }

    pub fn range(&self) -> BufferRange {
        self.range
    }

    /// Number of glyph quads reserved for this text.
    pub fn quad_count(&self) -> u32 {
        self.range.quad_count()
    }
}

/// Tight bounds of the drawn quads, in em units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBounds {
    pub size: Vec2,
    /// Top-left corner relative to the text origin.
    pub offset: Vec2,
}

/// Batched, instanced MSDF text renderer.
pub struct MsdfTextRenderer {
    context: Arc<dyn RenderContext>,
    config: TextRendererConfig,
    stylizer: TextStylizer,
    atlas: Option<FontAtlas>,
    atlas_texture: Option<GpuTexture>,
    pool: TextBufferPool,
    preprocessor: TextPreprocessor,
    layout: TextLayout,
    instances: InstanceBatch,
    one_shots: Vec<BufferRange>,
    next_geometry_id: u64,
}

impl MsdfTextRenderer {
    pub fn new(context: Arc<dyn RenderContext>, config: TextRendererConfig) -> Self {
        profile_function!();
        let pool = TextBufferPool::new(context.as_ref(), config.initial_capacity);
        let instances = InstanceBatch::new(context.as_ref(), config.initial_instances);

        tracing::debug!(
            "Created MSDF text renderer ({} characters, {} instances)",
            config.initial_capacity,
            config.initial_instances
        );

        Self {
            context,
            config,
            stylizer: TextStylizer::new(),
            atlas: None,
            atlas_texture: None,
            pool,
            preprocessor: TextPreprocessor::new(),
            layout: TextLayout::new(),
            instances,
            one_shots: Vec::new(),
            next_geometry_id: 0,
        }
    }

    pub fn config(&self) -> &TextRendererConfig {
        &self.config
    }

    pub fn stylizer(&self) -> &TextStylizer {
        &self.stylizer
    }

    /// Register styles, words and tags.
    pub fn stylizer_mut(&mut self) -> &mut TextStylizer {
        &mut self.stylizer
    }

    /// Install a font atlas and the texture holding its image.
    ///
    /// Geometry generated against a previous atlas keeps its old layout and
    /// UVs until it is replaced.
    pub fn load_atlas(&mut self, atlas: GlyphAtlas, texture: GpuTexture) -> AtlasResult<()> {
        profile_function!();
        let atlas = FontAtlas::new(atlas)?;

        let layout = atlas.layout();
        if texture.size() != (layout.width, layout.height) {
            tracing::warn!(
                "Atlas texture is {:?} but metadata describes {}x{}",
                texture.size(),
                layout.width,
                layout.height
            );
        }

        self.atlas = Some(atlas);
        self.atlas_texture = Some(texture);
        Ok(())
    }

    pub fn atlas(&self) -> Option<&FontAtlas> {
        self.atlas.as_ref()
    }

    /// Add kerning pairs to the loaded atlas.
    pub fn add_kernings(&mut self, kernings: &[Kerning]) -> AtlasResult<()> {
        let atlas = self.atlas.as_mut().ok_or(AtlasError::NotLoaded)?;
        atlas.add_kernings(kernings);
        Ok(())
    }

    /// Applies to geometry generated from now on.
    pub fn set_kerning_enabled(&mut self, enabled: bool) {
        self.config.kerning = enabled;
    }

    /// Lay out `text` into a freshly allocated range.
    pub fn generate_geometry(
        &mut self,
        text: &str,
        fill: Color,
        stroke: Color,
    ) -> AtlasResult<TextGeometryHandle> {
        profile_function!();
        let range = self.write_text(text, fill, stroke, None)?;
        let handle = TextGeometryHandle {
            geometry_id: self.next_geometry_id,
            range,
        };
        self.next_geometry_id += 1;
        Ok(handle)
    }

    /// Regenerate the text behind `handle`.
    ///
    /// Text that fits is rewritten in place and any unused tail of the old
    /// range is released. Longer text moves to a new range and the old one
    /// is released. Only the returned handle is valid afterwards.
    pub fn replace_geometry(
        &mut self,
        handle: TextGeometryHandle,
        text: &str,
        fill: Color,
        stroke: Color,
    ) -> AtlasResult<TextGeometryHandle> {
        profile_function!();
        let range = self.write_text(text, fill, stroke, Some(handle.range))?;
        Ok(TextGeometryHandle {
            geometry_id: handle.geometry_id,
            range,
        })
    }

    /// Release a persistent handle's range.
    ///
    /// Freeing the same handle twice panics in debug builds.
    pub fn free_geometry(&mut self, handle: TextGeometryHandle) {
        profile_function!();
        self.pool.release(self.context.as_ref(), handle.range);
    }

    /// Draw `text` once at `position`, `size` pixels per em.
    ///
    /// The geometry is reclaimed after the next
    /// [`render_instances`](Self::render_instances).
    pub fn one_shot_text(
        &mut self,
        text: &str,
        position: Vec2,
        size: f32,
        fill: Color,
        stroke: Color,
    ) -> AtlasResult<()> {
        profile_function!();
        let range = self.write_text(text, fill, stroke, None)?;
        self.one_shots.push(range);
        self.add_text_instance(position, size, range)
    }

    /// Place geometry at `position`, scaled to `scale` pixels per em.
    pub fn add_text_instance(&mut self, position: Vec2, scale: f32, range: BufferRange) -> AtlasResult<()> {
        let transform =
            Mat4::from_translation(position.extend(0.0)) * Mat4::from_scale(Vec3::new(scale, scale, 1.0));
        self.add_text_instance_transform(transform, scale, range)
    }

    /// Place geometry with an arbitrary transform.
    ///
    /// `scale` is the resulting size in pixels per em and only drives the
    /// distance-field edge width.
    pub fn add_text_instance_transform(
        &mut self,
        transform: Mat4,
        scale: f32,
        range: BufferRange,
    ) -> AtlasResult<()> {
        let atlas = self.atlas.as_ref().ok_or(AtlasError::NotLoaded)?;
        let instance = TextInstance {
            world: transform.to_cols_array_2d(),
            pixel_ranges: [atlas.screen_px_range(scale), atlas.layout().distance_range],
            vertex_range: [range.vertex_offset, range.vertex_end()],
        };
        self.instances.push(self.context.as_ref(), instance);
        Ok(())
    }

    /// Flush every instance added since the last flush in one draw.
    ///
    /// Does nothing without an atlas or without instances. Afterwards the
    /// batch is empty and one-shot geometry has been released.
    pub fn render_instances(&mut self, view: Mat4, projection: Mat4, draw_type: FontDrawType) {
        profile_function!();
        let Some(texture) = self.atlas_texture.as_ref() else {
            return;
        };
        if self.atlas.is_none() || self.instances.is_empty() {
            return;
        }

        let ctx = self.context.as_ref();
        self.instances.upload(ctx);

        let draw = InstancedDraw {
            technique: draw_type.technique(),
            vertex_buffer: self.pool.vertex_buffer().clone(),
            index_buffer: self.pool.index_buffer().clone(),
            instance_buffer: self.instances.buffer().clone(),
            atlas: texture.clone(),
            index_count: self.pool.index_capacity(),
            instance_count: self.instances.len(),
            view_projection: (projection * view).to_cols_array_2d(),
            zoom: view.x_axis.truncate().length(),
        };
        ctx.draw_instanced(&draw);
        tracing::trace!(
            "Flushed {} text instances with {}",
            draw.instance_count,
            draw.technique
        );

        self.instances.clear();
        for range in self.one_shots.drain(..) {
            self.pool.release(ctx, range);
        }
    }

    /// Layout size of `text` in em units.
    ///
    /// Width is the furthest the pen or a glyph edge reaches; height spans
    /// from the first line's ascender to the last line's descender. Zero
    /// without an atlas or for empty text.
    pub fn measure_text(&mut self, text: &str) -> Vec2 {
        profile_function!();
        let Some(atlas) = self.atlas.as_ref() else {
            return Vec2::ZERO;
        };
        let processed = self
            .preprocessor
            .process(text, &self.stylizer, self.config.style_prefix, |c| atlas.contains(c));
        if processed.glyphs.is_empty() {
            return Vec2::ZERO;
        }

        let ctx = LayoutContext {
            atlas,
            stylizer: &self.stylizer,
            kerning: self.config.kerning,
            fill: Color::WHITE,
            stroke: Color::WHITE,
        };
        let extent = self.layout.walk(processed.glyphs, &ctx, |_| {});

        let metrics = atlas.metrics();
        let height = (extent.lines - 1) as f32 * metrics.line_height + metrics.ascender - metrics.descender;
        Vec2::new(extent.width, height)
    }

    /// Tight bounds of the quads `text` would draw, or `None` if nothing
    /// visible would be drawn.
    pub fn measure_text_precise(&mut self, text: &str) -> Option<TextBounds> {
        profile_function!();
        let atlas = self.atlas.as_ref()?;
        let processed = self
            .preprocessor
            .process(text, &self.stylizer, self.config.style_prefix, |c| atlas.contains(c));

        let ctx = LayoutContext {
            atlas,
            stylizer: &self.stylizer,
            kerning: self.config.kerning,
            fill: Color::WHITE,
            stroke: Color::WHITE,
        };
        let mut bounds: Option<(Vec2, Vec2)> = None;
        self.layout.walk(processed.glyphs, &ctx, |quad| {
            let min = Vec2::new(quad.left(), quad.top());
            let max = Vec2::new(quad.right(), quad.bottom());
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(min), hi.max(max)),
                None => (min, max),
            });
        });

        bounds.map(|(min, max)| TextBounds {
            size: max - min,
            offset: min,
        })
    }

    pub fn buffer_pool(&self) -> &TextBufferPool {
        &self.pool
    }

    /// Called after each growth of the vertex/index storage.
    pub fn set_growth_listener(&mut self, listener: impl FnMut(&GrowthEvent) + Send + 'static) {
        self.pool.set_growth_listener(listener);
    }

    /// Instances waiting for the next flush.
    pub fn instance_count(&self) -> u32 {
        self.instances.len()
    }

    pub fn instance_capacity(&self) -> u32 {
        self.instances.capacity()
    }

    /// Instances waiting for the next flush.
    pub fn pending_instances(&self) -> &[TextInstance] {
        self.instances.instances()
    }

    /// One-shot ranges waiting to be reclaimed by the next flush.
    pub fn pending_one_shots(&self) -> usize {
        self.one_shots.len()
    }

    /// Preprocess and write `text`, reusing `existing` when it is large
    /// enough. Returns the range now holding the text.
    fn write_text(
        &mut self,
        text: &str,
        fill: Color,
        stroke: Color,
        existing: Option<BufferRange>,
    ) -> AtlasResult<BufferRange> {
        let atlas = self.atlas.as_ref().ok_or(AtlasError::NotLoaded)?;
        let ctx = self.context.as_ref();
        let processed = self
            .preprocessor
            .process(text, &self.stylizer, self.config.style_prefix, |c| atlas.contains(c));
        let vertex_count = processed.vertex_count() as u32;

        let (range, stale) = match existing {
            Some(old) if vertex_count <= old.vertex_count => {
                let index_count = indices_for(vertex_count);
                let range = BufferRange::new(old.vertex_offset, vertex_count, old.index_offset, index_count);
                let tail = BufferRange::new(
                    old.vertex_offset + vertex_count,
                    old.vertex_count - vertex_count,
                    old.index_offset + index_count,
                    old.index_count - index_count,
                );
                (range, tail)
            }
            Some(old) => (self.pool.allocate(ctx, vertex_count), old),
            None if vertex_count == 0 => (BufferRange::default(), BufferRange::default()),
            None => (self.pool.allocate(ctx, vertex_count), BufferRange::default()),
        };

        let layout_ctx = LayoutContext {
            atlas,
            stylizer: &self.stylizer,
            kerning: self.config.kerning,
            fill,
            stroke,
        };
        let quads = generate_geometry(
            &mut self.layout,
            processed.glyphs,
            &layout_ctx,
            self.pool.vertices_mut(range),
            range.vertex_offset,
        );
        self.pool.upload(ctx, range.vertex_offset, range.vertex_count);
        self.pool.release(ctx, stale);

        tracing::trace!("Wrote {} quads of text into {:?}", quads, range);
        Ok(range)
    }
}

impl std::fmt::Debug for MsdfTextRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MsdfTextRenderer")
            .field("config", &self.config)
            .field("atlas_loaded", &self.atlas.is_some())
            .field("pool", &self.pool)
            .field("instances", &self.instances.len())
            .field("one_shots", &self.one_shots.len())
            .finish()
    }
}
