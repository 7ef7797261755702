//! Pen walk over preprocessed text.
//!
//! The walk is shared by geometry generation and measurement so both agree
//! on advances, kerning, line breaks and style spacing. Output coordinates
//! are in em units with `y` growing downward: the top of the first line is
//! `y = 0` and its baseline sits at `y = ascender`.

use std::sync::Arc;

use glint_core::profiling::profile_function;
use glint_render::Color;

use crate::atlas::FontAtlas;
use crate::preprocess::DrawGlyph;
use crate::style::{GlyphStyle, TextStylizer};

/// Inputs shared by every glyph of one walk.
#[derive(Clone, Copy)]
pub struct LayoutContext<'a> {
    pub atlas: &'a FontAtlas,
    pub stylizer: &'a TextStylizer,
    pub kerning: bool,
    pub fill: Color,
    pub stroke: Color,
}

/// One visible glyph, corners ordered bottom-left, bottom-right, top-right,
/// top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphQuad {
    pub character: char,
    pub positions: [[f32; 2]; 4],
    pub tex_coords: [[f32; 2]; 4],
    pub fill: [Color; 4],
    pub stroke: [Color; 4],
}

impl GlyphQuad {
    pub fn left(&self) -> f32 {
        self.positions[0][0]
    }

    pub fn right(&self) -> f32 {
        self.positions[1][0]
    }

    /// Upper edge (smallest `y`).
    pub fn top(&self) -> f32 {
        self.positions[3][1]
    }

    /// Lower edge (largest `y`).
    pub fn bottom(&self) -> f32 {
        self.positions[0][1]
    }
}

/// Horizontal reach and line count of a walk.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutExtent {
    /// Furthest pen position or glyph edge reached.
    pub width: f32,
    pub lines: u32,
}

struct ActiveSpan {
    style: Arc<dyn GlyphStyle>,
    remaining: u32,
}

/// Walker with a reusable active-style list.
#[derive(Default)]
pub struct TextLayout {
    active: Vec<ActiveSpan>,
}

impl TextLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk `glyphs` and call `on_quad` for every glyph that draws something.
    pub fn walk(
        &mut self,
        glyphs: &[DrawGlyph],
        ctx: &LayoutContext<'_>,
        mut on_quad: impl FnMut(&GlyphQuad),
    ) -> LayoutExtent {
        profile_function!();
        self.active.clear();

        let metrics = ctx.atlas.metrics();
        let mut x = 0.0f32;
        let mut y = -metrics.ascender;
        let mut extent = LayoutExtent {
            width: 0.0,
            lines: 1,
        };

        for (i, entry) in glyphs.iter().enumerate() {
            if entry.style_length > 0 {
                match ctx.stylizer.style(entry.style_index) {
                    Some(style) => self.active.push(ActiveSpan {
                        style: Arc::clone(style),
                        remaining: entry.style_length,
                    }),
                    None => tracing::warn!(
                        "Text references unregistered style {}",
                        entry.style_index
                    ),
                }
            }

            let mut fill = [ctx.fill; 4];
            let mut stroke = [ctx.stroke; 4];
            let spacing = self.apply_styles(&mut fill, &mut stroke);

            let c = entry.character;
            if c == '\n' {
                x = 0.0;
                y -= metrics.line_height;
                extent.lines += 1;
                continue;
            }

            let advance = if c.is_whitespace() {
                ctx.atlas.whitespace_advance(c)
            } else {
                let Some(glyph) = ctx.atlas.glyph(c) else {
                    continue;
                };

                if let Some(bounds) = glyph.plane_bounds {
                    let left = x + bounds.left;
                    let right = x + bounds.right;
                    let bottom = -(y + bounds.bottom);
                    let top = -(y + bounds.top);
                    on_quad(&GlyphQuad {
                        character: c,
                        positions: [[left, bottom], [right, bottom], [right, top], [left, top]],
                        tex_coords: glyph.tex_coords,
                        fill,
                        stroke,
                    });
                    extent.width = extent.width.max(right);
                }
                glyph.advance
            };

            if ctx.kerning
                && let Some(next) = glyphs.get(i + 1)
                && let Some(kern) = ctx.atlas.kerning(c, next.character)
            {
                x += kern;
            }

            x += advance + spacing;
            extent.width = extent.width.max(x);
        }

        extent
    }

    /// Age the active spans by one entry and apply the live ones.
    ///
    /// Returns the summed extra spacing.
    fn apply_styles(&mut self, fill: &mut [Color; 4], stroke: &mut [Color; 4]) -> f32 {
        let mut spacing = 0.0;
        self.active.retain_mut(|span| {
            if span.remaining == 0 {
                return false;
            }
            span.remaining -= 1;

            spacing += span.style.spacing();
            if let Some(colors) = span.style.fill() {
                *fill = colors;
            }
            if let Some(colors) = span.style.stroke() {
                *stroke = colors;
            }
            true
        });
        spacing
    }
}
