//! Glyph atlas metadata.
//!
//! [`GlyphAtlas`] mirrors the JSON written by msdf-atlas-gen. [`FontAtlas`]
//! is the validated runtime form with per-character lookup, precomputed
//! texture coordinates and a kerning table.

use glint_core::alloc::HashMap;
use glint_core::profiling::profile_function;
use serde::{Deserialize, Serialize};

use crate::error::{AtlasError, AtlasResult};

/// Which edge of the atlas image atlas-space `y = 0` refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YOrigin {
    #[default]
    Bottom,
    Top,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlasLayout {
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Width of the distance field in atlas pixels.
    pub distance_range: f32,
    #[serde(default)]
    pub distance_range_middle: f32,
    /// Pixels per em the atlas was generated at.
    pub size: f32,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub y_origin: YOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontMetrics {
    pub em_size: f32,
    pub line_height: f32,
    pub ascender: f32,
    pub descender: f32,
    #[serde(default)]
    pub underline_y: f32,
    #[serde(default)]
    pub underline_thickness: f32,
}

/// Rectangle given as left/bottom/right/top edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl Bounds {
    pub const fn new(left: f32, bottom: f32, right: f32, top: f32) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    /// Zero width or zero height.
    pub fn is_empty(&self) -> bool {
        self.left == self.right || self.bottom == self.top
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlyphMetrics {
    pub unicode: u32,
    pub advance: f32,
    /// Quad placement relative to the pen, in em units.
    #[serde(default)]
    pub plane_bounds: Option<Bounds>,
    /// Texture rectangle, in atlas pixels.
    #[serde(default)]
    pub atlas_bounds: Option<Bounds>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kerning {
    pub unicode1: u32,
    pub unicode2: u32,
    pub advance: f32,
}

impl Kerning {
    pub fn new(left: char, right: char, advance: f32) -> Self {
        Self {
            unicode1: left as u32,
            unicode2: right as u32,
            advance,
        }
    }
}

/// Atlas metadata as produced by msdf-atlas-gen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphAtlas {
    pub atlas: AtlasLayout,
    pub metrics: FontMetrics,
    pub glyphs: Vec<GlyphMetrics>,
    #[serde(default)]
    pub kerning: Vec<Kerning>,
}

impl GlyphAtlas {
    pub fn from_json_slice(bytes: &[u8]) -> AtlasResult<Self> {
        let atlas: GlyphAtlas = serde_json::from_slice(bytes)?;
        atlas.validate()?;
        Ok(atlas)
    }

    pub fn from_json_str(json: &str) -> AtlasResult<Self> {
        Self::from_json_slice(json.as_bytes())
    }

    /// Check the fields the renderer cannot work without.
    pub fn validate(&self) -> AtlasResult<()> {
        if self.atlas.width == 0 || self.atlas.height == 0 {
            return Err(AtlasError::Format(format!(
                "atlas size must be non-zero, got {}x{}",
                self.atlas.width, self.atlas.height
            )));
        }
        if self.glyphs.is_empty() {
            return Err(AtlasError::Format("glyph list is empty".to_string()));
        }
        if self.metrics.line_height <= 0.0 {
            return Err(AtlasError::Format(format!(
                "line height must be positive, got {}",
                self.metrics.line_height
            )));
        }
        if self.atlas.size <= 0.0 {
            return Err(AtlasError::Format(format!(
                "em size in pixels must be positive, got {}",
                self.atlas.size
            )));
        }
        Ok(())
    }
}

/// Runtime glyph record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub advance: f32,
    /// `None` for glyphs with nothing to draw (spaces and the like).
    pub plane_bounds: Option<Bounds>,
    /// Bottom-left, bottom-right, top-right, top-left.
    pub tex_coords: [[f32; 2]; 4],
}

impl Glyph {
    pub fn is_visible(&self) -> bool {
        self.plane_bounds.is_some()
    }
}

/// A loaded, validated atlas ready for layout.
#[derive(Debug, Clone)]
pub struct FontAtlas {
    layout: AtlasLayout,
    metrics: FontMetrics,
    glyphs: HashMap<char, Glyph>,
    kerning: HashMap<(char, char), f32>,
}

impl FontAtlas {
    pub fn new(atlas: GlyphAtlas) -> AtlasResult<Self> {
        profile_function!();
        atlas.validate()?;

        let GlyphAtlas {
            atlas: layout,
            metrics,
            glyphs: glyph_list,
            kerning: kerning_list,
        } = atlas;

        let width = layout.width as f32;
        let height = layout.height as f32;
        let mut glyphs = HashMap::with_capacity(glyph_list.len());

        for entry in &glyph_list {
            let Some(c) = char::from_u32(entry.unicode) else {
                tracing::warn!("Skipping glyph with invalid codepoint {:#x}", entry.unicode);
                continue;
            };

            let tex = entry.atlas_bounds.unwrap_or_default();
            let left = tex.left / width;
            let right = tex.right / width;
            let (bottom, top) = match layout.y_origin {
                YOrigin::Bottom => (1.0 - tex.bottom / height, 1.0 - tex.top / height),
                YOrigin::Top => (tex.bottom / height, tex.top / height),
            };

            glyphs.insert(
                c,
                Glyph {
                    advance: entry.advance,
                    plane_bounds: entry.plane_bounds.filter(|b| !b.is_empty()),
                    tex_coords: [[left, bottom], [right, bottom], [right, top], [left, top]],
                },
            );
        }

        let mut font = Self {
            layout,
            metrics,
            glyphs,
            kerning: HashMap::with_capacity(kerning_list.len()),
        };
        font.add_kernings(&kerning_list);

        tracing::info!(
            "Loaded {} atlas {}x{}: {} glyphs, {} kerning pairs",
            font.layout.kind,
            font.layout.width,
            font.layout.height,
            font.glyphs.len(),
            font.kerning.len()
        );

        Ok(font)
    }

    pub fn from_json_slice(bytes: &[u8]) -> AtlasResult<Self> {
        Self::new(GlyphAtlas::from_json_slice(bytes)?)
    }

    /// Merge kerning pairs; later entries overwrite earlier ones.
    pub fn add_kernings(&mut self, kernings: &[Kerning]) {
        for kerning in kernings {
            let (Some(left), Some(right)) = (
                char::from_u32(kerning.unicode1),
                char::from_u32(kerning.unicode2),
            ) else {
                continue;
            };
            self.kerning.insert((left, right), kerning.advance);
        }
    }

    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        self.glyphs.get(&c)
    }

    pub fn contains(&self, c: char) -> bool {
        self.glyphs.contains_key(&c)
    }

    pub fn kerning(&self, left: char, right: char) -> Option<f32> {
        self.kerning.get(&(left, right)).copied()
    }

    /// Advance used for a whitespace character.
    ///
    /// Falls back to the space glyph, then to zero.
    pub fn whitespace_advance(&self, c: char) -> f32 {
        self.glyph(c)
            .or_else(|| self.glyph(' '))
            .map(|g| g.advance)
            .unwrap_or(0.0)
    }

    /// Screen-space distance range for text drawn at `scale` pixels per em.
    pub fn screen_px_range(&self, scale: f32) -> f32 {
        scale / self.layout.size * self.layout.distance_range
    }

    pub fn layout(&self) -> &AtlasLayout {
        &self.layout
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }
}
