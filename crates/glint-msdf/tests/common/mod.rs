#![allow(dead_code)]

use std::sync::Arc;

use glint_msdf::{
    AtlasLayout, Bounds, FontMetrics, GlyphAtlas, GlyphMetrics, MsdfTextRenderer, TextRendererConfig,
    YOrigin,
};
use glint_render::MsdfVertex;
use glint_test_utils::MockRenderContext;

pub const ADVANCE: f32 = 0.5;
pub const SPACE_ADVANCE: f32 = 0.25;

/// Monospace atlas: ASCII letters and a little punctuation, 0.5 em wide.
pub fn test_atlas() -> GlyphAtlas {
    let mut glyphs = vec![GlyphMetrics {
        unicode: ' ' as u32,
        advance: SPACE_ADVANCE,
        plane_bounds: None,
        atlas_bounds: None,
    }];
    for (n, c) in ('A'..='Z').chain('a'..='z').chain(['!', ',', '.']).enumerate() {
        let x = (n % 16) as f32 * 16.0;
        let y = (n / 16) as f32 * 16.0;
        glyphs.push(GlyphMetrics {
            unicode: c as u32,
            advance: ADVANCE,
            plane_bounds: Some(Bounds::new(0.05, 0.0, 0.45, 0.6)),
            atlas_bounds: Some(Bounds::new(x, y, x + 16.0, y + 16.0)),
        });
    }

    GlyphAtlas {
        atlas: AtlasLayout {
            kind: "msdf".to_string(),
            distance_range: 4.0,
            distance_range_middle: 0.0,
            size: 32.0,
            width: 256,
            height: 256,
            y_origin: YOrigin::Bottom,
        },
        metrics: FontMetrics {
            em_size: 1.0,
            line_height: 1.25,
            ascender: 0.75,
            descender: -0.25,
            underline_y: -0.1,
            underline_thickness: 0.05,
        },
        glyphs,
        kerning: Vec::new(),
    }
}

/// A renderer over a recording mock, with [`test_atlas`] loaded.
pub fn renderer(config: TextRendererConfig) -> (Arc<MockRenderContext>, MsdfTextRenderer) {
    let mock = Arc::new(MockRenderContext::new());
    let mut renderer = MsdfTextRenderer::new(mock.clone(), config);
    let texture = mock.create_mock_texture(256, 256);
    renderer.load_atlas(test_atlas(), texture).unwrap();
    (mock, renderer)
}

/// The vertices covered by `[offset, offset + count)`.
pub fn vertices(renderer: &MsdfTextRenderer, offset: u32, count: u32) -> Vec<MsdfVertex> {
    renderer.buffer_pool().vertices()[offset as usize..(offset + count) as usize].to_vec()
}

/// Left edge of the `quad`th quad written at `offset`.
pub fn quad_left(renderer: &MsdfTextRenderer, offset: u32, quad: u32) -> f32 {
    renderer.buffer_pool().vertices()[(offset + quad * 4) as usize].position[0]
}
