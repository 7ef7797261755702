//! Drives a few frames of styled text against the recording mock device.
//!
//! Run with `RUST_LOG=glint_msdf=trace` to watch allocation and growth.

use std::sync::Arc;

use glint_core::math::{Mat4, Vec2};
use glint_core::profiling::{ProfilingBackend, init_profiling, new_frame};
use glint_msdf::{
    AtlasLayout, Bounds, FontDrawType, FontMetrics, GlyphAtlas, GlyphMetrics, MsdfTextRenderer, StyleRule,
    TagDefinition, TextRendererConfig, TextStyle, YOrigin,
};
use glint_render::Color;
use glint_test_utils::MockRenderContext;

fn ascii_atlas() -> GlyphAtlas {
    let glyphs = (' '..='~')
        .enumerate()
        .map(|(n, c)| {
            let x = (n % 16) as f32 * 32.0;
            let y = (n / 16) as f32 * 32.0;
            GlyphMetrics {
                unicode: c as u32,
                advance: if c == ' ' { 0.3 } else { 0.55 },
                plane_bounds: (c != ' ').then(|| Bounds::new(0.02, -0.2, 0.53, 0.72)),
                atlas_bounds: (c != ' ').then(|| Bounds::new(x, y, x + 32.0, y + 32.0)),
            }
        })
        .collect();

    GlyphAtlas {
        atlas: AtlasLayout {
            kind: "msdf".to_string(),
            distance_range: 4.0,
            distance_range_middle: 0.0,
            size: 32.0,
            width: 512,
            height: 256,
            y_origin: YOrigin::Bottom,
        },
        metrics: FontMetrics {
            em_size: 1.0,
            line_height: 1.2,
            ascender: 0.9,
            descender: -0.25,
            underline_y: -0.12,
            underline_thickness: 0.05,
        },
        glyphs,
        kerning: Vec::new(),
    }
}

fn main() {
    glint_core::logging::init();
    init_profiling(ProfilingBackend::InProcess);

    let device = Arc::new(MockRenderContext::new());
    let mut renderer = MsdfTextRenderer::new(device.clone(), TextRendererConfig::small());
    let texture = device.create_mock_texture(512, 256);
    if let Err(e) = renderer.load_atlas(ascii_atlas(), texture) {
        tracing::error!("Failed to load atlas: {}", e);
        return;
    }

    let stylizer = renderer.stylizer_mut();
    let gold = stylizer.add_style(TextStyle::new().with_fill_gradient(Color::YELLOW, Color::from_hex(0xffaa00)));
    let key = stylizer.add_style(TextStyle::new().with_stroke(Color::BLUE).with_spacing(0.05));
    stylizer.add_rule(StyleRule::new("Excalibur", gold)).unwrap();
    stylizer.add_tag(TagDefinition::new("<", ">", key)).unwrap();

    renderer.set_growth_listener(|event| {
        tracing::info!(
            "Text buffers grew to {} vertices (generation {})",
            event.vertex_capacity,
            event.generation
        );
    });

    let projection = Mat4::orthographic_rh(0.0, 1280.0, 720.0, 0.0, -1.0, 1.0);
    let mut status = renderer
        .generate_geometry("You draw |Excalibur from the stone.", Color::WHITE, Color::BLACK)
        .unwrap();

    for frame in 0..4u32 {
        let text = format!("Frame {} - press |<Space> to continue", frame);
        status = renderer
            .replace_geometry(status, &text, Color::WHITE, Color::BLACK)
            .unwrap();
        renderer
            .add_text_instance(Vec2::new(40.0, 40.0), 32.0, status.range())
            .unwrap();
        renderer
            .one_shot_text("|Excalibur", Vec2::new(40.0, 120.0), 64.0, Color::WHITE, Color::BLACK)
            .unwrap();

        renderer.render_instances(Mat4::IDENTITY, projection, FontDrawType::StandardWithStroke);
        new_frame();

        let pool = renderer.buffer_pool();
        tracing::info!(
            "Frame {}: {}/{} vertices in use, {} free ranges",
            frame,
            pool.used_vertices(),
            pool.vertex_capacity(),
            pool.free_ranges().len()
        );
    }

    let size = renderer.measure_text("You draw |Excalibur from the stone.");
    tracing::info!("Status line measures {:.2} x {:.2} em", size.x, size.y);
    tracing::info!("{} draws issued", device.count_draws());
}
