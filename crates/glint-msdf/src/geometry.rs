//! Writes glyph quads into a reserved vertex range.

use glint_core::profiling::profile_function;
use glint_render::MsdfVertex;

use crate::buffer::VERTICES_PER_QUAD;
use crate::layout::{GlyphQuad, LayoutContext, TextLayout};
use crate::preprocess::DrawGlyph;

/// Lay out `glyphs` into `out`, the vertices of a range starting at absolute
/// vertex `base_vertex`.
///
/// Slots past the last written quad are zeroed. Returns the number of quads
/// written.
pub fn generate_geometry(
    layout: &mut TextLayout,
    glyphs: &[DrawGlyph],
    ctx: &LayoutContext<'_>,
    out: &mut [MsdfVertex],
    base_vertex: u32,
) -> u32 {
    profile_function!();
    let capacity = out.len() / VERTICES_PER_QUAD as usize;
    let mut written = 0usize;

    layout.walk(glyphs, ctx, |quad| {
        if written >= capacity {
            debug_assert!(false, "text geometry overflowed its reserved range");
            return;
        }
        let start = written * VERTICES_PER_QUAD as usize;
        write_quad(
            &mut out[start..start + VERTICES_PER_QUAD as usize],
            quad,
            base_vertex + start as u32,
        );
        written += 1;
    });

    let used = written * VERTICES_PER_QUAD as usize;
    out[used..].fill(MsdfVertex::default());
    written as u32
}

fn write_quad(slots: &mut [MsdfVertex], quad: &GlyphQuad, first_id: u32) {
    for (corner, vertex) in slots.iter_mut().enumerate() {
        *vertex = MsdfVertex {
            position: quad.positions[corner],
            tex_coords: quad.tex_coords[corner],
            fill: quad.fill[corner].to_rgba8(),
            stroke: quad.stroke[corner].to_rgba8(),
            vertex_id: first_id + corner as u32,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tests::test_atlas;
    use crate::preprocess::TextPreprocessor;
    use crate::style::{StyleRule, TextStyle, TextStylizer};
    use glint_render::Color;

    fn generate(text: &str, stylizer: &TextStylizer, slots: usize, base: u32) -> (Vec<MsdfVertex>, u32) {
        let atlas = test_atlas();
        let mut pre = TextPreprocessor::new();
        let processed = pre.process(text, stylizer, '|', |c| atlas.contains(c));
        let ctx = LayoutContext {
            atlas: &atlas,
            stylizer,
            kerning: true,
            fill: Color::WHITE,
            stroke: Color::BLACK,
        };
        let mut out = vec![MsdfVertex::default(); slots];
        let quads = generate_geometry(&mut TextLayout::new(), processed.glyphs, &ctx, &mut out, base);
        (out, quads)
    }

    #[test]
    fn test_vertex_ids_are_absolute() {
        let (out, quads) = generate("Hi", &TextStylizer::new(), 8, 100);
        assert_eq!(quads, 2);
        let ids: Vec<u32> = out.iter().map(|v| v.vertex_id).collect();
        assert_eq!(ids, (100..108).collect::<Vec<u32>>());
    }

    #[test]
    fn test_corner_order_and_colors() {
        let (out, _) = generate("A", &TextStylizer::new(), 4, 0);
        // bottom-left, bottom-right, top-right, top-left
        assert_eq!(out[0].position[0], out[3].position[0]);
        assert_eq!(out[1].position[0], out[2].position[0]);
        assert!(out[0].position[0] < out[1].position[0]);
        assert!(out[0].position[1] > out[3].position[1]);
        assert_eq!(out[0].fill, [255, 255, 255, 255]);
        assert_eq!(out[0].stroke, [0, 0, 0, 255]);
    }

    #[test]
    fn test_unused_tail_zeroed() {
        let stylizer = TextStylizer::new();
        let mut out = vec![
            MsdfVertex {
                vertex_id: 9,
                ..Default::default()
            };
            12
        ];
        let atlas = test_atlas();
        let mut pre = TextPreprocessor::new();
        // '_' counts as renderable but draws nothing.
        let processed = pre.process("A_B", &stylizer, '|', |c| atlas.contains(c));
        assert_eq!(processed.renderable_count, 3);
        let ctx = LayoutContext {
            atlas: &atlas,
            stylizer: &stylizer,
            kerning: true,
            fill: Color::WHITE,
            stroke: Color::WHITE,
        };
        let quads = generate_geometry(&mut TextLayout::new(), processed.glyphs, &ctx, &mut out, 0);
        assert_eq!(quads, 2);
        assert!(out[8..].iter().all(|v| *v == MsdfVertex::default()));
    }

    #[test]
    fn test_gradient_style_per_corner() {
        let mut stylizer = TextStylizer::new();
        let gradient = stylizer.add_style(TextStyle::new().with_fill_gradient(Color::RED, Color::BLUE));
        stylizer.add_rule(StyleRule::new("A", gradient)).unwrap();

        let (out, _) = generate("|AB", &stylizer, 8, 0);
        assert_eq!(out[0].fill, [255, 0, 0, 255]);
        assert_eq!(out[1].fill, [255, 0, 0, 255]);
        assert_eq!(out[2].fill, [0, 0, 255, 255]);
        assert_eq!(out[3].fill, [0, 0, 255, 255]);
        assert_eq!(out[4].fill, [255, 255, 255, 255]);
    }
}
