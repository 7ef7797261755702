//! Benchmarks for marker stripping and style span resolution

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glint_msdf::{StyleRule, TagDefinition, TextPreprocessor, TextStyle, TextStylizer};
use glint_render::Color;

fn stylizer() -> TextStylizer {
    let mut stylizer = TextStylizer::new();
    let gold = stylizer.add_style(TextStyle::new().with_fill(Color::YELLOW));
    let wide = stylizer.add_style(TextStyle::new().with_spacing(0.1));
    for word in ["Excalibur", "Excalibur's", "dragon", "gold", "sword", "shield"] {
        stylizer.add_rule(StyleRule::new(word, gold)).unwrap();
    }
    stylizer.add_tag(TagDefinition::new("<", ">", wide)).unwrap();
    stylizer.add_tag(TagDefinition::new("[", "]", gold)).unwrap();
    stylizer
}

fn bench_plain_text(c: &mut Criterion) {
    let stylizer = TextStylizer::new();
    let mut preprocessor = TextPreprocessor::new();
    let mut group = c.benchmark_group("preprocess_plain");

    for words in [4usize, 32, 256] {
        let text = "The quick brown fox jumps. ".repeat(words);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(words), &text, |b, text| {
            b.iter(|| {
                let processed = preprocessor.process(black_box(text), &stylizer, '|', |c| c.is_ascii());
                black_box(processed.renderable_count)
            });
        });
    }

    group.finish();
}

fn bench_styled_text(c: &mut Criterion) {
    let stylizer = stylizer();
    let mut preprocessor = TextPreprocessor::new();
    let mut group = c.benchmark_group("preprocess_styled");

    let inputs = [
        ("words", "You found |Excalibur and a |dragon's hoard of |gold!".repeat(16)),
        ("tags", "Press |<Enter> to |[continue] or |<Esc> to quit. ".repeat(16)),
        ("failed_markers", "|| 50% |off |everything ".repeat(16)),
    ];

    for (name, text) in &inputs {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_function(*name, |b| {
            b.iter(|| {
                let processed = preprocessor.process(black_box(text), &stylizer, '|', |c| c.is_ascii());
                black_box(processed.glyphs.len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_plain_text, bench_styled_text);
criterion_main!(benches);
