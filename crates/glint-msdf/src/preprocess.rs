//! Single-pass scan that turns marked-up text into [`DrawGlyph`] records.
//!
//! The scan strips style markers and tag delimiters, drops characters the
//! atlas cannot draw, and records where each style span begins and how many
//! emitted entries it covers.

use glint_core::profiling::profile_function;

use crate::style::{StyleId, TextStylizer};

/// One laid-out character.
///
/// `style_length > 0` marks the start of a style span covering that many
/// entries, this one included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawGlyph {
    pub character: char,
    pub style_index: StyleId,
    pub style_length: u32,
}

impl DrawGlyph {
    pub const fn plain(character: char) -> Self {
        Self {
            character,
            style_index: 0,
            style_length: 0,
        }
    }

    /// Whitespace and newlines take part in layout but never produce a quad.
    pub fn is_whitespace(&self) -> bool {
        self.character.is_whitespace()
    }
}

/// Output of [`TextPreprocessor::process`], borrowed from its scratch buffers.
#[derive(Debug, Clone, Copy)]
pub struct ProcessedText<'a> {
    pub glyphs: &'a [DrawGlyph],
    /// Entries that need a quad; sizes the buffer reservation.
    pub renderable_count: usize,
}

impl ProcessedText<'_> {
    /// Vertices to reserve for this text.
    pub fn vertex_count(&self) -> usize {
        self.renderable_count * 4
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenSpan {
    style_id: StyleId,
    /// Source index one past the span content.
    content_end: usize,
    /// Entry holding the span's start, once something was emitted.
    first_entry: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct PendingEnd {
    index: usize,
    len: usize,
}

/// Reusable scratch state for preprocessing.
///
/// Buffers grow to the longest text seen and are reused across calls.
#[derive(Debug, Default)]
pub struct TextPreprocessor {
    chars: Vec<char>,
    glyphs: Vec<DrawGlyph>,
    open_spans: Vec<OpenSpan>,
    pending_ends: Vec<PendingEnd>,
    renderable: usize,
}

impl TextPreprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `text` and return the draw glyphs.
    ///
    /// `prefix` introduces a style word or tag. A prefix followed by neither
    /// is dropped and the next character is taken literally, so `||` yields a
    /// single `|`. A prefix at the very end of the input is ignored.
    /// Characters for which `is_supported` returns `false` are dropped;
    /// whitespace is always kept.
    pub fn process(
        &mut self,
        text: &str,
        stylizer: &TextStylizer,
        prefix: char,
        is_supported: impl Fn(char) -> bool,
    ) -> ProcessedText<'_> {
        profile_function!();
        self.chars.clear();
        self.chars.extend(text.chars());
        self.glyphs.clear();
        self.open_spans.clear();
        self.pending_ends.clear();
        self.renderable = 0;

        let len = self.chars.len();
        let mut i = 0;

        while i < len {
            if let Some(end) = self.take_pending_end(i) {
                i += end.len;
                continue;
            }

            let c = self.chars[i];
            if c != prefix {
                self.emit(c, i, &is_supported);
                i += 1;
                continue;
            }

            let next = i + 1;
            if next >= len {
                break;
            }

            if let Some(word) = stylizer.word_matcher().try_match_word(&self.chars, next) {
                self.open_span(word.style_id, next + word.len);
            } else if let Some(tag) = stylizer.tag_parser().try_parse_tag(&self.chars, next) {
                let content_start = next + tag.start_len;
                let content_end = content_start + tag.content_len();
                self.pending_ends.push(PendingEnd {
                    index: content_end,
                    len: tag.end_len,
                });
                self.open_span(tag.style_id, content_end);
                i = content_start;
                continue;
            }

            // Word match or failed marker: the character after the prefix is
            // content and is not re-examined as a marker.
            if self.pending_ends.iter().any(|end| end.index == next) {
                i = next;
                continue;
            }
            let literal = self.chars[next];
            self.emit(literal, next, &is_supported);
            i = next + 1;
        }

        ProcessedText {
            glyphs: &self.glyphs,
            renderable_count: self.renderable,
        }
    }

    fn take_pending_end(&mut self, index: usize) -> Option<PendingEnd> {
        let pos = self.pending_ends.iter().position(|end| end.index == index)?;
        Some(self.pending_ends.swap_remove(pos))
    }

    fn open_span(&mut self, style_id: StyleId, content_end: usize) {
        self.open_spans.push(OpenSpan {
            style_id,
            content_end,
            first_entry: None,
        });
    }

    fn emit(&mut self, c: char, source: usize, is_supported: &impl Fn(char) -> bool) {
        let whitespace = c.is_whitespace();
        if !whitespace && !is_supported(c) {
            return;
        }

        let entry = self.glyphs.len();
        self.glyphs.push(DrawGlyph::plain(c));
        if !whitespace {
            self.renderable += 1;
        }

        self.open_spans.retain(|span| span.content_end > source);

        for k in 0..self.open_spans.len() {
            let Some(first) = self.open_spans[k].first_entry else {
                continue;
            };
            self.glyphs[first].style_length += 1;
        }

        // Spans starting here. A later span on the same entry replaces an
        // earlier one.
        let mut started: Option<usize> = None;
        for k in 0..self.open_spans.len() {
            if self.open_spans[k].first_entry.is_none() {
                if let Some(previous) = started {
                    tracing::debug!(
                        "Style span {} replaced by {} at entry {}",
                        self.open_spans[previous].style_id,
                        self.open_spans[k].style_id,
                        entry
                    );
                }
                started = Some(k);
            }
        }
        if let Some(winner) = started {
            let style_id = self.open_spans[winner].style_id;
            // Losing spans are closed so they stop counting.
            for k in 0..self.open_spans.len() {
                if self.open_spans[k].first_entry.is_none() && k != winner {
                    self.open_spans[k].content_end = 0;
                }
            }
            self.open_spans[winner].first_entry = Some(entry);
            self.glyphs[entry].style_index = style_id;
            self.glyphs[entry].style_length = 1;
            self.open_spans.retain(|span| span.content_end > source);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{StyleRule, TagDefinition, TextStyle};

    fn stylizer() -> TextStylizer {
        let mut stylizer = TextStylizer::new();
        stylizer.add_style(TextStyle::new());
        stylizer.add_style(TextStyle::new());
        stylizer.add_style(TextStyle::new());
        stylizer
    }

    fn ascii(c: char) -> bool {
        c.is_ascii_graphic()
    }

    fn text_of(glyphs: &[DrawGlyph]) -> String {
        glyphs.iter().map(|g| g.character).collect()
    }

    #[test]
    fn test_plain_text() {
        let stylizer = stylizer();
        let mut pre = TextPreprocessor::new();
        let out = pre.process("hi there\nyou", &stylizer, '|', ascii);
        assert_eq!(text_of(out.glyphs), "hi there\nyou");
        assert_eq!(out.renderable_count, 10);
        assert_eq!(out.vertex_count(), 40);
        assert!(out.glyphs.iter().all(|g| g.style_length == 0));
    }

    #[test]
    fn test_unsupported_characters_dropped() {
        let stylizer = stylizer();
        let mut pre = TextPreprocessor::new();
        let out = pre.process("a\u{e9}b", &stylizer, '|', ascii);
        assert_eq!(text_of(out.glyphs), "ab");
        assert_eq!(out.renderable_count, 2);
    }

    #[test]
    fn test_word_span() {
        let mut stylizer = stylizer();
        stylizer.add_rule(StyleRule::new("sword", 2)).unwrap();

        let mut pre = TextPreprocessor::new();
        let out = pre.process("my |sword!", &stylizer, '|', ascii);
        assert_eq!(text_of(out.glyphs), "my sword!");
        assert_eq!(out.renderable_count, 8);

        let start = out.glyphs[3];
        assert_eq!(start.character, 's');
        assert_eq!(start.style_index, 2);
        assert_eq!(start.style_length, 5);
        assert_eq!(out.glyphs[8].style_length, 0);
    }

    #[test]
    fn test_tag_span_strips_delimiters() {
        let mut stylizer = stylizer();
        stylizer.add_tag(TagDefinition::new("<", ">", 0)).unwrap();

        let mut pre = TextPreprocessor::new();
        let out = pre.process("a |<bold>text|b", &stylizer, '|', ascii);
        assert_eq!(text_of(out.glyphs), "a boldtextb");
        assert_eq!(out.glyphs[2].style_index, 0);
        assert_eq!(out.glyphs[2].style_length, 4);
        assert_eq!(out.renderable_count, 10);
    }

    #[test]
    fn test_tag_with_word_start_delimiter() {
        let mut stylizer = stylizer();
        stylizer.add_tag(TagDefinition::new("<bold>", "|", 1)).unwrap();

        let mut pre = TextPreprocessor::new();
        let out = pre.process("a |<bold>text|b", &stylizer, '|', ascii);
        assert_eq!(text_of(out.glyphs), "a textb");
        assert_eq!(out.glyphs[2].character, 't');
        assert_eq!(out.glyphs[2].style_index, 1);
        assert_eq!(out.glyphs[2].style_length, 4);
    }

    #[test]
    fn test_span_counts_whitespace_not_dropped_chars() {
        let mut stylizer = stylizer();
        stylizer.add_tag(TagDefinition::new("[", "]", 1)).unwrap();

        let mut pre = TextPreprocessor::new();
        let out = pre.process("|[a \u{e9}b]c", &stylizer, '|', ascii);
        assert_eq!(text_of(out.glyphs), "a bc");
        assert_eq!(out.glyphs[0].style_length, 3);
    }

    #[test]
    fn test_span_starting_on_dropped_char_moves_forward() {
        let mut stylizer = stylizer();
        stylizer.add_tag(TagDefinition::new("[", "]", 1)).unwrap();

        let mut pre = TextPreprocessor::new();
        let out = pre.process("x|[\u{e9}ab]", &stylizer, '|', ascii);
        assert_eq!(text_of(out.glyphs), "xab");
        assert_eq!(out.glyphs[0].style_length, 0);
        assert_eq!(out.glyphs[1].style_index, 1);
        assert_eq!(out.glyphs[1].style_length, 2);
    }

    #[test]
    fn test_unmatched_tag_is_literal() {
        let mut stylizer = stylizer();
        stylizer.add_tag(TagDefinition::new("<", ">", 0)).unwrap();

        let mut pre = TextPreprocessor::new();
        let out = pre.process("|<bold text", &stylizer, '|', ascii);
        assert_eq!(text_of(out.glyphs), "<bold text");
        assert!(out.glyphs.iter().all(|g| g.style_length == 0));
    }

    #[test]
    fn test_double_prefix_is_literal_prefix() {
        let stylizer = stylizer();
        let mut pre = TextPreprocessor::new();
        let out = pre.process("a||b", &stylizer, '|', ascii);
        assert_eq!(text_of(out.glyphs), "a|b");
        assert_eq!(out.renderable_count, 3);
    }

    #[test]
    fn test_trailing_prefix_ignored() {
        let stylizer = stylizer();
        let mut pre = TextPreprocessor::new();
        let out = pre.process("end|", &stylizer, '|', ascii);
        assert_eq!(text_of(out.glyphs), "end");
    }

    #[test]
    fn test_end_delimiter_at_input_end() {
        let mut stylizer = stylizer();
        stylizer.add_tag(TagDefinition::new("<", ">>", 0)).unwrap();

        let mut pre = TextPreprocessor::new();
        let out = pre.process("|<ab>>", &stylizer, '|', ascii);
        assert_eq!(text_of(out.glyphs), "ab");
        assert_eq!(out.glyphs[0].style_length, 2);
    }

    #[test]
    fn test_empty_tag_content() {
        let mut stylizer = stylizer();
        stylizer.add_tag(TagDefinition::new("<", ">", 0)).unwrap();

        let mut pre = TextPreprocessor::new();
        let out = pre.process("a|<>b", &stylizer, '|', ascii);
        assert_eq!(text_of(out.glyphs), "ab");
        assert!(out.glyphs.iter().all(|g| g.style_length == 0));
    }

    #[test]
    fn test_nested_tags() {
        let mut stylizer = stylizer();
        stylizer.add_tag(TagDefinition::new("[", "]", 1)).unwrap();
        stylizer.add_tag(TagDefinition::new("<", ">", 2)).unwrap();

        let mut pre = TextPreprocessor::new();
        let out = pre.process("|[ab|<cd>e]f", &stylizer, '|', ascii);
        assert_eq!(text_of(out.glyphs), "abcdef");
        assert_eq!(out.glyphs[0].style_index, 1);
        assert_eq!(out.glyphs[0].style_length, 5);
        assert_eq!(out.glyphs[2].style_index, 2);
        assert_eq!(out.glyphs[2].style_length, 2);
        assert_eq!(out.glyphs[5].style_length, 0);
    }

    #[test]
    fn test_later_span_wins_on_shared_start() {
        let mut stylizer = stylizer();
        stylizer.add_tag(TagDefinition::new("[", "]", 1)).unwrap();
        stylizer.add_rule(StyleRule::new("ab", 2)).unwrap();

        let mut pre = TextPreprocessor::new();
        let out = pre.process("|[|abc]", &stylizer, '|', ascii);
        assert_eq!(text_of(out.glyphs), "abc");
        assert_eq!(out.glyphs[0].style_index, 2);
        assert_eq!(out.glyphs[0].style_length, 2);
    }

    #[test]
    fn test_scratch_reused() {
        let stylizer = stylizer();
        let mut pre = TextPreprocessor::new();
        pre.process("a much longer piece of text", &stylizer, '|', ascii);
        let out = pre.process("ab", &stylizer, '|', ascii);
        assert_eq!(text_of(out.glyphs), "ab");
        assert_eq!(out.renderable_count, 2);
    }
}
