//! Inline text styling.
//!
//! Styles are triggered from text in two ways, both introduced by the
//! renderer's style prefix character (`|` by default):
//!
//! - **Words**: `|Excalibur` styles the registered word `Excalibur`.
//! - **Tags**: `|<glowing>` styles the content between a registered start
//!   and end delimiter; the delimiters themselves are not drawn.
//!
//! # Example
//!
//! ```
//! use glint_msdf::{TextStyle, TextStylizer, StyleRule, TagDefinition};
//! use glint_render::Color;
//!
//! let mut stylizer = TextStylizer::new();
//! let gold = stylizer.add_style(TextStyle::new().with_fill(Color::YELLOW));
//! let wide = stylizer.add_style(TextStyle::new().with_spacing(0.1));
//!
//! stylizer.add_rule(StyleRule::new("Excalibur", gold)).unwrap();
//! stylizer.add_tag(TagDefinition::new("<", ">", wide)).unwrap();
//! ```

mod tag;
mod trie;
mod word;

use std::sync::Arc;

use glint_render::Color;

use crate::error::{StyleError, StyleResult};

pub use tag::{TagMatch, TagParser};
pub use trie::{Trie, TrieMatch};
pub use word::{WordMatch, WordMatcher};

/// Index of a style in [`TextStylizer::styles`].
pub type StyleId = u16;

/// Visual overrides applied to a span of glyphs.
///
/// Fill and stroke are given per quad corner (bottom-left, bottom-right,
/// top-right, top-left), which allows gradients across each glyph.
pub trait GlyphStyle: Send + Sync {
    /// Extra advance added after each glyph, in em units.
    fn spacing(&self) -> f32 {
        0.0
    }

    fn fill(&self) -> Option<[Color; 4]> {
        None
    }

    fn stroke(&self) -> Option<[Color; 4]> {
        None
    }
}

/// Plain data implementation of [`GlyphStyle`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextStyle {
    pub spacing: f32,
    pub fill: Option<[Color; 4]>,
    pub stroke: Option<[Color; 4]>,
}

impl TextStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Solid fill color on all four corners.
    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill = Some([color; 4]);
        self
    }

    /// Bottom-to-top fill gradient.
    pub fn with_fill_gradient(mut self, bottom: Color, top: Color) -> Self {
        self.fill = Some([bottom, bottom, top, top]);
        self
    }

    pub fn with_fill_corners(mut self, corners: [Color; 4]) -> Self {
        self.fill = Some(corners);
        self
    }

    pub fn with_stroke(mut self, color: Color) -> Self {
        self.stroke = Some([color; 4]);
        self
    }

    pub fn with_stroke_corners(mut self, corners: [Color; 4]) -> Self {
        self.stroke = Some(corners);
        self
    }
}

impl GlyphStyle for TextStyle {
    fn spacing(&self) -> f32 {
        self.spacing
    }

    fn fill(&self) -> Option<[Color; 4]> {
        self.fill
    }

    fn stroke(&self) -> Option<[Color; 4]> {
        self.stroke
    }
}

/// Literal word trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub word: String,
    pub style_id: StyleId,
}

impl StyleRule {
    pub fn new(word: impl Into<String>, style_id: StyleId) -> Self {
        Self {
            word: word.into(),
            style_id,
        }
    }
}

/// Delimiter pair trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDefinition {
    pub start: String,
    pub end: String,
    pub style_id: StyleId,
}

impl TagDefinition {
    pub fn new(start: impl Into<String>, end: impl Into<String>, style_id: StyleId) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            style_id,
        }
    }
}

/// Registered styles plus the word and tag matchers that trigger them.
///
/// Style ids are indices into the style list. Rules and tags may reference
/// ids before the style is registered; keeping ids consistent with
/// registration order is up to the caller.
#[derive(Default)]
pub struct TextStylizer {
    styles: Vec<Arc<dyn GlyphStyle>>,
    words: WordMatcher,
    tags: TagParser,
}

impl TextStylizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a style and return its id.
    pub fn add_style(&mut self, style: impl GlyphStyle + 'static) -> StyleId {
        self.add_shared_style(Arc::new(style))
    }

    pub fn add_shared_style(&mut self, style: Arc<dyn GlyphStyle>) -> StyleId {
        let id = self.styles.len() as StyleId;
        self.styles.push(style);
        tracing::trace!("Registered glyph style {}", id);
        id
    }

    pub fn style(&self, id: StyleId) -> Option<&Arc<dyn GlyphStyle>> {
        self.styles.get(id as usize)
    }

    pub fn styles(&self) -> &[Arc<dyn GlyphStyle>] {
        &self.styles
    }

    pub fn add_rule(&mut self, rule: StyleRule) -> StyleResult<()> {
        if rule.word.trim().is_empty() {
            return Err(StyleError::EmptyWord);
        }
        self.words.add_word(&rule.word, rule.style_id);
        Ok(())
    }

    pub fn add_tag(&mut self, tag: TagDefinition) -> StyleResult<()> {
        if tag.start.trim().is_empty() || tag.end.trim().is_empty() {
            return Err(StyleError::EmptyTag {
                start: tag.start,
                end: tag.end,
            });
        }
        self.tags.add_tag(&tag.start, &tag.end, tag.style_id);
        Ok(())
    }

    pub fn word_matcher(&self) -> &WordMatcher {
        &self.words
    }

    pub fn tag_parser(&self) -> &TagParser {
        &self.tags
    }
}

impl std::fmt::Debug for TextStylizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextStylizer")
            .field("styles", &self.styles.len())
            .finish_non_exhaustive()
    }
}
