use super::StyleId;
use super::trie::Trie;

#[derive(Debug, Clone)]
struct TagEntry {
    end: Vec<char>,
    start_len: usize,
    style_id: StyleId,
}

/// A complete start-tag, content, end-tag construct found in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagMatch {
    pub style_id: StyleId,
    /// Start tag + content + end tag, in characters.
    pub total_len: usize,
    pub start_len: usize,
    pub end_len: usize,
}

impl TagMatch {
    /// Number of content characters between the delimiters.
    pub fn content_len(&self) -> usize {
        self.total_len - self.start_len - self.end_len
    }
}

/// Matches delimiter pairs such as `<` ... `>` around a span of text.
#[derive(Debug, Default)]
pub struct TagParser {
    start_tags: Trie<TagEntry>,
}

impl TagParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tag(&mut self, start: &str, end: &str, style_id: StyleId) {
        self.start_tags.add(
            start,
            TagEntry {
                end: end.chars().collect(),
                start_len: start.chars().count(),
                style_id,
            },
        );
    }

    /// Parse a tag whose start delimiter begins at `input[start]`.
    ///
    /// The end delimiter is the first literal occurrence after the start tag.
    /// Returns `None` if no start tag matches or the end tag never appears.
    pub fn try_parse_tag(&self, input: &[char], start: usize) -> Option<TagMatch> {
        let matched = self.start_tags.try_match(input, start)?;
        let tag = matched.value;
        if tag.end.is_empty() {
            return None;
        }
        let content_start = start + matched.len;

        let end_offset = input
            .get(content_start..)?
            .windows(tag.end.len())
            .position(|window| window == tag.end.as_slice())?;

        Some(TagMatch {
            style_id: tag.style_id,
            total_len: matched.len + end_offset + tag.end.len(),
            start_len: tag.start_len,
            end_len: tag.end.len(),
        })
    }
}
