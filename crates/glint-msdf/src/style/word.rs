use super::StyleId;
use super::trie::Trie;

/// A registered word found in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordMatch {
    pub style_id: StyleId,
    /// Length of the word in characters.
    pub len: usize,
}

/// Case-sensitive literal word triggers.
#[derive(Debug, Default)]
pub struct WordMatcher {
    trie: Trie<StyleId>,
}

impl WordMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_word(&mut self, word: &str, style_id: StyleId) {
        self.trie.add(word, style_id);
    }

    /// Longest registered word beginning at `input[start]`.
    pub fn try_match_word(&self, input: &[char], start: usize) -> Option<WordMatch> {
        self.trie.try_match(input, start).map(|m| WordMatch {
            style_id: *m.value,
            len: m.len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_word() {
        let mut matcher = WordMatcher::new();
        matcher.add_word("Excalibur", 3);

        let input: Vec<char> = "|Excalibur!".chars().collect();
        assert_eq!(
            matcher.try_match_word(&input, 1),
            Some(WordMatch {
                style_id: 3,
                len: 9
            })
        );
        assert_eq!(matcher.try_match_word(&input, 0), None);
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let mut matcher = WordMatcher::new();
        matcher.add_word("fire", 0);

        let input: Vec<char> = "Fire".chars().collect();
        assert_eq!(matcher.try_match_word(&input, 0), None);
    }
}
