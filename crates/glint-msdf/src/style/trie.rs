//! Prefix tree used for word triggers and start-tag lookup.

use glint_core::alloc::HashMap;

#[derive(Debug)]
struct TrieNode<V> {
    children: HashMap<char, usize>,
    value: Option<V>,
}

impl<V> TrieNode<V> {
    fn new() -> Self {
        Self {
            children: HashMap::new(),
            value: None,
        }
    }
}

/// Result of a successful [`Trie::try_match`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrieMatch<'a, V> {
    pub value: &'a V,
    /// Number of characters consumed by the matched key.
    pub len: usize,
}

/// Character trie with greedy longest-prefix matching.
///
/// Nodes live in a flat arena; index 0 is the root.
#[derive(Debug)]
pub struct Trie<V> {
    nodes: Vec<TrieNode<V>>,
}

impl<V> Default for Trie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Trie<V> {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::new()],
        }
    }

    /// Map `key` to `value`, replacing any previous value for the same key.
    pub fn add(&mut self, key: &str, value: V) {
        let mut node = 0;
        for ch in key.chars() {
            node = match self.nodes[node].children.get(&ch) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(TrieNode::new());
                    self.nodes[node].children.insert(ch, child);
                    child
                }
            };
        }
        self.nodes[node].value = Some(value);
    }

    /// Walk from `input[start]` and return the longest key seen on the way.
    ///
    /// The walk stops at the first character without a child; there is no
    /// backtracking. Returns `None` when no key matched.
    pub fn try_match(&self, input: &[char], start: usize) -> Option<TrieMatch<'_, V>> {
        let mut node = 0;
        let mut best = None;

        for (i, ch) in input.iter().enumerate().skip(start) {
            let Some(&child) = self.nodes[node].children.get(ch) else {
                break;
            };
            node = child;
            if let Some(value) = &self.nodes[node].value {
                best = Some(TrieMatch {
                    value,
                    len: i - start + 1,
                });
            }
        }

        best
    }

    /// Returns `true` if no key has been added.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1 && self.nodes[0].value.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_longest_match_wins() {
        let mut trie = Trie::new();
        trie.add("EX", 1);
        trie.add("EXCALIBUR", 2);

        let input = chars("EXCALIBUR sword");
        let m = trie.try_match(&input, 0).unwrap();
        assert_eq!(m.len, 9);
        assert_eq!(*m.value, 2);
    }

    #[test]
    fn test_shorter_key_found_when_longer_breaks() {
        let mut trie = Trie::new();
        trie.add("EX", 1);
        trie.add("EXCALIBUR", 2);

        let input = chars("EXCAVATE");
        let m = trie.try_match(&input, 0).unwrap();
        assert_eq!(m.len, 2);
        assert_eq!(*m.value, 1);
    }

    #[test]
    fn test_match_at_offset() {
        let mut trie = Trie::new();
        trie.add("sword", 7);

        let input = chars("a sword");
        assert!(trie.try_match(&input, 0).is_none());
        assert_eq!(trie.try_match(&input, 2).unwrap().len, 5);
    }

    #[test]
    fn test_prefix_without_value_is_no_match() {
        let mut trie = Trie::new();
        trie.add("hello", 0);

        assert!(trie.try_match(&chars("hell"), 0).is_none());
        assert!(trie.try_match(&chars("help"), 0).is_none());
    }

    #[test]
    fn test_add_overwrites() {
        let mut trie = Trie::new();
        trie.add("key", 1);
        trie.add("key", 5);
        assert_eq!(*trie.try_match(&chars("key"), 0).unwrap().value, 5);
    }

    #[test]
    fn test_start_past_end() {
        let mut trie = Trie::new();
        trie.add("a", 0);
        assert!(trie.try_match(&chars("a"), 3).is_none());
        assert!(Trie::<u8>::new().is_empty());
        assert!(!trie.is_empty());
    }
}
