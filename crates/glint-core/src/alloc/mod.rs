//! Optimized collection types for Glint.
//!
//! Glyph lookups, kerning tables and trie children are all small hash maps
//! queried once per character, so they use AHash instead of SipHash.

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashmap_char_keys() {
        let mut map = HashMap::new();
        map.insert('A', 65u32);
        map.insert('V', 86u32);
        assert_eq!(map.get(&'A'), Some(&65));
        assert_eq!(map.get(&'x'), None);
    }

    #[test]
    fn test_hashset_pairs() {
        let mut set = HashSet::new();
        set.insert(('A', 'V'));
        assert!(set.contains(&('A', 'V')));
        assert!(!set.contains(&('V', 'A')));
    }
}
