/// Finds the length of the common prefix between a key and a node's key fragment.
///
/// Returns the number of bytes that match starting from the given offset.
pub fn prefix_match(key: &[u8], start_idx: usize, node_key: &[u8]) -> usize {
    let tail = key.get(start_idx..).unwrap_or(&[]);
    tail.iter()
        .zip(node_key.iter())
        .take_while(|(a, b)| a == b)
        .count()
}

/// Returns `true` if `key` starts with every byte of `prefix`.
///
/// An empty prefix admits every key.
#[inline]
pub fn has_prefix(key: &[u8], prefix: &[u8]) -> bool {
    key.len() >= prefix.len() && key[..prefix.len()] == *prefix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_match() {
        let key = b"abcdef";
        let node_key = b"abc";

        // They should match completely with the node_key
        assert_eq!(prefix_match(key, 0, node_key), 3);

        // Starting from index 1 (the 2nd byte), they should match 2 bytes
        let matching_key = b"bc";
        assert_eq!(prefix_match(key, 1, matching_key), 2);

        // Different keys
        let different_key = b"xyz";
        assert_eq!(prefix_match(key, 0, different_key), 0);
    }

    #[test]
    fn test_prefix_match_past_end() {
        assert_eq!(prefix_match(b"ab", 2, b"cd"), 0);
        assert_eq!(prefix_match(b"ab", 5, b"cd"), 0);
        assert_eq!(prefix_match(b"abc", 1, b""), 0);
        // key runs out before the fragment does
        assert_eq!(prefix_match(b"hel", 0, b"hello"), 3);
    }

    #[test]
    fn test_has_prefix() {
        assert!(has_prefix(b"hello", b"hel"));
        assert!(has_prefix(b"hello", b"hello"));
        assert!(has_prefix(b"hello", b""));
        assert!(has_prefix(b"", b""));
        assert!(!has_prefix(b"he", b"hel"));
        assert!(!has_prefix(b"help", b"helo"));
    }
}
