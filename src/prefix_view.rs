//! Prefix views into a radix trie.
//!
//! This module provides the `PrefixView` type, a borrowed window onto the keys
//! that start with a prefix, and `PrefixesOf`, which walks the stored keys that
//! are prefixes of a path. Both are driven by a [`Cursor`].

use std::fmt;

use crate::cursor::{Cursor, Scope, SeekOp};
use crate::trie::Trie;
use crate::util::has_prefix;
use crate::Payload;

/// A lightweight view of the keys in a trie that start with a prefix.
///
/// # Examples
///
/// ```
/// use radix_index::Trie;
///
/// let trie: Trie = vec![("hello", 1), ("help", 2), ("world", 3)]
///     .into_iter()
///     .collect();
///
/// let view = trie.view_subtrie("hel");
/// assert!(view.exists());
/// assert!(view.contains_key("hello"));
/// assert!(!view.contains_key("world"));
///
/// let keys: Vec<Vec<u8>> = view.iter().map(|(k, _)| k).collect();
/// assert_eq!(keys, vec![b"hello".to_vec(), b"help".to_vec()]);
/// ```
#[derive(Clone)]
pub struct PrefixView<'a> {
    /// The source trie for this view
    trie: &'a Trie,

    /// The key prefix defining this view
    prefix: Vec<u8>,
}

impl<'a> PrefixView<'a> {
    /// Creates a new prefix view for the given trie and prefix.
    pub fn new(trie: &'a Trie, prefix: Vec<u8>) -> Self {
        PrefixView { trie, prefix }
    }

    /// Returns the key prefix for this view.
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Returns the underlying trie.
    pub fn trie(&self) -> &'a Trie {
        self.trie
    }

    /// Returns whether any key starts with the prefix.
    pub fn exists(&self) -> bool {
        self.iter().next().is_some()
    }

    /// Returns the number of keys in this view.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns whether this view is empty (contains no keys).
    pub fn is_empty(&self) -> bool {
        !self.exists()
    }

    /// Checks if the view contains a key.
    ///
    /// Only returns true if the key is in the trie and starts with the prefix.
    pub fn contains_key<K: AsRef<[u8]>>(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Gets the payload for a key if it exists in this prefix view.
    pub fn get<K: AsRef<[u8]>>(&self, key: K) -> Option<Payload> {
        let key = key.as_ref();
        if !has_prefix(key, &self.prefix) {
            return None;
        }
        self.trie.get(key)
    }

    /// Returns an iterator over the keys and payloads in ascending key order.
    pub fn iter(&self) -> PrefixIter<'a> {
        PrefixIter::new(self.trie, self.prefix.clone())
    }
}

impl fmt::Debug for PrefixView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrefixView")
            .field("prefix", &String::from_utf8_lossy(&self.prefix))
            .field("len", &self.len())
            .finish()
    }
}

/// Views are equal when they yield the same keys and payloads, whichever
/// trie they come from.
impl PartialEq for PrefixView<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for PrefixView<'_> {}

impl<'a> IntoIterator for &PrefixView<'a> {
    type Item = (Vec<u8>, Payload);
    type IntoIter = PrefixIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending iterator over the keys that start with a prefix.
///
/// Keys under a prefix are contiguous in key order, so the scan seeks to the
/// first key at least the prefix and steps forward until the first key
/// outside it.
pub struct PrefixIter<'a> {
    trie: &'a Trie,
    cursor: Cursor,
    prefix: Vec<u8>,
    started: bool,
    done: bool,
}

impl<'a> PrefixIter<'a> {
    pub(crate) fn new(trie: &'a Trie, prefix: Vec<u8>) -> Self {
        PrefixIter {
            trie,
            cursor: trie.cursor(),
            prefix,
            started: false,
            done: false,
        }
    }

    // The trie is borrowed for the iterator's lifetime, so the cursor can
    // neither go stale nor be stopped; any error simply ends the scan.
    fn step(&mut self) -> Option<Payload> {
        if !self.started {
            self.started = true;
            let payload = self
                .cursor
                .seek(self.trie, SeekOp::AtLeast, &self.prefix)
                .ok()
                .flatten()?;
            let in_scope = self
                .cursor
                .key()
                .map_or(false, |key| has_prefix(key, &self.prefix));
            return if in_scope { Some(payload) } else { None };
        }
        self.cursor.next(self.trie, &self.prefix).ok().flatten()
    }
}

impl Iterator for PrefixIter<'_> {
    type Item = (Vec<u8>, Payload);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Some(payload) => {
                let key = self.cursor.key()?.to_vec();
                Some((key, payload))
            }
            None => {
                self.done = true;
                self.cursor.stop();
                None
            }
        }
    }
}

/// Iterator over the stored keys that are prefixes of a path, longest first.
///
/// The greatest key at most the path has every stored prefix of the path on
/// its ancestor chain, so the walk is one seek followed by upward steps.
///
/// # Examples
///
/// ```
/// use radix_index::Trie;
///
/// let trie: Trie = vec![("/", 1), ("/api/", 2), ("/api/users/", 3), ("/apps", 4)]
///     .into_iter()
///     .collect();
///
/// let found: Vec<i64> = trie.prefixes_of("/api/users/42").map(|(_, v)| v).collect();
/// assert_eq!(found, vec![3, 2, 1]);
/// ```
pub struct PrefixesOf<'a> {
    trie: &'a Trie,
    cursor: Cursor,
    path: Vec<u8>,
    started: bool,
}

impl<'a> PrefixesOf<'a> {
    pub(crate) fn new(trie: &'a Trie, path: Vec<u8>) -> Self {
        PrefixesOf {
            trie,
            cursor: trie.cursor(),
            path,
            started: false,
        }
    }
}

impl Iterator for PrefixesOf<'_> {
    type Item = (Vec<u8>, Payload);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            let payload = self.cursor.seek_at_most(self.trie, &self.path).ok().flatten();
            if let (Some(payload), Some(key)) = (payload, self.cursor.key()) {
                if has_prefix(&self.path, key) {
                    return Some((key.to_vec(), payload));
                }
            }
        }
        let payload = self
            .cursor
            .up_in(self.trie, Scope::PrefixOf(&self.path))
            .ok()
            .flatten()?;
        let key = self.cursor.key()?.to_vec();
        Some((key, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Trie {
        vec![("hello", 1), ("help", 2), ("world", 3)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_prefix_view_creation() {
        let trie = sample();
        let view = PrefixView::new(&trie, b"hello".to_vec());

        assert_eq!(view.prefix(), b"hello");
        assert!(std::ptr::eq(view.trie(), &trie));
    }

    #[test]
    fn test_prefix_view_equality() {
        let trie1 = sample();
        let trie2: Trie = vec![("hello", 1), ("help", 2)].into_iter().collect();

        // same keys and payloads under the prefix, different tries
        assert_eq!(trie1.view_subtrie("hel"), trie2.view_subtrie("hel"));
        // a shorter prefix that selects the same keys
        assert_eq!(trie1.view_subtrie("hel"), trie1.view_subtrie("he"));

        let trie3: Trie = vec![("hello", 99), ("help", 2)].into_iter().collect();
        assert_ne!(trie1.view_subtrie("hel"), trie3.view_subtrie("hel"));

        // empty views are equal
        assert_eq!(trie1.view_subtrie("xyz"), trie3.view_subtrie("zzz"));
    }

    #[test]
    fn test_prefix_view_exists() {
        let trie = sample();
        assert!(trie.view_subtrie("hel").exists());
        // a prefix that ends inside a compressed run
        assert!(trie.view_subtrie("wor").exists());
        assert!(!trie.view_subtrie("xyz").exists());
        assert!(!trie.view_subtrie("hello!").exists());
    }

    #[test]
    fn test_prefix_view_len() {
        let trie = sample();
        assert_eq!(trie.view_subtrie("hel").len(), 2);
        assert_eq!(trie.view_subtrie("hello").len(), 1);
        assert_eq!(trie.view_subtrie("").len(), 3);

        let view = trie.view_subtrie("xyz");
        assert_eq!(view.len(), 0);
        assert!(view.is_empty());
    }

    #[test]
    fn test_prefix_view_get() {
        let trie = sample();
        let view = trie.view_subtrie("hel");

        assert_eq!(view.get("hello"), Some(1));
        assert_eq!(view.get("help"), Some(2));
        assert_eq!(view.get("world"), None);
        assert_eq!(view.get("he"), None);
    }

    #[test]
    fn test_prefix_view_iter_order() {
        let trie: Trie = vec![("ac", 3), ("ba", 4), ("aa", 1), ("ab", 2), ("a", 0)]
            .into_iter()
            .collect();

        let results: Vec<(Vec<u8>, Payload)> = trie.view_subtrie("a").iter().collect();
        assert_eq!(
            results,
            vec![
                (b"a".to_vec(), 0),
                (b"aa".to_vec(), 1),
                (b"ab".to_vec(), 2),
                (b"ac".to_vec(), 3),
            ]
        );
    }

    #[test]
    fn test_iter_is_fused_after_end() {
        let trie = sample();
        let mut iter = trie.view_subtrie("wor").iter();
        assert!(iter.next().is_some());
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_prefixes_of() {
        let trie: Trie = vec![("", 0), ("/", 1), ("/a", 2), ("/ab", 3), ("/b", 4)]
            .into_iter()
            .collect();

        let found: Vec<Payload> = trie.prefixes_of("/abc").map(|(_, v)| v).collect();
        assert_eq!(found, vec![3, 2, 1, 0]);

        // the greatest key at most "/aa" is "/a", not a sibling subtree
        let found: Vec<Payload> = trie.prefixes_of("/aa").map(|(_, v)| v).collect();
        assert_eq!(found, vec![2, 1, 0]);

        // the path itself counts
        let keys: Vec<Vec<u8>> = trie.prefixes_of("/b").map(|(k, _)| k).collect();
        assert_eq!(keys, vec![b"/b".to_vec(), b"/".to_vec(), b"".to_vec()]);
    }

    #[test]
    fn test_prefixes_of_from_a_later_subtree() {
        let trie: Trie = vec![("/a/", 1), ("/a/b/z", 2)].into_iter().collect();
        // the greatest key at most "/a/c" is "/a/b/z", which is not a prefix
        let found: Vec<Payload> = trie.prefixes_of("/a/c").map(|(_, v)| v).collect();
        assert_eq!(found, vec![1]);
        assert_eq!(trie.prefixes_of("/b").count(), 0);
    }
}
