//! The main trie implementation.
//!
//! This module contains the `Trie` type, which owns the node arena and provides
//! exact lookup, insertion and removal.

use std::fmt;
use std::iter::FromIterator;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::config::TrieConfig;
use crate::cursor::Cursor;
use crate::node::{NodeId, TrieNode};
use crate::prefix_view::{PrefixIter, PrefixView, PrefixesOf};
use crate::util::{has_prefix, prefix_match};
use crate::{Payload, Result};

static NEXT_TRIE_ID: AtomicU64 = AtomicU64::new(1);

fn next_trie_id() -> u64 {
    NEXT_TRIE_ID.fetch_add(1, Ordering::Relaxed)
}

/// A mutable, path-compressed radix trie mapping byte keys to payloads.
///
/// Keys are ordered byte-lexicographically; a key sorts before every key it is
/// a strict prefix of. Every node is either terminal (some key ends there) or
/// has at least two children, so the number of nodes is bounded by twice the
/// number of keys regardless of how long the keys are.
///
/// Structural changes bump a generation counter. [`Cursor`]s remember the
/// generation they were positioned against and refuse to step through a trie
/// that has changed shape since.
pub struct Trie {
    /// Node arena; slots on the free list hold empty nodes
    pub(crate) nodes: Vec<TrieNode>,

    free: Vec<NodeId>,

    /// The root node of the trie, absent when the trie is empty
    pub(crate) root: Option<NodeId>,

    /// The number of keys stored in the trie
    size: usize,

    pub(crate) id: u64,
    pub(crate) generation: u64,

    config: TrieConfig,
}

/// Shape statistics of a trie, see [`Trie::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrieStats {
    /// Number of keys stored
    pub keys: usize,
    /// Number of live nodes
    pub nodes: usize,
    /// Number of parent-to-child edges
    pub edges: usize,
    /// Total bytes held in compressed runs
    pub fragment_bytes: usize,
    /// Arena slots waiting for reuse
    pub free_slots: usize,
}

impl Trie {
    /// Creates a new, empty trie.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_index::Trie;
    ///
    /// let trie = Trie::new();
    /// assert!(trie.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_config(TrieConfig::default())
    }

    /// Creates a new, empty trie with the given configuration.
    pub fn with_config(config: TrieConfig) -> Self {
        let id = next_trie_id();
        debug!(trie = id, ?config, "creating trie");
        Trie {
            nodes: Vec::with_capacity(config.initial_capacity),
            free: Vec::new(),
            root: None,
            size: 0,
            id,
            generation: 0,
            config,
        }
    }

    pub fn config(&self) -> &TrieConfig {
        &self.config
    }

    /// Returns the number of keys stored in the trie.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the trie contains no keys.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Walks every live node and reports the shape of the trie.
    pub fn stats(&self) -> TrieStats {
        let mut stats = TrieStats {
            free_slots: self.free.len(),
            ..TrieStats::default()
        };
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            stats.nodes += 1;
            stats.edges += node.children.len();
            stats.fragment_bytes += node.key_fragment.len();
            if node.is_terminal() {
                stats.keys += 1;
            }
            stack.extend(node.children.iter().map(|&(_, child)| child));
        }
        stats
    }

    /// Removes every key and releases all nodes.
    ///
    /// Outstanding cursors positioned on a key become stale.
    pub fn clear(&mut self) {
        debug!(trie = self.id, keys = self.size, "clearing trie");
        self.nodes = Vec::new();
        self.free = Vec::new();
        self.root = None;
        self.size = 0;
        self.bump();
    }

    /// Creates a cursor bound to this trie, positioned before the first key.
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self)
    }

    /// Iterates over every key and payload in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_index::Trie;
    ///
    /// let trie: Trie = vec![("b", 2), ("a", 1), ("ab", 3)].into_iter().collect();
    /// let keys: Vec<Vec<u8>> = trie.iter().map(|(k, _)| k).collect();
    /// assert_eq!(keys, vec![b"a".to_vec(), b"ab".to_vec(), b"b".to_vec()]);
    /// ```
    pub fn iter(&self) -> PrefixIter<'_> {
        PrefixIter::new(self, Vec::new())
    }

    /// Creates a view of the keys that start with `prefix`.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_index::Trie;
    ///
    /// let mut trie = Trie::new();
    /// trie.insert("hello", 1)?;
    /// trie.insert("help", 2)?;
    /// trie.insert("world", 3)?;
    ///
    /// let view = trie.view_subtrie("hel");
    /// assert_eq!(view.len(), 2);
    /// assert_eq!(view.get("help"), Some(2));
    /// assert_eq!(view.get("world"), None);
    /// # Ok::<(), radix_index::Error>(())
    /// ```
    pub fn view_subtrie<K: AsRef<[u8]>>(&self, prefix: K) -> PrefixView<'_> {
        PrefixView::new(self, prefix.as_ref().to_vec())
    }

    /// Iterates over the stored keys that are prefixes of `path`, longest first.
    pub fn prefixes_of<K: AsRef<[u8]>>(&self, path: K) -> PrefixesOf<'_> {
        PrefixesOf::new(self, path.as_ref().to_vec())
    }

    /// Returns the longest stored key that is a prefix of `path`, with its payload.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_index::Trie;
    ///
    /// let mut trie = Trie::new();
    /// trie.insert("/static/", 7)?;
    /// assert_eq!(
    ///     trie.longest_prefix_of(b"/static/img/logo.png"),
    ///     Some((&b"/static/"[..], 7))
    /// );
    /// assert_eq!(trie.longest_prefix_of(b"/api"), None);
    /// # Ok::<(), radix_index::Error>(())
    /// ```
    pub fn longest_prefix_of<'p>(&self, path: &'p [u8]) -> Option<(&'p [u8], Payload)> {
        let mut best = None;
        let mut id = self.root?;
        let mut depth = 0;
        loop {
            let node = self.node(id);
            if !has_prefix(&path[depth..], &node.key_fragment) {
                return best;
            }
            depth += node.key_fragment.len();
            if let Some(payload) = node.payload {
                best = Some((&path[..depth], payload));
            }
            match path.get(depth).and_then(|&byte| node.child(byte)) {
                Some(child) => {
                    id = child;
                    depth += 1;
                }
                None => return best,
            }
        }
    }

    /// Retrieves the payload stored for exactly `key`, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_index::Trie;
    ///
    /// let mut trie = Trie::new();
    /// trie.insert("hello", 0)?;
    ///
    /// assert_eq!(trie.get("hello"), Some(0));
    /// assert_eq!(trie.get("hell"), None);
    /// # Ok::<(), radix_index::Error>(())
    /// ```
    pub fn get<K: AsRef<[u8]>>(&self, key: K) -> Option<Payload> {
        self.find_node(key.as_ref())
            .and_then(|id| self.node(id).payload)
    }

    /// Returns `true` if the trie contains `key`.
    pub fn contains_key<K: AsRef<[u8]>>(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Inserts a key and payload.
    ///
    /// Returns `Ok(None)` for a new key and `Ok(Some(previous))` when an
    /// existing payload was replaced. Keys rejected by the trie's
    /// [`TrieConfig`] leave the trie untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_index::Trie;
    ///
    /// let mut trie = Trie::new();
    /// assert_eq!(trie.insert("key", 1)?, None);
    /// assert_eq!(trie.insert("key", 2)?, Some(1));
    /// assert_eq!(trie.get("key"), Some(2));
    /// # Ok::<(), radix_index::Error>(())
    /// ```
    pub fn insert<K: AsRef<[u8]>>(&mut self, key: K, payload: Payload) -> Result<Option<Payload>> {
        let key = key.as_ref();
        self.config.admit(key)?;
        Ok(self.insert_admitted(key, payload))
    }

    fn insert_admitted(&mut self, key: &[u8], payload: Payload) -> Option<Payload> {
        let mut id = match self.root {
            Some(root) => root,
            None => {
                let root = self.alloc(TrieNode::leaf(key.to_vec(), payload));
                self.root = Some(root);
                self.key_added();
                return None;
            }
        };

        let mut depth = 0;
        loop {
            let fragment = &self.node(id).key_fragment;
            let fragment_len = fragment.len();
            let common = prefix_match(key, depth, fragment);

            if common < fragment_len {
                // The key leaves this node's run part-way: cut the run so the
                // divergence point becomes a node of its own.
                self.split(id, common);
                depth += common;
                if depth == key.len() {
                    self.nodes[id.index()].payload = Some(payload);
                } else {
                    let leaf = self.alloc(TrieNode::leaf(key[depth + 1..].to_vec(), payload));
                    self.nodes[id.index()].add_child(key[depth], leaf);
                }
                self.key_added();
                return None;
            }

            depth += fragment_len;
            if depth == key.len() {
                let previous = self.nodes[id.index()].payload.replace(payload);
                if previous.is_none() {
                    self.key_added();
                }
                return previous;
            }

            let byte = key[depth];
            match self.node(id).child(byte) {
                Some(child) => {
                    id = child;
                    depth += 1;
                }
                None => {
                    let leaf = self.alloc(TrieNode::leaf(key[depth + 1..].to_vec(), payload));
                    self.nodes[id.index()].add_child(byte, leaf);
                    self.key_added();
                    return None;
                }
            }
        }
    }

    /// Removes `key`, returning its payload if it was present.
    ///
    /// Nodes left without a purpose are unlinked or merged with their single
    /// child so the trie stays maximally compressed.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_index::Trie;
    ///
    /// let mut trie = Trie::new();
    /// trie.insert("hello", 1)?;
    /// trie.insert("help", 2)?;
    ///
    /// assert_eq!(trie.remove("help"), Some(2));
    /// assert_eq!(trie.remove("help"), None);
    /// assert_eq!(trie.node_count(), 1);
    /// # Ok::<(), radix_index::Error>(())
    /// ```
    pub fn remove<K: AsRef<[u8]>>(&mut self, key: K) -> Option<Payload> {
        let key = key.as_ref();

        let mut id = self.root?;
        let mut parent: Option<(NodeId, u8)> = None;
        let mut depth = 0;
        loop {
            let node = self.node(id);
            if !has_prefix(&key[depth..], &node.key_fragment) {
                return None;
            }
            depth += node.key_fragment.len();
            if depth == key.len() {
                break;
            }
            let byte = key[depth];
            let child = node.child(byte)?;
            parent = Some((id, byte));
            id = child;
            depth += 1;
        }

        let removed = self.nodes[id.index()].payload.take()?;
        self.size -= 1;
        self.bump();

        match self.node(id).children.len() {
            0 => {
                trace!(trie = self.id, node = id.index(), "unlinking leaf");
                self.release(id);
                match parent {
                    Some((parent_id, byte)) => {
                        self.nodes[parent_id.index()].remove_child(byte);
                        self.compress(parent_id);
                    }
                    None => self.root = None,
                }
            }
            1 => self.compress(id),
            _ => {}
        }

        Some(removed)
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id.index()]
    }

    fn find_node(&self, key: &[u8]) -> Option<NodeId> {
        let mut id = self.root?;
        let mut remaining = key;
        loop {
            let node = self.node(id);
            if !has_prefix(remaining, &node.key_fragment) {
                return None;
            }
            remaining = &remaining[node.key_fragment.len()..];
            match remaining.split_first() {
                None => return Some(id),
                Some((&byte, rest)) => {
                    id = node.child(byte)?;
                    remaining = rest;
                }
            }
        }
    }

    /// Cuts the run of `id` after `at` bytes. The node keeps the head of the
    /// run; its payload and children move to a new child holding the tail.
    fn split(&mut self, id: NodeId, at: usize) {
        let node = &mut self.nodes[id.index()];
        debug_assert!(at < node.key_fragment.len());
        let tail = node.key_fragment.split_off(at);
        let lower = TrieNode {
            key_fragment: tail[1..].to_vec(),
            payload: node.payload.take(),
            children: std::mem::take(&mut node.children),
        };
        let lower_id = self.alloc(lower);
        self.nodes[id.index()].add_child(tail[0], lower_id);
        trace!(trie = self.id, node = id.index(), at, "split node");
    }

    /// Merges `id` with its only child if `id` no longer ends a key.
    fn compress(&mut self, id: NodeId) {
        let node = self.node(id);
        if node.is_terminal() || node.children.len() != 1 {
            return;
        }
        let (byte, child_id) = node.children[0];
        let child = std::mem::take(&mut self.nodes[child_id.index()]);
        self.free.push(child_id);

        let node = &mut self.nodes[id.index()];
        node.key_fragment.push(byte);
        node.key_fragment.extend_from_slice(&child.key_fragment);
        node.payload = child.payload;
        node.children = child.children;
        trace!(
            trie = self.id,
            node = id.index(),
            absorbed = child_id.index(),
            "merged node with its only child"
        );
    }

    fn alloc(&mut self, node: TrieNode) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.index()] = node;
                id
            }
            None => {
                self.nodes.push(node);
                NodeId::new(self.nodes.len() - 1)
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        self.nodes[id.index()] = TrieNode::default();
        self.free.push(id);
    }

    fn key_added(&mut self) {
        self.size += 1;
        self.bump();
    }

    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Trie {
    /// The clone is a distinct trie: cursors created for `self` do not apply to it.
    fn clone(&self) -> Self {
        Trie {
            nodes: self.nodes.clone(),
            free: self.free.clone(),
            root: self.root,
            size: self.size,
            id: next_trie_id(),
            generation: 0,
            config: self.config.clone(),
        }
    }
}

impl fmt::Debug for Trie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.iter()
                    .map(|(key, payload)| (String::from_utf8_lossy(&key).into_owned(), payload)),
            )
            .finish()
    }
}

/// Two tries are equal when they hold the same keys with the same payloads.
impl PartialEq for Trie {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.iter().eq(other.iter())
    }
}

impl Eq for Trie {}

impl<K: AsRef<[u8]>> FromIterator<(K, Payload)> for Trie {
    fn from_iter<I: IntoIterator<Item = (K, Payload)>>(iter: I) -> Self {
        // the default configuration admits every key
        let mut trie = Trie::new();
        for (key, payload) in iter {
            trie.insert_admitted(key.as_ref(), payload);
        }
        trie
    }
}

/// Keys the configuration rejects are skipped.
impl<K: AsRef<[u8]>> Extend<(K, Payload)> for Trie {
    fn extend<I: IntoIterator<Item = (K, Payload)>>(&mut self, iter: I) {
        for (key, payload) in iter {
            let key = key.as_ref();
            match self.config.admit(key) {
                Ok(()) => {
                    self.insert_admitted(key, payload);
                }
                Err(err) => debug!(trie = self.id, %err, "skipping rejected key"),
            }
        }
    }
}
