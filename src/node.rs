//! Internal node implementation for the radix trie.
//!
//! Nodes live in an arena owned by the `Trie` and refer to each other by
//! [`NodeId`]. A node holds the compressed run of bytes that follows the edge
//! leading into it, an optional payload, and a sorted list of outgoing edges.

use smallvec::SmallVec;

use crate::Payload;

/// Index of a node slot in the trie arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize);
        NodeId(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Outgoing edges of a node, sorted by edge byte.
pub(crate) type Edges = SmallVec<[(u8, NodeId); 4]>;

/// A single node of the trie.
///
/// The key of a node is its parent's key, then the edge byte, then
/// `key_fragment`. The root has no edge byte.
#[derive(Debug, Clone, Default)]
pub(crate) struct TrieNode {
    /// The compressed run of bytes stored at this node
    pub key_fragment: Vec<u8>,

    /// Payload of the key ending here; `None` for pure branching nodes
    pub payload: Option<Payload>,

    /// Child nodes, strictly increasing by edge byte
    pub children: Edges,
}

impl TrieNode {
    /// Creates a terminal node with no children.
    pub fn leaf(key_fragment: Vec<u8>, payload: Payload) -> Self {
        TrieNode {
            key_fragment,
            payload: Some(payload),
            children: Edges::new(),
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.payload.is_some()
    }

    /// Returns whether this node is a leaf node (has no children)
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Locates the edge for `byte`: `Ok(pos)` if present, otherwise the
    /// position where it would be inserted.
    #[inline]
    pub fn edge_position(&self, byte: u8) -> Result<usize, usize> {
        self.children.binary_search_by_key(&byte, |&(b, _)| b)
    }

    pub fn child(&self, byte: u8) -> Option<NodeId> {
        self.edge_position(byte).ok().map(|pos| self.children[pos].1)
    }

    /// Adds an edge, keeping the edge list sorted. The byte must not be present.
    pub fn add_child(&mut self, byte: u8, child: NodeId) {
        match self.edge_position(byte) {
            Ok(pos) => {
                debug_assert!(false, "duplicate edge byte {:#04x}", byte);
                self.children[pos].1 = child;
            }
            Err(pos) => self.children.insert(pos, (byte, child)),
        }
    }

    pub fn remove_child(&mut self, byte: u8) -> Option<NodeId> {
        self.edge_position(byte)
            .ok()
            .map(|pos| self.children.remove(pos).1)
    }

    /// Nearest edge strictly after `byte`.
    pub fn child_after(&self, byte: u8) -> Option<(u8, NodeId)> {
        let pos = match self.edge_position(byte) {
            Ok(pos) => pos + 1,
            Err(pos) => pos,
        };
        self.children.get(pos).copied()
    }

    /// Nearest edge strictly before `byte`.
    pub fn child_before(&self, byte: u8) -> Option<(u8, NodeId)> {
        let pos = match self.edge_position(byte) {
            Ok(pos) | Err(pos) => pos,
        };
        pos.checked_sub(1).map(|p| self.children[p])
    }

    pub fn first_child(&self) -> Option<(u8, NodeId)> {
        self.children.first().copied()
    }

    pub fn last_child(&self) -> Option<(u8, NodeId)> {
        self.children.last().copied()
    }
}
