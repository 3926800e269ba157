//! Stateful traversal over a [`Trie`].
//!
//! A [`Cursor`] keeps the path from the root to its current node as a stack of
//! frames together with the reconstructed key of that node. It does not borrow
//! the trie: every operation takes the trie it was created for, and the cursor
//! checks that the trie has not changed shape since it was last positioned.
//!
//! Stepping is scoped. The caller passes the same reference prefix on every
//! step, and the three step operations treat keys outside it differently:
//!
//! - [`Cursor::next`] stops at the first successor outside the scope and
//!   reports nothing, which is how callers test whether the scan is still
//!   inside its range;
//! - [`Cursor::prev`] skips predecessors outside the scope until it finds one
//!   inside it;
//! - [`Cursor::up`] skips ancestors that end no key or fall outside the scope.
//!
//! ```rust
//! use radix_index::Trie;
//!
//! let mut trie = Trie::new();
//! for (key, payload) in &[("a", 1), ("ab", 2), ("ac", 3), ("b", 4)] {
//!     trie.insert(key, *payload)?;
//! }
//!
//! let mut cursor = trie.cursor();
//! assert_eq!(cursor.seek_at_most(&trie, "ab")?, Some(2));
//! assert_eq!(cursor.next(&trie, "a")?, Some(3));
//! // "b" is outside the scope: next stops there
//! assert_eq!(cursor.next(&trie, "a")?, None);
//! // prev from "b" finds "ac" again
//! assert_eq!(cursor.prev(&trie, "a")?, Some(3));
//! cursor.stop();
//! # Ok::<(), radix_index::Error>(())
//! ```

use tracing::debug;

use crate::node::NodeId;
use crate::trie::Trie;
use crate::util::{has_prefix, prefix_match};
use crate::{Error, Payload, Result};

/// Where a cursor currently rests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Before the smallest key; `next` moves to the first key
    BeforeFirst,
    /// On a stored key
    At,
    /// After the largest key; `prev` moves to the last key
    AfterLast,
}

/// Comparison used by [`Cursor::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOp {
    /// Greatest key strictly below the reference
    Less,
    /// Greatest key at most the reference
    AtMost,
    /// Exactly the reference
    Equal,
    /// Smallest key at least the reference
    AtLeast,
    /// Smallest key strictly above the reference
    Greater,
}

/// Which keys a step operation considers in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    /// Every key
    All,
    /// Keys that start with the given prefix
    Under(&'a [u8]),
    /// Keys that are themselves a prefix of the given path
    PrefixOf(&'a [u8]),
}

impl Scope<'_> {
    /// Returns `true` if `key` lies inside this scope.
    pub fn admits(&self, key: &[u8]) -> bool {
        match *self {
            Scope::All => true,
            Scope::Under(prefix) => has_prefix(key, prefix),
            Scope::PrefixOf(path) => has_prefix(path, key),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: NodeId,
    /// Length of the node's full key
    depth: usize,
}

/// A traversal position inside one [`Trie`].
///
/// Cursors are created with [`Trie::cursor`] (or [`Cursor::new`]) and start
/// before the first key. A cursor positioned on a key becomes stale once the
/// trie gains or loses a key; it must then be re-seeked. After [`stop`] the
/// cursor rejects every operation except `stop` itself.
///
/// [`stop`]: Cursor::stop
#[derive(Debug, Clone)]
pub struct Cursor {
    trie_id: u64,
    generation: u64,
    frames: Vec<Frame>,
    key: Vec<u8>,
    position: Position,
    stopped: bool,
}

impl Cursor {
    /// Creates a cursor for `trie`, positioned before the first key.
    pub fn new(trie: &Trie) -> Self {
        Cursor {
            trie_id: trie.id,
            generation: trie.generation,
            frames: Vec::new(),
            key: Vec::new(),
            position: Position::BeforeFirst,
            stopped: false,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// The key the cursor rests on, if it rests on one.
    pub fn key(&self) -> Option<&[u8]> {
        match self.position {
            Position::At if !self.stopped => Some(&self.key),
            _ => None,
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Returns the payload of the key the cursor rests on.
    pub fn payload(&self, trie: &Trie) -> Result<Option<Payload>> {
        self.check_fresh(trie)?;
        Ok(self.current_payload(trie))
    }

    /// Positions the cursor at the greatest key that is at most `key`.
    ///
    /// If every stored key is greater, the cursor rests before the first key.
    /// Returns the payload at the new position.
    ///
    /// # Examples
    ///
    /// ```
    /// use radix_index::{Position, Trie};
    ///
    /// let mut trie = Trie::new();
    /// trie.insert("b", 1)?;
    /// trie.insert("d", 2)?;
    ///
    /// let mut cursor = trie.cursor();
    /// assert_eq!(cursor.seek_at_most(&trie, "c")?, Some(1));
    /// assert_eq!(cursor.key(), Some(&b"b"[..]));
    ///
    /// assert_eq!(cursor.seek_at_most(&trie, "a")?, None);
    /// assert_eq!(cursor.position(), Position::BeforeFirst);
    /// # Ok::<(), radix_index::Error>(())
    /// ```
    pub fn seek_at_most<K: AsRef<[u8]>>(&mut self, trie: &Trie, key: K) -> Result<Option<Payload>> {
        self.seek(trie, SeekOp::AtMost, key)
    }

    /// Positions the cursor according to `op` relative to `key`.
    ///
    /// Returns the payload at the new position. For [`SeekOp::Equal`] a miss
    /// returns `None` and leaves the cursor where [`SeekOp::AtMost`] would.
    pub fn seek<K: AsRef<[u8]>>(&mut self, trie: &Trie, op: SeekOp, key: K) -> Result<Option<Payload>> {
        let key = key.as_ref();
        self.check_handle(trie)?;
        self.generation = trie.generation;
        self.locate_at_most(trie, key);

        let exact = self.position == Position::At && self.key == key;
        match op {
            SeekOp::AtMost => {}
            SeekOp::Equal if !exact => return Ok(None),
            SeekOp::Equal => {}
            SeekOp::Less => {
                if exact {
                    self.retreat(trie);
                }
            }
            SeekOp::AtLeast => {
                if !exact {
                    self.advance(trie);
                }
            }
            SeekOp::Greater => {
                self.advance(trie);
            }
        }
        Ok(self.current_payload(trie))
    }

    /// Positions the cursor before the first key.
    pub fn seek_before_first(&mut self, trie: &Trie) -> Result<()> {
        self.check_handle(trie)?;
        self.generation = trie.generation;
        self.reset(Position::BeforeFirst);
        Ok(())
    }

    /// Positions the cursor after the last key.
    pub fn seek_after_last(&mut self, trie: &Trie) -> Result<()> {
        self.check_handle(trie)?;
        self.generation = trie.generation;
        self.reset(Position::AfterLast);
        Ok(())
    }

    /// Moves to the successor of the current key.
    ///
    /// Returns its payload if the successor starts with `prefix`. If it does
    /// not, the cursor still moves onto it but `None` is reported; there is no
    /// search for a later key that matches. With no successor the cursor rests
    /// after the last key.
    pub fn next<K: AsRef<[u8]>>(&mut self, trie: &Trie, prefix: K) -> Result<Option<Payload>> {
        self.next_in(trie, Scope::Under(prefix.as_ref()))
    }

    /// Moves to the nearest predecessor that starts with `prefix`, skipping
    /// any that do not. With none left the cursor rests before the first key.
    pub fn prev<K: AsRef<[u8]>>(&mut self, trie: &Trie, prefix: K) -> Result<Option<Payload>> {
        self.prev_in(trie, Scope::Under(prefix.as_ref()))
    }

    /// Moves to the nearest ancestor that ends a key starting with `prefix`.
    ///
    /// Ancestors are the nodes on the path from the root to the current key,
    /// so every candidate is a proper prefix of the current key. When the
    /// root has been passed the cursor rests before the first key.
    pub fn up<K: AsRef<[u8]>>(&mut self, trie: &Trie, prefix: K) -> Result<Option<Payload>> {
        self.up_in(trie, Scope::Under(prefix.as_ref()))
    }

    /// [`next`](Cursor::next) with an arbitrary scope.
    pub fn next_in(&mut self, trie: &Trie, scope: Scope<'_>) -> Result<Option<Payload>> {
        self.check_fresh(trie)?;
        self.generation = trie.generation;
        if !self.advance(trie) {
            return Ok(None);
        }
        if scope.admits(&self.key) {
            Ok(self.current_payload(trie))
        } else {
            Ok(None)
        }
    }

    /// [`prev`](Cursor::prev) with an arbitrary scope.
    pub fn prev_in(&mut self, trie: &Trie, scope: Scope<'_>) -> Result<Option<Payload>> {
        self.check_fresh(trie)?;
        self.generation = trie.generation;
        while self.retreat(trie) {
            if scope.admits(&self.key) {
                return Ok(self.current_payload(trie));
            }
        }
        Ok(None)
    }

    /// [`up`](Cursor::up) with an arbitrary scope.
    ///
    /// With [`Scope::PrefixOf`] this walks the stored keys that prefix a path,
    /// which is how [`Trie::prefixes_of`] is built.
    pub fn up_in(&mut self, trie: &Trie, scope: Scope<'_>) -> Result<Option<Payload>> {
        self.check_fresh(trie)?;
        if self.position != Position::At {
            return Ok(None);
        }
        loop {
            self.pop();
            let top = match self.frames.last() {
                Some(frame) => frame.node,
                None => {
                    self.reset(Position::BeforeFirst);
                    return Ok(None);
                }
            };
            let node = trie.node(top);
            if node.is_terminal() && scope.admits(&self.key) {
                return Ok(node.payload);
            }
        }
    }

    /// Releases the cursor's path. Stopping twice is a no-op.
    pub fn stop(&mut self) {
        self.frames = Vec::new();
        self.key = Vec::new();
        self.position = Position::BeforeFirst;
        self.stopped = true;
    }

    fn check_handle(&self, trie: &Trie) -> Result<()> {
        if self.stopped {
            return Err(Error::CursorStopped);
        }
        if self.trie_id != trie.id {
            return Err(Error::ForeignTrie);
        }
        Ok(())
    }

    /// A cursor resting on a key holds node ids, which are only meaningful at
    /// the generation they were read at.
    fn check_fresh(&self, trie: &Trie) -> Result<()> {
        self.check_handle(trie)?;
        if self.position == Position::At && self.generation != trie.generation {
            debug!(
                trie = trie.id,
                cursor = self.generation,
                current = trie.generation,
                "rejecting stale cursor"
            );
            return Err(Error::StaleCursor {
                cursor: self.generation,
                trie: trie.generation,
            });
        }
        Ok(())
    }

    fn current_payload(&self, trie: &Trie) -> Option<Payload> {
        match (self.position, self.frames.last()) {
            (Position::At, Some(frame)) => trie.node(frame.node).payload,
            _ => None,
        }
    }

    fn reset(&mut self, position: Position) {
        self.frames.clear();
        self.key.clear();
        self.position = position;
    }

    fn push(&mut self, trie: &Trie, edge: Option<u8>, id: NodeId) {
        if let Some(byte) = edge {
            self.key.push(byte);
        }
        self.key.extend_from_slice(&trie.node(id).key_fragment);
        self.frames.push(Frame {
            node: id,
            depth: self.key.len(),
        });
    }

    /// Drops the top frame and returns the edge byte that led into it, or
    /// `None` if it was the root. Popping the root leaves `key` untouched, so
    /// callers reset the cursor in that case.
    fn pop(&mut self) -> Option<u8> {
        self.frames.pop()?;
        let parent_depth = self.frames.last()?.depth;
        let edge = self.key[parent_depth];
        self.key.truncate(parent_depth);
        Some(edge)
    }

    fn top(&self) -> Option<NodeId> {
        self.frames.last().map(|frame| frame.node)
    }

    /// Descends from the top frame to the first key in its subtree.
    fn descend_first(&mut self, trie: &Trie) {
        while let Some(id) = self.top() {
            let node = trie.node(id);
            if node.is_terminal() {
                break;
            }
            match node.first_child() {
                Some((byte, child)) => self.push(trie, Some(byte), child),
                None => break,
            }
        }
        self.position = Position::At;
    }

    /// Descends from the top frame to the last key in its subtree.
    fn descend_last(&mut self, trie: &Trie) {
        while let Some((byte, child)) = self.top().and_then(|id| trie.node(id).last_child()) {
            self.push(trie, Some(byte), child);
        }
        self.position = Position::At;
    }

    /// Moves to the successor, returning `false` when there is none.
    fn advance(&mut self, trie: &Trie) -> bool {
        match self.position {
            Position::AfterLast => return false,
            Position::BeforeFirst => {
                self.reset(Position::AfterLast);
                return match trie.root {
                    Some(root) => {
                        self.push(trie, None, root);
                        self.descend_first(trie);
                        true
                    }
                    None => false,
                };
            }
            Position::At => {}
        }

        if let Some((byte, child)) = self.top().and_then(|id| trie.node(id).first_child()) {
            self.push(trie, Some(byte), child);
            self.descend_first(trie);
            return true;
        }

        loop {
            let edge = match self.pop() {
                Some(edge) => edge,
                None => {
                    self.reset(Position::AfterLast);
                    return false;
                }
            };
            let sibling = self.top().and_then(|parent| trie.node(parent).child_after(edge));
            if let Some((byte, child)) = sibling {
                self.push(trie, Some(byte), child);
                self.descend_first(trie);
                return true;
            }
        }
    }

    /// Moves to the predecessor, returning `false` when there is none.
    fn retreat(&mut self, trie: &Trie) -> bool {
        match self.position {
            Position::BeforeFirst => false,
            Position::AfterLast => {
                self.reset(Position::BeforeFirst);
                match trie.root {
                    Some(root) => {
                        self.push(trie, None, root);
                        self.descend_last(trie);
                        true
                    }
                    None => false,
                }
            }
            Position::At => self.retreat_from_top(trie),
        }
    }

    /// Moves to the greatest key below every key in the top frame's subtree.
    fn retreat_from_top(&mut self, trie: &Trie) -> bool {
        loop {
            let edge = match self.pop() {
                Some(edge) => edge,
                None => {
                    self.reset(Position::BeforeFirst);
                    return false;
                }
            };
            let parent = match self.top() {
                Some(parent) => trie.node(parent),
                None => {
                    self.reset(Position::BeforeFirst);
                    return false;
                }
            };
            if let Some((byte, sibling)) = parent.child_before(edge) {
                self.push(trie, Some(byte), sibling);
                self.descend_last(trie);
                return true;
            }
            if parent.is_terminal() {
                self.position = Position::At;
                return true;
            }
        }
    }

    /// Builds the path to the greatest key at most `key`.
    fn locate_at_most(&mut self, trie: &Trie, key: &[u8]) {
        self.reset(Position::BeforeFirst);
        let mut id = match trie.root {
            Some(root) => root,
            None => return,
        };
        let mut edge = None;
        loop {
            self.push(trie, edge, id);
            let node = trie.node(id);
            let depth = self.key.len();
            let start = depth - node.key_fragment.len();
            let common = prefix_match(key, start, &node.key_fragment);

            if common < node.key_fragment.len() {
                // The run diverges from `key` (or outlasts it): the whole
                // subtree sits on one side of `key`.
                let below = key
                    .get(start + common)
                    .map_or(false, |&byte| node.key_fragment[common] < byte);
                if below {
                    self.descend_last(trie);
                } else {
                    self.retreat_from_top(trie);
                }
                return;
            }

            if depth == key.len() {
                if node.is_terminal() {
                    self.position = Position::At;
                } else {
                    self.retreat_from_top(trie);
                }
                return;
            }

            let byte = key[depth];
            if let Some(child) = node.child(byte) {
                edge = Some(byte);
                id = child;
                continue;
            }
            if let Some((lower, sibling)) = node.child_before(byte) {
                self.push(trie, Some(lower), sibling);
                self.descend_last(trie);
            } else if node.is_terminal() {
                self.position = Position::At;
            } else {
                self.retreat_from_top(trie);
            }
            return;
        }
    }
}
