//! # Radix Index
//!
//! An ordered index from byte-string keys to integer payloads, built on a
//! path-compressed radix trie (also known as a patricia trie).
//!
//! Nodes live in an arena and are addressed by index. Traversal happens
//! through detached [`Cursor`]s that support ordered successor/predecessor
//! movement, ancestor walks and prefix-bounded scans.
//!
//! ## Features
//!
//! - **Exact lookup, insert and remove** in O(key length)
//! - **Maximal path compression**: chains of single-child nodes are merged on
//!   every removal
//! - **Cursors**: seek to the greatest key at most a reference, then step
//!   forward, backward or up the hierarchy within a prefix scope
//! - **Prefix views**: iterate the keys below a prefix, or the stored keys that
//!   are prefixes of a path
//!
//! ## Example
//!
//! ```rust
//! use radix_index::Trie;
//!
//! let mut trie = Trie::new();
//! trie.insert("/api/", 1)?;
//! trie.insert("/api/users/", 2)?;
//! trie.insert("/static/", 3)?;
//!
//! assert_eq!(trie.get("/api/"), Some(1));
//! assert_eq!(trie.get("/api"), None);
//!
//! // Every stored key that prefixes the path, most specific first
//! let matches: Vec<i64> = trie.prefixes_of("/api/users/42").map(|(_, v)| v).collect();
//! assert_eq!(matches, vec![2, 1]);
//! # Ok::<(), radix_index::Error>(())
//! ```

mod config;
pub mod cursor;
mod node;
mod prefix_view;
mod trie;
mod util;

// Re-export public types
pub use crate::config::TrieConfig;
pub use crate::cursor::{Cursor, Position, Scope, SeekOp};
pub use crate::prefix_view::{PrefixIter, PrefixView, PrefixesOf};
pub use crate::trie::{Trie, TrieStats};

/// Payload stored against each key.
pub type Payload = i64;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of [`Error`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The cursor cannot be used with this trie in its current state.
    /// This is a programming error and is never retried.
    InvalidHandle,
    /// The key was rejected; no mutation was performed.
    InvalidArgument,
}

/// Errors that can occur in trie and cursor operations.
///
/// Absence of a key is not an error: lookups and cursor steps report it as
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The empty key was inserted into a trie configured to refuse it
    #[error("empty key is not allowed by this trie's configuration")]
    EmptyKey,

    /// The key exceeds the configured maximum length
    #[error("key of {len} bytes exceeds the configured maximum of {max}")]
    KeyTooLong { len: usize, max: usize },

    /// The cursor was stopped and must not be reused
    #[error("cursor has been stopped")]
    CursorStopped,

    /// The cursor was created for a different trie
    #[error("cursor is bound to a different trie")]
    ForeignTrie,

    /// The trie changed shape after the cursor was positioned
    #[error("cursor is stale: positioned at generation {cursor}, trie is at {trie}")]
    StaleCursor { cursor: u64, trie: u64 },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyKey | Error::KeyTooLong { .. } => ErrorKind::InvalidArgument,
            Error::CursorStopped | Error::ForeignTrie | Error::StaleCursor { .. } => {
                ErrorKind::InvalidHandle
            }
        }
    }
}
