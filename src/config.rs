//! Construction-time settings for a [`Trie`](crate::Trie).

/// Configuration for a [`Trie`](crate::Trie).
///
/// The defaults accept every key, including the empty one.
///
/// ```rust
/// use radix_index::{Trie, TrieConfig};
///
/// let config = TrieConfig::default()
///     .with_allow_empty_key(false)
///     .with_max_key_len(Some(1024));
/// let mut trie = Trie::with_config(config);
///
/// assert!(trie.insert("", 1).is_err());
/// assert!(trie.insert("/index", 1).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrieConfig {
    /// Whether the zero-length key may be inserted
    pub allow_empty_key: bool,
    /// Upper bound on inserted key length, if any
    pub max_key_len: Option<usize>,
    /// Number of node slots to reserve up front
    pub initial_capacity: usize,
}

impl Default for TrieConfig {
    fn default() -> Self {
        Self {
            allow_empty_key: true,
            max_key_len: None,
            initial_capacity: 0,
        }
    }
}

impl TrieConfig {
    pub fn with_allow_empty_key(mut self, allow: bool) -> Self {
        self.allow_empty_key = allow;
        self
    }

    pub fn with_max_key_len(mut self, max: Option<usize>) -> Self {
        self.max_key_len = max;
        self
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Checks `key` against the admission policy.
    pub(crate) fn admit(&self, key: &[u8]) -> crate::Result<()> {
        if key.is_empty() && !self.allow_empty_key {
            return Err(crate::Error::EmptyKey);
        }
        match self.max_key_len {
            Some(max) if key.len() > max => Err(crate::Error::KeyTooLong {
                len: key.len(),
                max,
            }),
            _ => Ok(()),
        }
    }
}
