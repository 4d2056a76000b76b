//! # prefixtree
//!
//! Ordered dictionary and set types keyed on bytes or text, stored in a
//! radix-256 trie.
//!
//! Keys come back in lexicographic byte order, which makes prefix queries,
//! bounded range scans and longest-common-prefix lookups cheap. Text keys are
//! stored as UTF-8 and handed back as text; byte keys stay bytes.
//!
//! ## Example
//!
//! ```rust
//! use prefixtree::{Direction, PrefixDict};
//!
//! let mut dict = PrefixDict::new();
//! dict.insert("dog", 4);
//! dict.insert("dogma", 5);
//! dict.insert("tudo", 7);
//!
//! let dogs: Vec<_> = dict.starts_with("dog", Direction::Forward).collect();
//! assert_eq!(dogs, vec!["dog", "dogma"]);
//! assert_eq!(dict.common_prefix("dogfood"), "dog");
//! ```

mod dict;
mod error;
mod key;
mod node;
mod pretty;
mod set;
mod slice;
mod trie;
mod walk;

pub use dict::PrefixDict;
pub use error::{Error, Result};
pub use key::{Key, KeyKind, TrieKey};
pub use node::{Edges, Node, Terminal};
pub use pretty::Pretty;
pub use set::PrefixSet;
pub use slice::Slice;
pub use trie::Trie;
pub use walk::{Entries, Keys, Limit, Values, Walk, WalkBounds};

/// Order in which a traversal visits keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
  /// Ascending byte order.
  #[default]
  Forward,
  /// Descending byte order.
  Reverse,
}

impl Direction {
  pub fn is_reverse(self) -> bool {
    self == Direction::Reverse
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrieStats {
  pub nodes: usize,
  pub keys: usize,
  pub tombstones: usize,
  pub max_depth: usize,
}
