use std::{fmt, ops::RangeBounds};

use crate::{
  Direction, TrieStats,
  dict::{limit_of, missing},
  error::Result,
  key::{Key, TrieKey},
  pretty::Pretty,
  slice::Slice,
  trie::Trie,
  walk::{Keys, WalkBounds},
};

/// An ordered set of byte or text keys.
#[derive(Clone, Default)]
pub struct PrefixSet {
  trie: Trie<()>,
}

impl PrefixSet {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.trie.len()
  }

  pub fn is_empty(&self) -> bool {
    self.trie.is_empty()
  }

  pub fn clear(&mut self) {
    self.trie.clear();
  }

  pub fn as_trie(&self) -> &Trie<()> {
    &self.trie
  }

  /// Adds `key`. Returns `true` if it was not already present.
  pub fn insert<K: TrieKey>(&mut self, key: K) -> bool {
    self
      .trie
      .assign(key.key_bytes(), key.key_kind(), ())
      .is_none()
  }

  pub fn contains<K: TrieKey>(&self, key: K) -> bool {
    self.trie.contains(key.key_bytes())
  }

  /// Removes `key`, failing if it is absent.
  pub fn remove<K: TrieKey>(&mut self, key: K) -> Result<()> {
    match self.trie.remove(key.key_bytes()) {
      Some(_) => Ok(()),
      None => Err(missing(&key)),
    }
  }

  /// Removes `key` if present. Returns whether it was.
  pub fn discard<K: TrieKey>(&mut self, key: K) -> bool {
    self.trie.remove(key.key_bytes()).is_some()
  }

  /// The stored form of `key`, if present.
  pub fn get<K: TrieKey>(&self, key: K) -> Option<Key> {
    self.trie.search(key.key_bytes(), true)?.key()
  }

  // --- ORDERED ITERATION ---

  pub fn iter(&self) -> Keys<'_, ()> {
    self.trie.keys(WalkBounds::unbounded(), Direction::Forward)
  }

  pub fn iter_rev(&self) -> Keys<'_, ()> {
    self.trie.keys(WalkBounds::unbounded(), Direction::Reverse)
  }

  pub fn starts_with<K: TrieKey>(&self, prefix: K, direction: Direction) -> Keys<'_, ()> {
    self.trie.startswith(prefix.key_bytes(), direction)
  }

  pub fn common_prefix<K: TrieKey>(&self, key: K) -> Key {
    self.trie.common_prefix(key.key_bytes())
  }

  pub fn longest_prefix<K: TrieKey>(&self, key: K) -> Option<Key> {
    self.trie.longest_prefix(key.key_bytes())?.key()
  }

  pub fn range<R, K>(&self, range: R) -> Keys<'_, ()>
  where
    R: RangeBounds<K>,
    K: TrieKey + ?Sized,
  {
    let bounds = WalkBounds::new(limit_of(range.start_bound()), limit_of(range.end_bound()));
    self.trie.keys(bounds, Direction::Forward)
  }

  pub fn slice(&self, slice: &Slice) -> Result<Keys<'_, ()>> {
    let (bounds, direction) = slice.resolve()?;
    Ok(self.trie.keys(bounds, direction))
  }

  // --- SET ALGEBRA ---

  pub fn union(&self, other: &PrefixSet) -> PrefixSet {
    self.iter().chain(other.iter()).collect()
  }

  pub fn intersection(&self, other: &PrefixSet) -> PrefixSet {
    self.iter().filter(|k| other.contains(k)).collect()
  }

  pub fn difference(&self, other: &PrefixSet) -> PrefixSet {
    self.iter().filter(|k| !other.contains(k)).collect()
  }

  pub fn symmetric_difference(&self, other: &PrefixSet) -> PrefixSet {
    let mut out = self.difference(other);
    out.extend(other.iter().filter(|k| !self.contains(k)));
    out
  }

  pub fn is_subset(&self, other: &PrefixSet) -> bool {
    self.len() <= other.len() && self.iter().all(|k| other.contains(&k))
  }

  pub fn is_superset(&self, other: &PrefixSet) -> bool {
    other.is_subset(self)
  }

  pub fn is_disjoint(&self, other: &PrefixSet) -> bool {
    let (small, large) = if self.len() <= other.len() {
      (self, other)
    } else {
      (other, self)
    };
    small.iter().all(|k| !large.contains(&k))
  }

  // --- DIAGNOSTICS ---

  pub fn pretty(&self) -> Pretty<'_, ()> {
    Pretty::new(&self.trie)
  }

  pub fn stats(&self) -> TrieStats {
    self.trie.stats()
  }

  pub fn shrink_to_fit(&mut self) -> usize {
    self.trie.shrink_to_fit()
  }
}

// --- RUST TRAITS ---

impl<K: TrieKey> FromIterator<K> for PrefixSet {
  fn from_iter<T: IntoIterator<Item = K>>(iter: T) -> Self {
    let mut set = PrefixSet::new();
    set.extend(iter);
    set
  }
}

impl<K: TrieKey> Extend<K> for PrefixSet {
  fn extend<T: IntoIterator<Item = K>>(&mut self, iter: T) {
    for k in iter {
      self.insert(k);
    }
  }
}

// Keys compare with their representation, so "a" and b"a" differ.
impl PartialEq for PrefixSet {
  fn eq(&self, other: &Self) -> bool {
    self.len() == other.len() && self.iter().eq(other.iter())
  }
}

impl Eq for PrefixSet {}

impl fmt::Debug for PrefixSet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("PrefixSet")?;
    f.debug_set().entries(self.iter()).finish()
  }
}

impl<'a> IntoIterator for &'a PrefixSet {
  type Item = Key;
  type IntoIter = Keys<'a, ()>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

#[cfg(feature = "serde")]
mod set_serde {
  use super::*;
  use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{SeqAccess, Visitor},
  };

  impl Serialize for PrefixSet {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
      S: Serializer,
    {
      serializer.collect_seq(self.iter())
    }
  }

  struct SetVisitor;

  impl<'de> Visitor<'de> for SetVisitor {
    type Value = PrefixSet;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
      formatter.write_str("a sequence of keys")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
    where
      A: SeqAccess<'de>,
    {
      let mut set = PrefixSet::new();
      while let Some(key) = seq.next_element::<Key>()? {
        set.insert(key);
      }
      Ok(set)
    }
  }

  impl<'de> Deserialize<'de> for PrefixSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
      D: Deserializer<'de>,
    {
      deserializer.deserialize_seq(SetVisitor)
    }
  }
}
