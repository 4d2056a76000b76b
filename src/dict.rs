use std::{
  fmt,
  ops::{Bound, Index, RangeBounds},
};

use crate::{
  Direction, TrieStats,
  error::{Error, Result},
  key::{Key, TrieKey},
  node::Node,
  pretty::Pretty,
  slice::Slice,
  trie::Trie,
  walk::{Entries, Keys, Limit, Values, WalkBounds},
};

/// An ordered dictionary keyed on bytes or text.
///
/// Keys are kept in lexicographic byte order. A key inserted as text comes
/// back as [`Key::Text`], one inserted as bytes as [`Key::Bytes`], even when
/// their bytes are the same.
#[derive(Clone)]
pub struct PrefixDict<V> {
  trie: Trie<V>,
}

impl<V> Default for PrefixDict<V> {
  fn default() -> Self {
    Self { trie: Trie::new() }
  }
}

pub(crate) fn missing<K: TrieKey>(key: &K) -> Error {
  Error::KeyNotFound(Key::restore(key.key_bytes(), key.key_kind()))
}

pub(crate) fn limit_of<K: TrieKey + ?Sized>(bound: Bound<&K>) -> Limit {
  match bound {
    Bound::Included(k) => Limit::Included(k.key_bytes().to_vec()),
    Bound::Excluded(k) => Limit::Excluded(k.key_bytes().to_vec()),
    Bound::Unbounded => Limit::Unbounded,
  }
}

impl<V> PrefixDict<V> {
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

  /// The underlying engine.
  pub fn as_trie(&self) -> &Trie<V> {
    &self.trie
  }

  // --- POINT OPERATIONS ---

  /// Stores `value` under `key`, returning the value it replaced. The key's
  /// representation is updated to the one given here.
  pub fn insert<K: TrieKey>(&mut self, key: K, value: V) -> Option<V> {
    self.trie.assign(key.key_bytes(), key.key_kind(), value)
  }

  pub fn get<K: TrieKey>(&self, key: K) -> Option<&V> {
    self.trie.get(key.key_bytes())
  }

  pub fn get_mut<K: TrieKey>(&mut self, key: K) -> Option<&mut V> {
    self.trie.get_mut(key.key_bytes())
  }

  /// Like [`get`](Self::get), but reports an absent key as an error.
  pub fn try_get<K: TrieKey>(&self, key: K) -> Result<&V> {
    self.trie.get(key.key_bytes()).ok_or_else(|| missing(&key))
  }

  /// The stored key, in the representation it was inserted with, and its
  /// value.
  pub fn get_key_value<K: TrieKey>(&self, key: K) -> Option<(Key, &V)> {
    let node = self.trie.search(key.key_bytes(), true)?;
    let terminal = node.terminal()?;
    Some((Key::restore(node.path(), terminal.kind), &terminal.value))
  }

  pub fn contains_key<K: TrieKey>(&self, key: K) -> bool {
    self.trie.contains(key.key_bytes())
  }

  /// Returns the value under `key`, storing `default()` first if the key is
  /// absent.
  pub fn get_or_insert_with<K: TrieKey, F: FnOnce() -> V>(&mut self, key: K, default: F) -> &mut V {
    self
      .trie
      .get_or_insert_with(key.key_bytes(), key.key_kind(), default)
  }

  pub fn remove<K: TrieKey>(&mut self, key: K) -> Option<V> {
    self.trie.remove(key.key_bytes()).map(|t| t.value)
  }

  pub fn remove_entry<K: TrieKey>(&mut self, key: K) -> Option<(Key, V)> {
    let path = key.key_bytes();
    self
      .trie
      .remove(path)
      .map(|t| (Key::restore(path, t.kind), t.value))
  }

  /// Like [`remove`](Self::remove), but reports an absent key as an error.
  pub fn try_remove<K: TrieKey>(&mut self, key: K) -> Result<V> {
    self.remove(&key).ok_or_else(|| missing(&key))
  }

  // --- ORDERED ITERATION ---

  /// Entries in ascending key order.
  pub fn iter(&self) -> Entries<'_, V> {
    self.trie.entries(WalkBounds::unbounded(), Direction::Forward)
  }

  /// Entries in descending key order.
  pub fn iter_rev(&self) -> Entries<'_, V> {
    self.trie.entries(WalkBounds::unbounded(), Direction::Reverse)
  }

  pub fn keys(&self) -> Keys<'_, V> {
    self.trie.keys(WalkBounds::unbounded(), Direction::Forward)
  }

  pub fn keys_rev(&self) -> Keys<'_, V> {
    self.trie.keys(WalkBounds::unbounded(), Direction::Reverse)
  }

  pub fn values(&self) -> Values<'_, V> {
    self.trie.values(WalkBounds::unbounded(), Direction::Forward)
  }

  // --- PREFIX QUERIES ---

  /// Keys beginning with `prefix`.
  pub fn starts_with<K: TrieKey>(&self, prefix: K, direction: Direction) -> Keys<'_, V> {
    self.trie.startswith(prefix.key_bytes(), direction)
  }

  /// Entries whose keys begin with `prefix`.
  pub fn items_with_prefix<K: TrieKey>(&self, prefix: K, direction: Direction) -> Entries<'_, V> {
    self
      .trie
      .entries(WalkBounds::prefix(prefix.key_bytes()), direction)
  }

  /// The deepest path `key` shares with the dictionary; see
  /// [`Trie::common_prefix`].
  pub fn common_prefix<K: TrieKey>(&self, key: K) -> Key {
    self.trie.common_prefix(key.key_bytes())
  }

  /// The longest stored key that is a prefix of `key`, with its value.
  pub fn longest_prefix<K: TrieKey>(&self, key: K) -> Option<(Key, &V)> {
    let node = self.trie.longest_prefix(key.key_bytes())?;
    let terminal = node.terminal()?;
    Some((Key::restore(node.path(), terminal.kind), &terminal.value))
  }

  // --- RANGES ---

  /// Entries whose keys fall in `range`, with the same bound semantics as
  /// `BTreeMap::range`.
  pub fn range<R, K>(&self, range: R) -> Entries<'_, V>
  where
    R: RangeBounds<K>,
    K: TrieKey + ?Sized,
  {
    let bounds = WalkBounds::new(limit_of(range.start_bound()), limit_of(range.end_bound()));
    self.trie.entries(bounds, Direction::Forward)
  }

  /// The first entry whose key is `>= key`.
  pub fn lower_bound<K: TrieKey>(&self, key: K) -> Option<(Key, &V)> {
    self.first_from(Limit::Included(key.key_bytes().to_vec()))
  }

  /// The first entry whose key is `> key`.
  pub fn upper_bound<K: TrieKey>(&self, key: K) -> Option<(Key, &V)> {
    self.first_from(Limit::Excluded(key.key_bytes().to_vec()))
  }

  fn first_from(&self, start: Limit) -> Option<(Key, &V)> {
    let bounds = WalkBounds::new(start, Limit::Unbounded);
    self.trie.entries(bounds, Direction::Forward).next()
  }

  /// Values selected by `slice`, in the slice's direction.
  pub fn slice(&self, slice: &Slice) -> Result<Values<'_, V>> {
    let (bounds, direction) = slice.resolve()?;
    Ok(self.trie.values(bounds, direction))
  }

  /// Entries selected by `slice`, in the slice's direction.
  pub fn slice_items(&self, slice: &Slice) -> Result<Entries<'_, V>> {
    let (bounds, direction) = slice.resolve()?;
    Ok(self.trie.entries(bounds, direction))
  }

  fn slice_paths(&self, slice: &Slice) -> Result<Vec<Vec<u8>>> {
    let (bounds, direction) = slice.resolve()?;
    Ok(
      self
        .trie
        .walk(bounds, direction)
        .filter(|node| node.is_terminal())
        .map(|node| node.path().to_vec())
        .collect(),
    )
  }

  /// Removes every entry selected by `slice`. Returns how many went.
  pub fn remove_slice(&mut self, slice: &Slice) -> Result<usize> {
    let paths = self.slice_paths(slice)?;
    let removed = paths
      .iter()
      .filter(|path| self.trie.remove(path).is_some())
      .count();
    #[cfg(feature = "tracing")]
    tracing::debug!(removed, "removed slice");
    Ok(removed)
  }

  /// Overwrites the values selected by `slice`, in the slice's direction,
  /// with `values`.
  ///
  /// Surplus values are dropped. Too few values is an error and leaves the
  /// dictionary unchanged.
  pub fn assign_slice<I>(&mut self, slice: &Slice, values: I) -> Result<()>
  where
    I: IntoIterator<Item = V>,
  {
    let paths = self.slice_paths(slice)?;
    let values: Vec<V> = values.into_iter().take(paths.len()).collect();
    if values.len() < paths.len() {
      return Err(Error::LengthMismatch {
        expected: paths.len(),
        actual: values.len(),
      });
    }
    for (path, value) in paths.iter().zip(values) {
      if let Some(slot) = self.trie.get_mut(path) {
        *slot = value;
      }
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(assigned = paths.len(), "assigned slice");
    Ok(())
  }

  // --- DIAGNOSTICS ---

  /// A printable view of the tree structure.
  pub fn pretty(&self) -> Pretty<'_, V> {
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

impl<K: TrieKey, V> FromIterator<(K, V)> for PrefixDict<V> {
  fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
    let mut dict = PrefixDict::new();
    dict.extend(iter);
    dict
  }
}

impl<K: TrieKey, V> Extend<(K, V)> for PrefixDict<V> {
  fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
    for (k, v) in iter {
      self.insert(k, v);
    }
  }
}

impl<K: TrieKey, V> Index<K> for PrefixDict<V> {
  type Output = V;
  fn index(&self, key: K) -> &Self::Output {
    self.get(key).expect("no entry found for key")
  }
}

impl<V: PartialEq> PartialEq for PrefixDict<V> {
  fn eq(&self, other: &Self) -> bool {
    self.len() == other.len() && self.iter().eq(other.iter())
  }
}

impl<V: Eq> Eq for PrefixDict<V> {}

impl<V: fmt::Debug> fmt::Debug for PrefixDict<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("PrefixDict")?;
    f.debug_map().entries(self.iter()).finish()
  }
}

impl<'a, V> IntoIterator for &'a PrefixDict<V> {
  type Item = (Key, &'a V);
  type IntoIter = Entries<'a, V>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

impl<V> IntoIterator for PrefixDict<V> {
  type Item = (Key, V);
  type IntoIter = std::vec::IntoIter<(Key, V)>;

  /// Moves every entry out in ascending key order.
  fn into_iter(self) -> Self::IntoIter {
    let mut entries = Vec::with_capacity(self.len());
    drain(self.trie.into_root(), &mut entries);
    entries.into_iter()
  }
}

/// Pre-order over an owned subtree; children go on the stack highest byte
/// first so they come off in ascending order.
fn drain<V>(root: Node<V>, out: &mut Vec<(Key, V)>) {
  let mut stack = vec![root];
  while let Some(node) = stack.pop() {
    let (path, terminal, children) = node.into_parts();
    if let Some(t) = terminal {
      out.push((Key::restore(&path, t.kind), t.value));
    }
    stack.extend(children.into_iter().rev());
  }
}

#[cfg(feature = "serde")]
mod dict_serde {
  use super::*;
  use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{SeqAccess, Visitor},
  };
  use std::marker::PhantomData;

  // Entries go out as a sequence of `[key, value]` pairs: byte keys cannot be
  // map keys in every format.
  impl<V: Serialize> Serialize for PrefixDict<V> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
      S: Serializer,
    {
      serializer.collect_seq(self.iter())
    }
  }

  struct DictVisitor<V>(PhantomData<V>);

  impl<'de, V: Deserialize<'de>> Visitor<'de> for DictVisitor<V> {
    type Value = PrefixDict<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
      formatter.write_str("a sequence of [key, value] pairs")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
    where
      A: SeqAccess<'de>,
    {
      let mut dict = PrefixDict::new();
      while let Some((key, value)) = seq.next_element::<(Key, V)>()? {
        dict.insert(key, value);
      }
      Ok(dict)
    }
  }

  impl<'de, V: Deserialize<'de>> Deserialize<'de> for PrefixDict<V> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
      D: Deserializer<'de>,
    {
      deserializer.deserialize_seq(DictVisitor(PhantomData))
    }
  }
}
