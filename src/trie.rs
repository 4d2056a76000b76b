use crate::{
  Direction, TrieStats,
  key::{Key, KeyKind},
  node::{Node, Terminal},
  walk::{Entries, Keys, Values, Walk, WalkBounds},
};

/// The trie engine: a root node plus the number of stored keys.
///
/// Works on raw byte paths. [`PrefixDict`](crate::PrefixDict) and
/// [`PrefixSet`](crate::PrefixSet) layer key normalization and the mapping
/// and set contracts on top.
#[derive(Debug, Clone)]
pub struct Trie<V> {
  root: Node<V>,
  len: usize,
}

impl<V> Default for Trie<V> {
  fn default() -> Self {
    Self {
      root: Node::new(),
      len: 0,
    }
  }
}

impl<V> Trie<V> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of stored keys.
  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub fn root(&self) -> &Node<V> {
    &self.root
  }

  pub(crate) fn into_root(self) -> Node<V> {
    self.root
  }

  pub fn clear(&mut self) {
    #[cfg(feature = "tracing")]
    tracing::debug!(keys = self.len, "clearing trie");
    self.root = Node::new();
    self.len = 0;
  }

  // --- MUTATION ---

  /// Descends along `path`, creating every missing node, and returns the
  /// node at its end. The empty path is the root.
  ///
  /// The node is handed back as is: storing a value on it is up to the
  /// caller, who must keep the key count in step (see [`Trie::assign`]).
  pub fn insert(&mut self, path: &[u8]) -> &mut Node<V> {
    path
      .iter()
      .fold(&mut self.root, |node, &byte| node.child_or_insert(byte))
  }

  /// Stores `value` under `path`, returning the value it replaced.
  pub fn assign(&mut self, path: &[u8], kind: KeyKind, value: V) -> Option<V> {
    let previous = self.insert(path).set_terminal(value, kind);
    if previous.is_none() {
      self.len += 1;
      #[cfg(feature = "tracing")]
      tracing::trace!(depth = path.len(), len = self.len, "key created");
    } else {
      #[cfg(feature = "tracing")]
      tracing::trace!(depth = path.len(), "key overwritten");
    }
    previous.map(|t| t.value)
  }

  /// The value under `path`, storing `default()` first if the key is new.
  pub(crate) fn get_or_insert_with<F: FnOnce() -> V>(&mut self, path: &[u8], kind: KeyKind, default: F) -> &mut V {
    let node = path
      .iter()
      .fold(&mut self.root, |node, &byte| node.child_or_insert(byte));
    let (value, created) = node.value_or_insert_with(kind, default);
    if created {
      self.len += 1;
      #[cfg(feature = "tracing")]
      tracing::trace!(depth = path.len(), len = self.len, "key created");
    }
    value
  }

  /// Detaches the value stored under `path`.
  ///
  /// The chain of nodes left without a value and without children is
  /// unlinked in one cut. A missing edge, or a node that exists
  /// only as an inner vertex, yields `None` and leaves the trie untouched.
  pub fn remove(&mut self, path: &[u8]) -> Option<Terminal<V>> {
    // Depth of the deepest node on the path that keeps a value or a second
    // branch once the key is gone. The root always stays.
    let mut cut = 0;
    let mut node = &self.root;
    for (depth, &byte) in path.iter().enumerate() {
      if node.is_terminal() || node.degree() > 1 {
        cut = depth;
      }
      node = node.child(byte)?;
    }
    if !node.is_terminal() {
      return None;
    }
    let prune = !path.is_empty() && node.degree() == 0;

    let removed = self.search_mut(path)?.take_terminal()?;
    let pruned = if prune {
      // The detached chain is dropped without recursion.
      self.search_mut(&path[..cut])?.remove_edge(path[cut]);
      path.len() - cut
    } else {
      0
    };
    debug_assert!(self.len > 0, "removed a key from a trie counting none");
    self.len -= 1;
    #[cfg(feature = "tracing")]
    tracing::trace!(depth = path.len(), pruned, len = self.len, "key removed");
    #[cfg(not(feature = "tracing"))]
    let _ = pruned;
    Some(removed)
  }

  /// Rebuilds every node's child array without tombstones. Returns the
  /// number of slots reclaimed.
  pub fn shrink_to_fit(&mut self) -> usize {
    let mut reclaimed = 0;
    let mut stack = vec![&mut self.root];
    while let Some(node) = stack.pop() {
      reclaimed += node.compact();
      stack.extend(node.live_children_mut());
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(reclaimed, "compacted child arrays");
    reclaimed
  }

  // --- SEARCH ---

  /// Follows `path` from the root.
  ///
  /// With `exact`, any missing edge gives `None`. Otherwise the descent
  /// stops at the deepest reachable node, which is returned whether or not
  /// it stores a value; the result is then never `None`.
  pub fn search(&self, path: &[u8], exact: bool) -> Option<&Node<V>> {
    let mut node = &self.root;
    for &byte in path {
      match node.child(byte) {
        Some(child) => node = child,
        None if exact => return None,
        None => break,
      }
    }
    Some(node)
  }

  pub fn search_mut(&mut self, path: &[u8]) -> Option<&mut Node<V>> {
    path
      .iter()
      .try_fold(&mut self.root, |node, &byte| node.child_mut(byte))
  }

  pub fn get(&self, path: &[u8]) -> Option<&V> {
    self.search(path, true).and_then(Node::value)
  }

  pub fn get_mut(&mut self, path: &[u8]) -> Option<&mut V> {
    self.search_mut(path).and_then(Node::value_mut)
  }

  pub fn contains(&self, path: &[u8]) -> bool {
    self.get(path).is_some()
  }

  /// The deepest path shared between `path` and the trie.
  ///
  /// When that path is itself a stored key it comes back in the key's
  /// original representation; otherwise it is raw bytes.
  pub fn common_prefix(&self, path: &[u8]) -> Key {
    match self.search(path, false) {
      Some(node) => node
        .key()
        .unwrap_or_else(|| Key::Bytes(node.path().to_vec())),
      None => Key::Bytes(Vec::new()),
    }
  }

  /// The longest stored key that is a prefix of `path`.
  pub fn longest_prefix(&self, path: &[u8]) -> Option<&Node<V>> {
    let mut node = &self.root;
    let mut best = node.is_terminal().then_some(node);
    for &byte in path {
      match node.child(byte) {
        Some(child) => node = child,
        None => break,
      }
      if node.is_terminal() {
        best = Some(node);
      }
    }
    best
  }

  // --- ORDERED TRAVERSAL ---

  /// Every node inside `bounds`, in key order or reverse key order.
  pub fn walk(&self, bounds: WalkBounds, direction: Direction) -> Walk<'_, V> {
    Walk::new(&self.root, bounds, direction)
  }

  pub fn keys(&self, bounds: WalkBounds, direction: Direction) -> Keys<'_, V> {
    Keys::new(self.walk(bounds, direction))
  }

  pub fn values(&self, bounds: WalkBounds, direction: Direction) -> Values<'_, V> {
    Values::new(self.walk(bounds, direction))
  }

  pub fn entries(&self, bounds: WalkBounds, direction: Direction) -> Entries<'_, V> {
    Entries::new(self.walk(bounds, direction))
  }

  /// Stored keys beginning with `prefix`. An absent prefix yields nothing.
  pub fn startswith(&self, prefix: &[u8], direction: Direction) -> Keys<'_, V> {
    self.keys(WalkBounds::prefix(prefix), direction)
  }

  // --- DIAGNOSTICS ---

  pub fn stats(&self) -> TrieStats {
    let mut stats = TrieStats::default();
    for node in self.walk(WalkBounds::unbounded(), Direction::Forward) {
      stats.nodes += 1;
      stats.tombstones += node.tombstones();
      stats.max_depth = stats.max_depth.max(node.depth());
      if node.is_terminal() {
        stats.keys += 1;
      }
    }
    stats
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn text(trie: &mut Trie<u32>, key: &str, value: u32) -> Option<u32> {
    trie.assign(key.as_bytes(), KeyKind::Text, value)
  }

  #[test]
  fn test_insert_creates_path() {
    let mut trie: Trie<u32> = Trie::new();
    let node = trie.insert(b"abc");
    assert_eq!(node.path(), b"abc");
    assert!(!node.is_terminal());
    // Insertion alone stores nothing.
    assert_eq!(trie.len(), 0);
    assert_eq!(trie.stats().nodes, 4);
    assert_eq!(trie.insert(b"").path(), b"");
  }

  #[test]
  fn test_assign_and_overwrite() {
    let mut trie = Trie::new();
    assert_eq!(text(&mut trie, "dog", 4), None);
    assert_eq!(text(&mut trie, "dog", 5), Some(4));
    assert_eq!(trie.len(), 1);
    assert_eq!(trie.get(b"dog"), Some(&5));
    assert_eq!(trie.get(b"do"), None);
  }

  #[test]
  fn test_search_exact_and_inexact() {
    let mut trie = Trie::new();
    text(&mut trie, "abcd", 1);

    assert!(trie.search(b"abce", true).is_none());
    assert_eq!(trie.search(b"ab", true).map(Node::path), Some(&b"ab"[..]));
    assert_eq!(trie.search(b"abef", false).map(Node::path), Some(&b"ab"[..]));
    assert_eq!(trie.search(b"abcdef", false).map(Node::path), Some(&b"abcd"[..]));
  }

  #[test]
  fn test_remove_prunes_to_root() {
    let mut trie = Trie::new();
    text(&mut trie, "dog", 1);
    text(&mut trie, "dogma", 2);

    let removed = trie.remove(b"dogma").map(|t| t.value);
    assert_eq!(removed, Some(2));
    // "dogm" and "dogma" went away, "dog" still anchors its path.
    assert_eq!(trie.stats().nodes, 4);

    assert_eq!(trie.remove(b"dog").map(|t| t.value), Some(1));
    assert_eq!(trie.root().degree(), 0);
    assert_eq!(trie.len(), 0);
  }

  #[test]
  fn test_remove_inner_vertex_fails_cleanly() {
    let mut trie = Trie::new();
    text(&mut trie, "dog", 1);
    assert!(trie.remove(b"do").is_none());
    assert!(trie.remove(b"cat").is_none());
    assert!(trie.remove(b"doge").is_none());
    assert_eq!(trie.len(), 1);
    assert_eq!(trie.stats().nodes, 4);
  }

  #[test]
  fn test_remove_keeps_valued_ancestors() {
    let mut trie = Trie::new();
    text(&mut trie, "a", 1);
    text(&mut trie, "abc", 2);
    trie.remove(b"abc");
    assert_eq!(trie.get(b"a"), Some(&1));
    assert_eq!(trie.stats().nodes, 2);
  }

  #[test]
  fn test_empty_key_lives_on_root() {
    let mut trie = Trie::new();
    text(&mut trie, "", 9);
    assert!(trie.root().is_terminal());
    assert_eq!(trie.len(), 1);
    assert_eq!(trie.remove(b"").map(|t| t.value), Some(9));
    assert!(trie.remove(b"").is_none());
    assert!(trie.is_empty());
  }

  #[test]
  fn test_remove_cuts_below_branching_ancestor() {
    let mut trie = Trie::new();
    text(&mut trie, "abcde", 1);
    text(&mut trie, "abx", 2);

    assert_eq!(trie.remove(b"abcde").map(|t| t.value), Some(1));
    // "c", "d" and "e" go; "b" still leads to "x".
    assert_eq!(trie.stats().nodes, 4);
    assert!(trie.search(b"ab", true).is_some_and(|n| n.degree() == 1));
    assert_eq!(trie.get(b"abx"), Some(&2));
  }

  #[test]
  fn test_get_or_insert_with_counts_new_keys_once() {
    let mut trie: Trie<u32> = Trie::new();
    *trie.get_or_insert_with(b"ab", KeyKind::Text, || 1) += 10;
    *trie.get_or_insert_with(b"ab", KeyKind::Bytes, || 100) += 10;
    assert_eq!(trie.len(), 1);
    assert_eq!(trie.get(b"ab"), Some(&21));
    // The first representation sticks.
    let stored = trie.search(b"ab", true).and_then(Node::key);
    assert_eq!(stored, Some(Key::Text("ab".into())));

    trie.get_or_insert_with(b"", KeyKind::Text, || 0);
    assert_eq!(trie.len(), 2);
  }

  #[test]
  fn test_clone_keeps_structure_and_tombstones() {
    let mut trie = Trie::new();
    for key in ["car", "cat", "cow", "dog"] {
      text(&mut trie, key, key.len() as u32);
    }
    trie.remove(b"cat");

    let copy = trie.clone();
    assert_eq!(copy.len(), 3);
    assert_eq!(copy.stats().nodes, trie.stats().nodes);
    assert_eq!(copy.search(b"ca", true).map(Node::tombstones), Some(1));
    let keys: Vec<_> = copy.keys(WalkBounds::unbounded(), Direction::Forward).collect();
    assert_eq!(keys, vec![Key::from("car"), Key::from("cow"), Key::from("dog")]);
  }

  #[test]
  fn test_common_prefix() {
    let mut trie = Trie::new();
    assert_eq!(trie.common_prefix(b"abc"), Key::Bytes(vec![]));

    text(&mut trie, "abcd", 1);
    assert_eq!(trie.common_prefix(b"abef"), Key::Bytes(b"ab".to_vec()));
    assert_eq!(trie.common_prefix(b"abcd"), Key::Text("abcd".into()));
    assert_eq!(trie.common_prefix(b"efgh"), Key::Bytes(vec![]));
  }

  #[test]
  fn test_longest_prefix() {
    let mut trie = Trie::new();
    text(&mut trie, "http", 1);
    text(&mut trie, "http://google", 2);

    let hit = trie.longest_prefix(b"http://google.com").and_then(Node::value);
    assert_eq!(hit, Some(&2));
    let hit = trie.longest_prefix(b"http://yahoo.com").and_then(Node::value);
    assert_eq!(hit, Some(&1));
    assert!(trie.longest_prefix(b"ftp://").is_none());
  }

  #[test]
  fn test_count_matches_terminals() {
    let mut trie = Trie::new();
    for key in ["a", "ab", "abc", "b", "ba", "a"] {
      text(&mut trie, key, 0);
    }
    trie.remove(b"ab");
    trie.remove(b"zz");
    assert_eq!(trie.len(), 4);
    assert_eq!(trie.stats().keys, trie.len());
  }

  #[test]
  fn test_shrink_to_fit() {
    let mut trie = Trie::new();
    for key in ["a", "b", "c", "d"] {
      text(&mut trie, key, 0);
    }
    trie.remove(b"a");
    trie.remove(b"c");
    assert_eq!(trie.stats().tombstones, 2);
    assert_eq!(trie.shrink_to_fit(), 2);
    assert_eq!(trie.stats().tombstones, 0);
    let keys: Vec<_> = trie.keys(WalkBounds::unbounded(), Direction::Forward).collect();
    assert_eq!(keys, vec![Key::from("b"), Key::from("d")]);
  }
}
