use std::fmt;

use crate::key::{Key, KeyKind};

/// Marks a byte with no slot in `children`.
const ABSENT: u16 = u16::MAX;

/// Payload carried by a node whose path is a stored key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal<V> {
  pub value: V,
  pub kind: KeyKind,
}

/// A single trie vertex.
///
/// Edges live in a compacted array: `branch` maps each byte to a slot in
/// `children`, and a slot whose child was removed stays behind as a
/// tombstone (`None`). Re-adding the same byte refills its old slot, so
/// `children` never holds more than 256 entries.
pub struct Node<V> {
  branch: Box<[u16; 256]>,
  children: Vec<Option<Node<V>>>,
  live: usize,
  path: Box<[u8]>,
  terminal: Option<Terminal<V>>,
}

impl<V> Default for Node<V> {
  fn default() -> Self {
    Self::with_path(Box::default())
  }
}

impl<V> Node<V> {
  pub fn new() -> Self {
    Self::default()
  }

  pub(crate) fn with_path(path: Box<[u8]>) -> Self {
    Self {
      branch: Box::new([ABSENT; 256]),
      children: Vec::new(),
      live: 0,
      path,
      terminal: None,
    }
  }

  /// Builds the child reached from this node over `byte`.
  pub(crate) fn spawn(&self, byte: u8) -> Self {
    let mut path = Vec::with_capacity(self.path.len() + 1);
    path.extend_from_slice(&self.path);
    path.push(byte);
    Self::with_path(path.into_boxed_slice())
  }

  /// Bytes from the root to this node.
  pub fn path(&self) -> &[u8] {
    &self.path
  }

  /// The byte on the edge into this node, `None` for the root.
  pub fn edge_byte(&self) -> Option<u8> {
    self.path.last().copied()
  }

  pub fn depth(&self) -> usize {
    self.path.len()
  }

  // --- TERMINAL ---

  pub fn terminal(&self) -> Option<&Terminal<V>> {
    self.terminal.as_ref()
  }

  pub fn value(&self) -> Option<&V> {
    self.terminal.as_ref().map(|t| &t.value)
  }

  pub fn value_mut(&mut self) -> Option<&mut V> {
    self.terminal.as_mut().map(|t| &mut t.value)
  }

  pub fn is_terminal(&self) -> bool {
    self.terminal.is_some()
  }

  /// The stored key in its original representation, if this node holds one.
  pub fn key(&self) -> Option<Key> {
    self
      .terminal
      .as_ref()
      .map(|t| Key::restore(&self.path, t.kind))
  }

  pub(crate) fn set_terminal(&mut self, value: V, kind: KeyKind) -> Option<Terminal<V>> {
    self.terminal.replace(Terminal { value, kind })
  }

  /// The stored value, computing one from `default` when there is none.
  /// The flag tells whether the value was just created.
  pub(crate) fn value_or_insert_with<F: FnOnce() -> V>(&mut self, kind: KeyKind, default: F) -> (&mut V, bool) {
    let created = self.terminal.is_none();
    let terminal = self.terminal.get_or_insert_with(|| Terminal {
      value: default(),
      kind,
    });
    (&mut terminal.value, created)
  }

  pub(crate) fn take_terminal(&mut self) -> Option<Terminal<V>> {
    self.terminal.take()
  }

  /// Holds no value and has no live children; such a node is pruned.
  pub fn is_vacant(&self) -> bool {
    self.terminal.is_none() && self.live == 0
  }

  // --- EDGES ---

  fn slot(&self, byte: u8) -> Option<usize> {
    match self.branch[byte as usize] {
      ABSENT => None,
      idx => Some(idx as usize),
    }
  }

  pub fn has_edge(&self, byte: u8) -> bool {
    self.child(byte).is_some()
  }

  pub fn child(&self, byte: u8) -> Option<&Node<V>> {
    self.slot(byte).and_then(|idx| self.children[idx].as_ref())
  }

  pub fn child_mut(&mut self, byte: u8) -> Option<&mut Node<V>> {
    match self.slot(byte) {
      Some(idx) => self.children[idx].as_mut(),
      None => None,
    }
  }

  /// Links `node` under `byte`, replacing any current child in place.
  ///
  /// A byte that never had an edge gets a fresh slot at the end of the
  /// compacted array; a tombstoned slot is refilled.
  pub fn set_child(&mut self, byte: u8, node: Node<V>) -> Option<Node<V>> {
    match self.slot(byte) {
      Some(idx) => {
        let previous = self.children[idx].replace(node);
        if previous.is_none() {
          self.live += 1;
        }
        previous
      }
      None => {
        self.branch[byte as usize] = self.children.len() as u16;
        self.children.push(Some(node));
        self.live += 1;
        None
      }
    }
  }

  /// Returns the child under `byte`, creating an empty one if needed.
  pub(crate) fn child_or_insert(&mut self, byte: u8) -> &mut Node<V> {
    if !self.has_edge(byte) {
      let child = self.spawn(byte);
      self.set_child(byte, child);
    }
    let idx = self.branch[byte as usize] as usize;
    match &mut self.children[idx] {
      Some(child) => child,
      None => unreachable!("edge {byte} was just linked"),
    }
  }

  /// Tombstones the edge under `byte`, handing back the detached child.
  pub fn remove_edge(&mut self, byte: u8) -> Option<Node<V>> {
    let idx = self.slot(byte)?;
    let removed = self.children[idx].take();
    if removed.is_some() {
      self.live -= 1;
    }
    removed
  }

  /// Number of live children.
  pub fn degree(&self) -> usize {
    self.live
  }

  /// Slots in the compacted array holding no child.
  pub fn tombstones(&self) -> usize {
    self.children.len() - self.live
  }

  /// Live edges in ascending byte order; `.rev()` gives descending order.
  pub fn edges(&self) -> Edges<'_, V> {
    Edges::new(self, 0, 255)
  }

  /// Live edges whose byte lies in `lo..=hi`.
  pub(crate) fn edges_within(&self, lo: u8, hi: u8) -> Edges<'_, V> {
    Edges::new(self, lo, hi)
  }

  /// Rebuilds the compacted array without tombstones. Returns the number of
  /// slots reclaimed.
  pub(crate) fn compact(&mut self) -> usize {
    let reclaimed = self.tombstones();
    if reclaimed > 0 {
      let mut old = std::mem::take(&mut self.children);
      let mut branch = Box::new([ABSENT; 256]);
      for byte in 0..=255u8 {
        if let Some(idx) = self.slot(byte) {
          if let Some(child) = old[idx].take() {
            branch[byte as usize] = self.children.len() as u16;
            self.children.push(Some(child));
          }
        }
      }
      self.branch = branch;
      self.children.shrink_to_fit();
    }
    reclaimed
  }

  pub(crate) fn live_children_mut(&mut self) -> impl Iterator<Item = &mut Node<V>> {
    self.children.iter_mut().flatten()
  }

  /// Splits the node into its path, its payload and its live children in
  /// ascending byte order.
  pub(crate) fn into_parts(mut self) -> (Box<[u8]>, Option<Terminal<V>>, Vec<Node<V>>) {
    let mut children = std::mem::take(&mut self.children);
    let ordered = self
      .branch
      .iter()
      .filter(|&&idx| idx != ABSENT)
      .filter_map(|&idx| children[idx as usize].take())
      .collect();
    (std::mem::take(&mut self.path), self.terminal.take(), ordered)
  }

  /// Copy of this node with every child slot left empty.
  fn clone_shallow(&self) -> Self
  where
    V: Clone,
  {
    Self {
      branch: self.branch.clone(),
      children: self.children.iter().map(|_| None).collect(),
      live: self.live,
      path: self.path.clone(),
      terminal: self.terminal.clone(),
    }
  }
}

// --- OWNERSHIP ---

// Key depth is unbounded, so neither cloning nor dropping may recurse once
// per level.

impl<V: Clone> Clone for Node<V> {
  fn clone(&self) -> Self {
    let mut root = self.clone_shallow();
    // Pre-order copies, each with its parent's position (`None` for the
    // root) and the slot it fills there. Parents always precede children.
    let mut copies: Vec<(Node<V>, Option<usize>, usize)> = Vec::new();
    let mut stack: Vec<(&Node<V>, Option<usize>)> = vec![(self, None)];
    while let Some((node, at)) = stack.pop() {
      for (slot, child) in node.children.iter().enumerate() {
        if let Some(child) = child {
          copies.push((child.clone_shallow(), at, slot));
          stack.push((child, Some(copies.len() - 1)));
        }
      }
    }
    while let Some((copy, parent, slot)) = copies.pop() {
      let host = match parent {
        Some(idx) => &mut copies[idx].0,
        None => &mut root,
      };
      host.children[slot] = Some(copy);
    }
    root
  }
}

impl<V> Drop for Node<V> {
  fn drop(&mut self) {
    let mut stack: Vec<Node<V>> = self.children.drain(..).flatten().collect();
    while let Some(mut node) = stack.pop() {
      stack.extend(node.children.drain(..).flatten());
    }
  }
}

impl<V: fmt::Debug> fmt::Debug for Node<V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Node")
      .field("path", &self.path.escape_ascii().to_string())
      .field("degree", &self.live)
      .field("terminal", &self.terminal)
      .finish()
  }
}

// --- EDGE ITERATOR ---

/// Iterator over a node's live edges as `(byte, child)`.
///
/// Walks the branch table between two cursors, so it runs in either
/// direction and can be restricted to a byte window.
pub struct Edges<'a, V> {
  node: &'a Node<V>,
  // Half-open window [front, back) over byte values.
  front: u16,
  back: u16,
}

impl<'a, V> Edges<'a, V> {
  fn new(node: &'a Node<V>, lo: u8, hi: u8) -> Self {
    let (front, back) = if lo <= hi {
      (lo as u16, hi as u16 + 1)
    } else {
      (0, 0)
    };
    Self { node, front, back }
  }
}

impl<'a, V> Iterator for Edges<'a, V> {
  type Item = (u8, &'a Node<V>);

  fn next(&mut self) -> Option<Self::Item> {
    while self.front < self.back {
      let byte = self.front as u8;
      self.front += 1;
      if let Some(child) = self.node.child(byte) {
        return Some((byte, child));
      }
    }
    None
  }
}

impl<V> DoubleEndedIterator for Edges<'_, V> {
  fn next_back(&mut self) -> Option<Self::Item> {
    while self.back > self.front {
      self.back -= 1;
      let byte = self.back as u8;
      if let Some(child) = self.node.child(byte) {
        return Some((byte, child));
      }
    }
    None
  }
}
