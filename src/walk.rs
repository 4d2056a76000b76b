use crate::{
  Direction,
  key::Key,
  node::{Edges, Node},
};

/// One end of a bounded walk.
///
/// Lower ends compare a key against the limit with `>=` (`Included`,
/// `Subtree`) or `>` (`Excluded`). Upper ends use `<=`, `<`, or for
/// `Subtree` accept every key that is `<=` the limit or starts with it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Limit {
  #[default]
  Unbounded,
  Included(Vec<u8>),
  Excluded(Vec<u8>),
  Subtree(Vec<u8>),
}

impl Limit {
  fn bytes(&self) -> &[u8] {
    match self {
      Limit::Unbounded => &[],
      Limit::Included(k) | Limit::Excluded(k) | Limit::Subtree(k) => k,
    }
  }

  fn is_bounded(&self) -> bool {
    !matches!(self, Limit::Unbounded)
  }
}

/// Lower and upper limit for a walk, relative to the node the walk starts at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WalkBounds {
  pub start: Limit,
  pub stop: Limit,
}

impl WalkBounds {
  pub fn unbounded() -> Self {
    Self::default()
  }

  /// Every key beginning with `prefix`.
  pub fn prefix(prefix: &[u8]) -> Self {
    Self {
      start: Limit::Included(prefix.to_vec()),
      stop: Limit::Subtree(prefix.to_vec()),
    }
  }

  pub fn new(start: Limit, stop: Limit) -> Self {
    Self { start, stop }
  }

  /// Whether a node at `depth` that still follows the tracked limit paths
  /// lies inside the bounds itself.
  fn admits(&self, depth: usize, on_start: bool, on_stop: bool) -> bool {
    // Following `start` means the path is a prefix of it: equal at full
    // length, smaller before that.
    let lower = !on_start
      || (depth == self.start.bytes().len() && !matches!(self.start, Limit::Excluded(_)));
    // Following `stop`: a proper prefix is smaller; at full length only the
    // exclusive form rejects.
    let upper = !on_stop
      || depth < self.stop.bytes().len()
      || !matches!(self.stop, Limit::Excluded(_));
    lower && upper
  }

  /// Byte window for the children of a node at `depth`, or `None` when no
  /// child can be in range.
  fn window(&self, depth: usize, on_start: bool, on_stop: bool) -> Option<(u8, u8)> {
    let start = self.start.bytes();
    let stop = self.stop.bytes();

    let lo = if on_start && depth < start.len() { start[depth] } else { 0 };
    let hi = if on_stop {
      if depth < stop.len() {
        stop[depth]
      } else if matches!(self.stop, Limit::Subtree(_)) {
        255
      } else {
        // Every descendant is greater than an inclusive/exclusive stop.
        return None;
      }
    } else {
      255
    };

    (lo <= hi).then_some((lo, hi))
  }
}

struct Frame<'a, V> {
  node: &'a Node<V>,
  edges: Edges<'a, V>,
  depth: usize,
  on_start: bool,
  on_stop: bool,
  admitted: bool,
  visited: bool,
}

/// Depth-first bounded walk yielding every node inside the bounds.
///
/// Bounds are consumed one byte per level. While the walked path still
/// equals a limit's prefix at that depth, only children on the near side of
/// the limit's next byte are entered; once the path leaves the limit, deeper
/// levels are unconstrained on that side. Forward walks yield a node before
/// its children. Reverse walks yield it after them, visiting children in
/// descending order, which is exactly the forward sequence backwards.
pub struct Walk<'a, V> {
  stack: Vec<Frame<'a, V>>,
  bounds: WalkBounds,
  direction: Direction,
}

impl<'a, V> Walk<'a, V> {
  pub fn new(node: &'a Node<V>, bounds: WalkBounds, direction: Direction) -> Self {
    let mut walk = Self {
      stack: Vec::with_capacity(16),
      bounds,
      direction,
    };
    let on_start = walk.bounds.start.is_bounded();
    let on_stop = walk.bounds.stop.is_bounded();
    walk.push(node, 0, on_start, on_stop);
    walk
  }

  pub fn empty() -> Self {
    Self {
      stack: Vec::new(),
      bounds: WalkBounds::default(),
      direction: Direction::Forward,
    }
  }

  fn push(&mut self, node: &'a Node<V>, depth: usize, on_start: bool, on_stop: bool) {
    let edges = match self.bounds.window(depth, on_start, on_stop) {
      Some((lo, hi)) => node.edges_within(lo, hi),
      // An inverted window yields nothing.
      None => node.edges_within(1, 0),
    };
    self.stack.push(Frame {
      node,
      edges,
      depth,
      on_start,
      on_stop,
      admitted: self.bounds.admits(depth, on_start, on_stop),
      visited: false,
    });
  }
}

impl<'a, V> Iterator for Walk<'a, V> {
  type Item = &'a Node<V>;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      let frame = self.stack.last_mut()?;

      if self.direction == Direction::Forward && !frame.visited {
        frame.visited = true;
        if frame.admitted {
          return Some(frame.node);
        }
      }

      let edge = match self.direction {
        Direction::Forward => frame.edges.next(),
        Direction::Reverse => frame.edges.next_back(),
      };

      match edge {
        Some((byte, child)) => {
          let depth = frame.depth;
          let start = self.bounds.start.bytes();
          let stop = self.bounds.stop.bytes();
          let on_start = frame.on_start && depth < start.len() && byte == start[depth];
          let on_stop = frame.on_stop && depth < stop.len() && byte == stop[depth];
          self.push(child, depth + 1, on_start, on_stop);
        }
        None => {
          let done = self.stack.pop()?;
          if self.direction == Direction::Reverse && done.admitted {
            return Some(done.node);
          }
        }
      }
    }
  }
}

// --- ADAPTERS ---

/// Stored keys along a walk, restored to their original representation.
pub struct Keys<'a, V> {
  walk: Walk<'a, V>,
}

impl<'a, V> Keys<'a, V> {
  pub(crate) fn new(walk: Walk<'a, V>) -> Self {
    Self { walk }
  }
}

impl<V> Iterator for Keys<'_, V> {
  type Item = Key;

  fn next(&mut self) -> Option<Key> {
    self.walk.by_ref().find_map(Node::key)
  }
}

/// Values along a walk.
pub struct Values<'a, V> {
  walk: Walk<'a, V>,
}

impl<'a, V> Values<'a, V> {
  pub(crate) fn new(walk: Walk<'a, V>) -> Self {
    Self { walk }
  }
}

impl<'a, V> Iterator for Values<'a, V> {
  type Item = &'a V;

  fn next(&mut self) -> Option<&'a V> {
    self.walk.by_ref().find_map(Node::value)
  }
}

/// `(key, value)` pairs along a walk.
pub struct Entries<'a, V> {
  walk: Walk<'a, V>,
}

impl<'a, V> Entries<'a, V> {
  pub(crate) fn new(walk: Walk<'a, V>) -> Self {
    Self { walk }
  }
}

impl<'a, V> Iterator for Entries<'a, V> {
  type Item = (Key, &'a V);

  fn next(&mut self) -> Option<Self::Item> {
    self.walk.by_ref().find_map(|node| {
      let terminal = node.terminal()?;
      Some((Key::restore(node.path(), terminal.kind), &terminal.value))
    })
  }
}
