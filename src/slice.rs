use crate::{
  Direction,
  error::{Error, Result},
  key::TrieKey,
  walk::{Limit, WalkBounds},
};

/// A `start:stop:step` selection over a trie's keys.
///
/// Both ends are inclusive, and `stop` also covers every key that extends
/// it, so `start == stop == p` selects the keys beginning with `p`. A
/// missing end leaves that side open. `step` picks the direction and must be
/// `1` or `-1`.
///
/// ```rust
/// use prefixtree::{PrefixDict, Slice};
///
/// let dict: PrefixDict<u32> = [("aa", 1), ("ab", 2), ("ba", 3), ("ca", 4)].into_iter().collect();
/// let picked: Vec<_> = dict.slice(&Slice::new().start("a").stop("b")).unwrap().collect();
/// assert_eq!(picked, vec![&1, &2, &3]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
  start: Option<Vec<u8>>,
  stop: Option<Vec<u8>>,
  step: isize,
}

impl Default for Slice {
  fn default() -> Self {
    Self {
      start: None,
      stop: None,
      step: 1,
    }
  }
}

impl Slice {
  pub fn new() -> Self {
    Self::default()
  }

  /// Selects the keys that begin with `prefix`.
  pub fn prefix<K: TrieKey>(prefix: K) -> Self {
    Self::new().start(&prefix).stop(&prefix)
  }

  pub fn start<K: TrieKey>(mut self, key: K) -> Self {
    self.start = Some(key.key_bytes().to_vec());
    self
  }

  pub fn stop<K: TrieKey>(mut self, key: K) -> Self {
    self.stop = Some(key.key_bytes().to_vec());
    self
  }

  pub fn step(mut self, step: isize) -> Self {
    self.step = step;
    self
  }

  pub fn direction(&self) -> Result<Direction> {
    Direction::from_step(self.step)
  }

  pub(crate) fn bounds(&self) -> WalkBounds {
    WalkBounds::new(
      self.start.clone().map_or(Limit::Unbounded, Limit::Included),
      self.stop.clone().map_or(Limit::Unbounded, Limit::Subtree),
    )
  }

  /// Validated bounds and direction, ready for a walk.
  pub(crate) fn resolve(&self) -> Result<(WalkBounds, Direction)> {
    Ok((self.bounds(), self.direction()?))
  }
}

impl Direction {
  /// Maps a slice step onto a direction.
  pub fn from_step(step: isize) -> Result<Self> {
    match step {
      1 => Ok(Direction::Forward),
      -1 => Ok(Direction::Reverse),
      other => Err(Error::InvalidStep(other)),
    }
  }
}
