use crate::key::Key;

/// Failures surfaced by the dictionary and set adapters.
///
/// The engine itself reports absence through `Option`; these variants are
/// what the mapping/set contracts turn that absence (or a malformed slice)
/// into.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
  #[error("key not found: {0}")]
  KeyNotFound(Key),

  #[error("slice step must be 1, -1 or unset, got {0}")]
  InvalidStep(isize),

  #[error("slice assignment needs {expected} values, got {actual}")]
  LengthMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
