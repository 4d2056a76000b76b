use std::{borrow::Cow, cmp::Ordering, fmt};

/// How a key was handed to the trie.
///
/// The trie only ever stores bytes; the origin is remembered on the terminal
/// node so the key can be given back in the shape the caller used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyKind {
  Bytes,
  Text,
}

/// A key restored from the trie: either raw bytes or UTF-8 text.
///
/// Keys order by their byte representation. Two keys with the same bytes but
/// different origins are distinct, with `Bytes` sorting first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
  Bytes(Vec<u8>),
  Text(String),
}

impl Key {
  /// Rebuilds a key from a trie path and the origin recorded for it.
  ///
  /// Text paths always hold valid UTF-8 since they were encoded from a
  /// `str`; a path that somehow is not falls back to `Bytes`.
  pub fn restore(path: &[u8], kind: KeyKind) -> Self {
    match kind {
      KeyKind::Bytes => Key::Bytes(path.to_vec()),
      KeyKind::Text => match String::from_utf8(path.to_vec()) {
        Ok(text) => Key::Text(text),
        Err(err) => Key::Bytes(err.into_bytes()),
      },
    }
  }

  pub fn as_bytes(&self) -> &[u8] {
    match self {
      Key::Bytes(bytes) => bytes,
      Key::Text(text) => text.as_bytes(),
    }
  }

  pub fn kind(&self) -> KeyKind {
    match self {
      Key::Bytes(_) => KeyKind::Bytes,
      Key::Text(_) => KeyKind::Text,
    }
  }

  pub fn is_text(&self) -> bool {
    matches!(self, Key::Text(_))
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Key::Text(text) => Some(text),
      Key::Bytes(_) => None,
    }
  }

  pub fn into_bytes(self) -> Vec<u8> {
    match self {
      Key::Bytes(bytes) => bytes,
      Key::Text(text) => text.into_bytes(),
    }
  }
}

impl Ord for Key {
  fn cmp(&self, other: &Self) -> Ordering {
    self
      .as_bytes()
      .cmp(other.as_bytes())
      .then_with(|| self.kind().cmp(&other.kind()))
  }
}

impl PartialOrd for Key {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl fmt::Display for Key {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Key::Text(text) => write!(f, "{text:?}"),
      Key::Bytes(bytes) => write!(f, "b\"{}\"", bytes.escape_ascii()),
    }
  }
}

impl From<&str> for Key {
  fn from(text: &str) -> Self {
    Key::Text(text.to_owned())
  }
}

impl From<String> for Key {
  fn from(text: String) -> Self {
    Key::Text(text)
  }
}

impl From<&[u8]> for Key {
  fn from(bytes: &[u8]) -> Self {
    Key::Bytes(bytes.to_vec())
  }
}

impl<const N: usize> From<&[u8; N]> for Key {
  fn from(bytes: &[u8; N]) -> Self {
    Key::Bytes(bytes.to_vec())
  }
}

impl From<Vec<u8>> for Key {
  fn from(bytes: Vec<u8>) -> Self {
    Key::Bytes(bytes)
  }
}

impl PartialEq<str> for Key {
  fn eq(&self, other: &str) -> bool {
    self.as_str() == Some(other)
  }
}

impl PartialEq<&str> for Key {
  fn eq(&self, other: &&str) -> bool {
    self.as_str() == Some(*other)
  }
}

impl PartialEq<String> for Key {
  fn eq(&self, other: &String) -> bool {
    self.as_str() == Some(other.as_str())
  }
}

impl PartialEq<[u8]> for Key {
  fn eq(&self, other: &[u8]) -> bool {
    matches!(self, Key::Bytes(bytes) if bytes.as_slice() == other)
  }
}

impl<const N: usize> PartialEq<&[u8; N]> for Key {
  fn eq(&self, other: &&[u8; N]) -> bool {
    matches!(self, Key::Bytes(bytes) if bytes.as_slice() == other.as_slice())
  }
}

// --- NORMALIZATION ---

/// Types accepted as trie keys.
///
/// Only byte sequences and text implement this, so handing the trie any other
/// kind of key is a compile error rather than a runtime failure. Text is
/// traversed as its UTF-8 encoding.
pub trait TrieKey {
  fn key_bytes(&self) -> &[u8];
  fn key_kind(&self) -> KeyKind;
}

impl TrieKey for str {
  fn key_bytes(&self) -> &[u8] {
    self.as_bytes()
  }
  fn key_kind(&self) -> KeyKind {
    KeyKind::Text
  }
}

impl TrieKey for String {
  fn key_bytes(&self) -> &[u8] {
    self.as_bytes()
  }
  fn key_kind(&self) -> KeyKind {
    KeyKind::Text
  }
}

impl TrieKey for Cow<'_, str> {
  fn key_bytes(&self) -> &[u8] {
    self.as_bytes()
  }
  fn key_kind(&self) -> KeyKind {
    KeyKind::Text
  }
}

impl TrieKey for [u8] {
  fn key_bytes(&self) -> &[u8] {
    self
  }
  fn key_kind(&self) -> KeyKind {
    KeyKind::Bytes
  }
}

impl TrieKey for Vec<u8> {
  fn key_bytes(&self) -> &[u8] {
    self
  }
  fn key_kind(&self) -> KeyKind {
    KeyKind::Bytes
  }
}

impl<const N: usize> TrieKey for [u8; N] {
  fn key_bytes(&self) -> &[u8] {
    self
  }
  fn key_kind(&self) -> KeyKind {
    KeyKind::Bytes
  }
}

impl TrieKey for Key {
  fn key_bytes(&self) -> &[u8] {
    self.as_bytes()
  }
  fn key_kind(&self) -> KeyKind {
    self.kind()
  }
}

impl<T: TrieKey + ?Sized> TrieKey for &T {
  fn key_bytes(&self) -> &[u8] {
    (**self).key_bytes()
  }
  fn key_kind(&self) -> KeyKind {
    (**self).key_kind()
  }
}

#[cfg(feature = "serde")]
mod key_serde {
  use super::Key;
  use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, SeqAccess, Visitor},
  };
  use std::fmt;

  impl Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
      S: Serializer,
    {
      match self {
        Key::Text(text) => serializer.serialize_str(text),
        Key::Bytes(bytes) => serializer.serialize_bytes(bytes),
      }
    }
  }

  struct KeyVisitor;

  impl<'de> Visitor<'de> for KeyVisitor {
    type Value = Key;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
      formatter.write_str("a string or byte sequence")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Key, E> {
      Ok(Key::Text(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Key, E> {
      Ok(Key::Text(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Key, E> {
      Ok(Key::Bytes(v.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Key, E> {
      Ok(Key::Bytes(v))
    }

    // Self-describing formats without a bytes type (JSON) hand bytes over as
    // a sequence of integers.
    fn visit_seq<A>(self, mut seq: A) -> Result<Key, A::Error>
    where
      A: SeqAccess<'de>,
    {
      let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
      while let Some(byte) = seq.next_element::<u8>()? {
        bytes.push(byte);
      }
      Ok(Key::Bytes(bytes))
    }
  }

  impl<'de> Deserialize<'de> for Key {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
      D: Deserializer<'de>,
    {
      deserializer.deserialize_any(KeyVisitor)
    }
  }
}
