use std::fmt;

use crate::{node::Node, trie::Trie};

/// `Display` adapter drawing a trie one edge per line.
///
/// ```text
/// <root> (2 items)
/// └── d
///     └── o
///         └── g ("dog" = 4)
///             └── s ("dogs" = 5)
/// ```
pub struct Pretty<'a, V> {
  trie: &'a Trie<V>,
  values: bool,
}

impl<'a, V> Pretty<'a, V> {
  pub(crate) fn new(trie: &'a Trie<V>) -> Self {
    Self { trie, values: true }
  }

  /// Leaves values out, showing only which nodes hold keys.
  pub fn keys_only(mut self) -> Self {
    self.values = false;
    self
  }

  fn write_key(&self, f: &mut fmt::Formatter<'_>, node: &Node<V>) -> fmt::Result
  where
    V: fmt::Debug,
  {
    let Some(key) = node.key() else {
      return Ok(());
    };
    match node.value() {
      Some(value) if self.values => write!(f, " ({key} = {value:?})"),
      _ => write!(f, " ({key})"),
    }
  }

  fn write_children(&self, f: &mut fmt::Formatter<'_>, root: &Node<V>) -> fmt::Result
  where
    V: fmt::Debug,
  {
    let mut indent = String::new();
    // One open edge iterator per level, with the indent width it draws at.
    let mut stack = vec![(root.edges().peekable(), 0)];
    while let Some((edges, mark)) = stack.last_mut() {
      let Some((byte, child)) = edges.next() else {
        stack.pop();
        continue;
      };
      let last = edges.peek().is_none();
      indent.truncate(*mark);
      write!(f, "{indent}{}{}", if last { "└── " } else { "├── " }, std::ascii::escape_default(byte))?;
      self.write_key(f, child)?;
      writeln!(f)?;

      indent.push_str(if last { "    " } else { "│   " });
      stack.push((child.edges().peekable(), indent.len()));
    }
    Ok(())
  }
}

impl<V: fmt::Debug> fmt::Display for Pretty<'_, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let root = self.trie.root();
    write!(f, "<root> ({} items)", self.trie.len())?;
    self.write_key(f, root)?;
    writeln!(f)?;
    self.write_children(f, root)
  }
}
