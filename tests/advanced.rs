use std::{collections::BTreeMap, ops::Bound};

use prefixtree::{Direction, Error, Key, PrefixDict, Slice};
use proptest::prelude::*;

fn abc_dict() -> (Vec<String>, PrefixDict<String>) {
  let mut keys = Vec::with_capacity(27);
  for a in ['a', 'b', 'c'] {
    for b in ['a', 'b', 'c'] {
      for c in ['a', 'b', 'c'] {
        keys.push(format!("{a}{b}{c}"));
      }
    }
  }
  let mut dict = PrefixDict::new();
  for key in keys.iter().rev() {
    dict.insert(key, key.to_uppercase());
  }
  (keys, dict)
}

fn upper_where(keys: &[String], keep: impl Fn(&str) -> bool) -> Vec<String> {
  keys
    .iter()
    .filter(|k| keep(k.as_str()))
    .map(|k| k.to_uppercase())
    .collect()
}

// ============================================================================
// 1. Ranges
// ============================================================================

#[test]
fn test_range_query_basic() {
  let mut dict = PrefixDict::new();
  dict.insert("a", 1);
  dict.insert("b", 2);
  dict.insert("c", 3);
  dict.insert("d", 4);

  let res: Vec<_> = dict.range("b".."d").map(|(k, _)| k).collect();
  assert_eq!(res, vec!["b", "c"]);

  let res: Vec<_> = dict.range("b"..="d").map(|(k, _)| k).collect();
  assert_eq!(res, vec!["b", "c", "d"]);

  let res: Vec<_> = dict.range("c"..).map(|(k, _)| k).collect();
  assert_eq!(res, vec!["c", "d"]);

  let res: Vec<_> = dict.range(.."b").map(|(k, _)| k).collect();
  assert_eq!(res, vec!["a"]);
}

#[test]
fn test_range_mixed_lengths() {
  let dict: PrefixDict<()> = ["b", "ba", "bb", "bc", "bcd", "c"]
    .into_iter()
    .map(|k| (k, ()))
    .collect();

  // A proper prefix sorts before every key it starts.
  let res: Vec<_> = dict.range("ba".."bc").map(|(k, _)| k).collect();
  assert_eq!(res, vec!["ba", "bb"]);

  let res: Vec<_> = dict.range("b"..="bc").map(|(k, _)| k).collect();
  assert_eq!(res, vec!["b", "ba", "bb", "bc"]);

  let excluded = (Bound::Excluded("b"), Bound::Excluded("c"));
  let res: Vec<_> = dict.range::<_, &str>(excluded).map(|(k, _)| k).collect();
  assert_eq!(res, vec!["ba", "bb", "bc", "bcd"]);
}

#[test]
fn test_range_seeks_past_smaller_keys() {
  let mut dict = PrefixDict::new();
  dict.insert("z", 26);
  dict.insert("a", 1);

  let mut iter = dict.range("m"..);
  let (first_key, _) = iter.next().unwrap();
  assert_eq!(first_key, "z");
  assert!(iter.next().is_none());
}

#[test]
fn test_lower_and_upper_bound() {
  let mut dict = PrefixDict::new();
  dict.insert("apple", 1);
  dict.insert("apricot", 2);

  assert_eq!(dict.lower_bound("app").unwrap().0, "apple");
  assert_eq!(dict.lower_bound("apple").unwrap().0, "apple");
  assert_eq!(dict.lower_bound("applf").unwrap().0, "apricot");
  assert_eq!(dict.lower_bound("b"), None);

  assert_eq!(dict.upper_bound("apple").unwrap().0, "apricot");
  assert_eq!(dict.upper_bound("apricot"), None);
  assert_eq!(dict.upper_bound("").unwrap().0, "apple");
}

// ============================================================================
// 2. Slices
// ============================================================================

#[test]
fn test_slice_narrow() {
  let (keys, dict) = abc_dict();
  let got: Vec<_> = dict.slice(&Slice::new().start("ab").stop("ab")).unwrap().cloned().collect();
  assert_eq!(got, upper_where(&keys, |k| k.starts_with("ab")));
  assert_eq!(got.len(), 9);

  // The prefix shorthand selects the same keys.
  let items: Vec<_> = dict.slice_items(&Slice::prefix("ab")).unwrap().map(|(k, _)| k).collect();
  assert_eq!(items.len(), 9);
  assert!(items.iter().all(|k| k.as_bytes().starts_with(b"ab")));
}

#[test]
fn test_slice_wide() {
  let (keys, dict) = abc_dict();
  let got: Vec<_> = dict.slice(&Slice::new().start("a").stop("b")).unwrap().cloned().collect();
  assert_eq!(got, upper_where(&keys, |k| !k.starts_with('c')));
}

#[test]
fn test_slice_empty() {
  let (_, dict) = abc_dict();
  assert_eq!(dict.slice(&Slice::new().start("d").stop("z")).unwrap().count(), 0);
}

#[test]
fn test_slice_reverse() {
  let (keys, dict) = abc_dict();
  let got: Vec<_> = dict
    .slice(&Slice::new().start("a").stop("b").step(-1))
    .unwrap()
    .cloned()
    .collect();
  let mut expected = upper_where(&keys, |k| !k.starts_with('c'));
  expected.reverse();
  assert_eq!(got, expected);
}

#[test]
fn test_slice_invalid_step() {
  let (_, dict) = abc_dict();
  assert!(matches!(dict.slice(&Slice::new().step(2)), Err(Error::InvalidStep(2))));
  assert!(matches!(dict.slice(&Slice::new().step(-2)), Err(Error::InvalidStep(-2))));
  assert!(matches!(dict.slice_items(&Slice::new().step(0)), Err(Error::InvalidStep(0))));
}

#[test]
fn test_slice_open_ends() {
  let (keys, dict) = abc_dict();

  let got: Vec<_> = dict.slice(&Slice::new().stop("b")).unwrap().cloned().collect();
  assert_eq!(got, upper_where(&keys, |k| !k.starts_with('c')));

  let got: Vec<_> = dict.slice(&Slice::new().start("b")).unwrap().cloned().collect();
  assert_eq!(got, upper_where(&keys, |k| !k.starts_with('a')));

  assert_eq!(dict.slice(&Slice::new()).unwrap().count(), 27);
}

#[test]
fn test_slice_remove() {
  let (keys, mut dict) = abc_dict();
  assert_eq!(dict.remove_slice(&Slice::prefix("ab")), Ok(9));
  for key in &keys {
    assert_eq!(dict.contains_key(key), !key.starts_with("ab"));
  }
  assert_eq!(dict.len(), 18);
  // The whole "ab" branch was pruned.
  assert!(dict.as_trie().search(b"ab", true).is_none());
}

#[test]
fn test_slice_remove_empty() {
  let (keys, mut dict) = abc_dict();
  assert_eq!(dict.remove_slice(&Slice::new().start("e")), Ok(0));
  let left: Vec<_> = dict.keys().collect();
  assert_eq!(left, keys);

  assert_eq!(dict.remove_slice(&Slice::new().step(3)), Err(Error::InvalidStep(3)));
  assert_eq!(dict.len(), 27);
}

#[test]
fn test_slice_assign() {
  let (keys, mut dict) = abc_dict();
  let new_values: Vec<String> = keys.iter().filter(|k| k.starts_with("ab")).cloned().collect();

  dict.assign_slice(&Slice::prefix("ab"), new_values.clone()).unwrap();
  let got: Vec<_> = dict.slice(&Slice::prefix("ab")).unwrap().cloned().collect();
  assert_eq!(got, new_values);
  // Everything else kept its value.
  assert_eq!(dict.get("aaa"), Some(&"AAA".to_string()));
}

#[test]
fn test_slice_assign_reverse() {
  let (_, mut dict) = abc_dict();
  let slice = Slice::prefix("ca").step(-1);
  dict.assign_slice(&slice, ["1", "2", "3"].map(String::from)).unwrap();
  assert_eq!(dict.get("cac"), Some(&"1".to_string()));
  assert_eq!(dict.get("caa"), Some(&"3".to_string()));
}

#[test]
fn test_slice_assign_short() {
  let (keys, mut dict) = abc_dict();
  let mut new_values: Vec<String> = keys.iter().filter(|k| k.starts_with("ab")).cloned().collect();
  new_values.pop();

  assert_eq!(
    dict.assign_slice(&Slice::prefix("ab"), new_values),
    Err(Error::LengthMismatch { expected: 9, actual: 8 })
  );
  // Nothing was written.
  assert_eq!(dict.get("aba"), Some(&"ABA".to_string()));
}

#[test]
fn test_slice_assign_long() {
  let (keys, mut dict) = abc_dict();
  let mut new_values: Vec<String> = keys.iter().filter(|k| k.starts_with("ab")).cloned().collect();
  new_values.push("extra".to_string());

  dict.assign_slice(&Slice::prefix("ab"), new_values).unwrap();
  assert!(dict.values().all(|v| v != "extra"));
  assert_eq!(dict.len(), 27);
}

#[test]
fn test_slice_over_mixed_keys() {
  let mut dict = PrefixDict::new();
  dict.insert(b"ab", 1);
  dict.insert("abc", 2);
  dict.insert(b"b", 3);

  let items: Vec<_> = dict.slice_items(&Slice::prefix(b"ab")).unwrap().collect();
  assert_eq!(items, vec![(Key::from(b"ab"), &1), (Key::from("abc"), &2)]);

  let keys: Vec<_> = dict.starts_with("", Direction::Reverse).collect();
  assert_eq!(keys, vec![Key::from(b"b"), Key::from("abc"), Key::from(b"ab")]);
}

// ============================================================================
// 3. Property-Based Testing
// ============================================================================

fn small_key() -> impl Strategy<Value = Vec<u8>> {
  proptest::collection::vec(0u8..4, 0..5)
}

fn bound(kind: u8, key: &[u8]) -> Bound<&[u8]> {
  match kind {
    0 => Bound::Included(key),
    1 => Bound::Excluded(key),
    _ => Bound::Unbounded,
  }
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(200))]

  #[test]
  fn prop_range_matches_btreemap(
    keys in proptest::collection::vec(small_key(), 0..100),
    a in small_key(),
    b in small_key(),
    start_kind in 0u8..3,
    end_kind in 0u8..3
  ) {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let dict: PrefixDict<usize> = keys.iter().enumerate().map(|(i, k)| (k, i)).collect();
    let ref_map: BTreeMap<Vec<u8>, usize> = keys.iter().enumerate().map(|(i, k)| (k.clone(), i)).collect();

    let range = (bound(start_kind, &lo), bound(end_kind, &hi));
    let got: Vec<_> = dict.range::<_, &[u8]>(range).map(|(k, v)| (k.into_bytes(), *v)).collect();

    if let (Bound::Excluded(s), Bound::Excluded(e)) = range {
      if s == e {
        // BTreeMap rejects this range outright; it simply holds nothing.
        assert!(got.is_empty());
        return Ok(());
      }
    }
    let expected: Vec<_> = ref_map.range::<[u8], _>(range).map(|(k, v)| (k.clone(), *v)).collect();
    assert_eq!(got, expected);
  }

  #[test]
  fn prop_reverse_slice_mirrors_forward(
    keys in proptest::collection::vec(small_key(), 0..100),
    start in small_key(),
    stop in small_key()
  ) {
    let dict: PrefixDict<()> = keys.iter().map(|k| (k, ())).collect();
    let slice = Slice::new().start(&start).stop(&stop);

    let forward: Vec<_> = dict.slice_items(&slice).unwrap().map(|(k, _)| k).collect();
    let mut backward: Vec<_> = dict.slice_items(&slice.step(-1)).unwrap().map(|(k, _)| k).collect();
    backward.reverse();
    assert_eq!(forward, backward);

    // Inclusive start, and stop covers the keys extending it.
    let expected: Vec<_> = dict
      .keys()
      .filter(|k| k.as_bytes() >= start.as_slice())
      .filter(|k| k.as_bytes() <= stop.as_slice() || k.as_bytes().starts_with(&stop))
      .collect();
    assert_eq!(forward, expected);
  }
}
