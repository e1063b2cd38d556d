use crate::{
  order::Key, Boolean2IntRbTreeMap, Double2IntRbTreeMap, Error, Int2FloatRbTreeMap,
  Int2IntRbTreeMap, Long2LongRbTreeMap, RbTreeMap, Reversed, Natural,
};
use rand::{seq::SliceRandom, thread_rng, Rng};
use std::{cmp::Ordering, fmt::Debug, mem};

const SIZE: usize = 1000;

trait Rand: Sized {
  fn rand<R: Rng>(r: &mut R) -> Self;
}

macro_rules! rand_impls {
  ($($t:ty),*) => {
    $(impl Rand for $t {
      fn rand<R: Rng>(r: &mut R) -> Self { r.gen() }
    })*
  };
}

rand_impls!(i8, i16, i32, i64, char, f32, f64, bool);

fn randvec<T: Rand>(len: usize) -> Vec<T> {
  let mut rng = thread_rng();
  (0..len).map(|_| T::rand(&mut rng)).collect()
}

// sorted association list, the reference every map is checked against
struct Model<K, V>(Vec<(K, V)>);

impl<K: Key, V: Copy> Model<K, V> {
  fn new() -> Self { Model(Vec::new()) }

  fn search(&self, k: K) -> Result<usize, usize> {
    self.0.binary_search_by(|(x, _)| x.natural_cmp(k))
  }

  fn insert(&mut self, k: K, v: V) -> Option<V> {
    match self.search(k) {
      Ok(i) => Some(mem::replace(&mut self.0[i].1, v)),
      Err(i) => {
        self.0.insert(i, (k, v));
        None
      }
    }
  }

  fn remove(&mut self, k: K) -> Option<V> {
    self.search(k).ok().map(|i| self.0.remove(i).1)
  }

  fn get(&self, k: K) -> Option<V> {
    self.search(k).ok().map(|i| self.0[i].1)
  }

  // the entries with lo <= k < hi
  fn range(&self, lo: K, hi: K) -> Vec<(K, V)> {
    self.0.iter()
      .filter(|(k, _)| k.natural_cmp(lo) != Ordering::Less && k.natural_cmp(hi) == Ordering::Less)
      .copied()
      .collect()
  }
}

fn random_pair<K: Key + Rand, V: Copy + Default + Rand>() -> (RbTreeMap<K, V>, Model<K, V>) {
  let mut m = RbTreeMap::new();
  let mut model = Model::new();
  for (k, v) in randvec::<K>(SIZE).into_iter().zip(randvec::<V>(SIZE)) {
    m.insert(k, v);
    model.insert(k, v);
  }
  (m, model)
}

fn check_same<K, V>(m: &RbTreeMap<K, V>, model: &Model<K, V>)
where K: Key + PartialEq, V: Copy + PartialEq + Debug
{
  m.invariant();
  assert_eq!(m.len(), model.0.len());
  assert_eq!(m.iter().collect::<Vec<_>>(), model.0);
  let mut rev = model.0.clone();
  rev.reverse();
  assert_eq!(m.iter().rev().collect::<Vec<_>>(), rev);
  assert_eq!(m.first_entry(), model.0.first().copied());
  assert_eq!(m.last_entry(), model.0.last().copied());
}

fn test_add_remove_rand<K, V>()
where K: Key + PartialEq + Rand, V: Copy + Default + PartialEq + Debug + Rand
{
  let keys = randvec::<K>(SIZE);
  let vals = randvec::<V>(SIZE);
  let mut m = RbTreeMap::new();
  let mut model = Model::new();
  for (i, (k, v)) in keys.iter().zip(vals.iter()).enumerate() {
    assert_eq!(m.insert(*k, *v), model.insert(*k, *v));
    m.invariant();
    if i % 3 == 0 {
      let d = keys[i / 2];
      assert_eq!(m.remove(d), model.remove(d));
      assert_eq!(m.remove(d), None);
      assert!(!m.contains_key(d));
      m.invariant();
    }
  }
  check_same(&m, &model);
  for k in &keys {
    assert_eq!(m.get(*k), model.get(*k));
  }
  let mut shuffled = keys.clone();
  shuffled.shuffle(&mut thread_rng());
  for k in shuffled {
    assert_eq!(m.remove(k), model.remove(k));
    m.invariant();
  }
  assert!(m.is_empty());
  assert_eq!(m.first_key(), Err(Error::EmptyMap));
  assert_eq!(m.last_key(), Err(Error::EmptyMap));
}

fn test_bulk_load<K, V>()
where K: Key + PartialEq + Rand, V: Copy + Default + PartialEq + Debug + Rand
{
  let (_, mut model) = random_pair::<K, V>();
  let mut m = RbTreeMap::from_sorted(model.0.clone()).unwrap();
  check_same(&m, &model);
  for (k, v) in randvec::<K>(SIZE / 4).into_iter().zip(randvec::<V>(SIZE / 4)) {
    assert_eq!(m.insert(k, v), model.insert(k, v));
    let d = model.0[model.0.len() / 2].0;
    assert_eq!(m.remove(d), model.remove(d));
  }
  check_same(&m, &model);
}

fn test_cursor_seek<K, V>()
where K: Key + PartialEq + Rand, V: Copy + Default + PartialEq + Debug + Rand
{
  let (m, model) = random_pair::<K, V>();
  for needle in randvec::<K>(50) {
    let split = model.0.partition_point(|(k, _)| k.natural_cmp(needle) != Ordering::Greater);
    let mut c = m.cursor_from(needle);
    assert_eq!(c.has_next(), split < model.0.len());
    assert_eq!(c.has_previous(), split > 0);
    let after: Vec<_> = c.by_ref().collect();
    assert_eq!(after, model.0[split..].to_vec());
    assert_eq!(c.next_index(), after.len() as isize);
    let mut c = m.cursor_from(needle);
    let mut before = Vec::new();
    while let Some(e) = c.previous() {
      before.push(e);
    }
    before.reverse();
    assert_eq!(before, model.0[..split].to_vec());
    assert_eq!(c.next_index(), -(split as isize));
  }
}

fn test_cursor_remove<K, V>()
where K: Key + PartialEq + Rand, V: Copy + Default + PartialEq + Debug + Rand
{
  let (mut m, model) = random_pair::<K, V>();
  let mut c = m.cursor_mut();
  let mut i = 0;
  while let Some(e) = c.next() {
    if i % 2 == 0 {
      assert_eq!(c.remove(), Ok(e));
      assert_eq!(c.remove(), Err(Error::NoCurrentEntry));
    }
    i += 1;
  }
  let kept: Vec<_> = model.0.iter().skip(1).step_by(2).copied().collect();
  assert_eq!(c.next_index(), kept.len() as isize);
  let mut back = Vec::new();
  while let Some(e) = c.previous() {
    back.push(e);
    c.remove().unwrap();
  }
  back.reverse();
  assert_eq!(back, kept);
  assert!(m.is_empty());
  m.invariant();
}

fn test_submap<K, V>()
where K: Key + PartialEq + Rand, V: Copy + Default + PartialEq + Debug + Rand
{
  let (m, model) = random_pair::<K, V>();
  let lookups = randvec::<K>(SIZE / 4);
  for w in randvec::<K>(20).chunks(2) {
    let (lo, hi) = match w[0].natural_cmp(w[1]) {
      Ordering::Greater => (w[1], w[0]),
      _ => (w[0], w[1]),
    };
    let s = m.sub_map(lo, hi).unwrap();
    let expected = model.range(lo, hi);
    assert_eq!(s.iter().collect::<Vec<_>>(), expected);
    assert_eq!(s.len(), expected.len());
    assert_eq!(s.first_entry(), expected.first().copied());
    assert_eq!(s.last_entry(), expected.last().copied());
    for k in lookups.iter().chain(model.0.iter().map(|(k, _)| k)) {
      assert_eq!(s.contains_key(*k), m.contains_key(*k) && s.in_range(*k));
    }
    let head = s.head_map(hi);
    assert_eq!(head.len(), expected.len());
    let tail = m.tail_map(lo);
    assert_eq!(
      tail.keys().next(),
      model.0.iter().map(|(k, _)| *k).find(|k| k.natural_cmp(lo) != Ordering::Less)
    );
  }
}

macro_rules! tests {
  ($k:ident => $($v:ident),*) => {
    paste::paste! {
      $(
        mod [<$k _ $v>] {
          use super::*;

          #[test]
          fn add_remove_rand() { test_add_remove_rand::<$k, $v>() }

          #[test]
          fn bulk_load() { test_bulk_load::<$k, $v>() }

          #[test]
          fn cursor_seek() { test_cursor_seek::<$k, $v>() }

          #[test]
          fn cursor_remove() { test_cursor_remove::<$k, $v>() }

          #[test]
          fn submap() { test_submap::<$k, $v>() }
        }
      )*
    }
  };
}

tests!(i32 => f32, i64, bool);
tests!(i64 => f64, i32);
tests!(i16 => i16, char);
tests!(i8 => i8);
tests!(char => i32);
tests!(f32 => f32);
tests!(f64 => i64);
tests!(bool => i32);

#[test]
fn traversal_is_sorted() {
  let mut m = Int2IntRbTreeMap::new();
  for k in [5, 3, 8, 1, 4, 7, 9] {
    m.insert(k, 0);
  }
  m.invariant();
  assert_eq!(m.first_key(), Ok(1));
  assert_eq!(m.last_key(), Ok(9));
  assert_eq!(m.keys().collect::<Vec<_>>(), vec![1, 3, 4, 5, 7, 8, 9]);
}

#[test]
fn submap_rejects_foreign_keys() {
  let mut m: Int2IntRbTreeMap = (1..=10).map(|k| (k, 0)).collect();
  let mut s = m.sub_map_mut(3, 7).unwrap();
  assert_eq!(s.keys().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
  assert!(s.insert(3, 1).is_ok());
  assert!(matches!(s.insert(10, 1), Err(Error::OutOfRange { .. })));
  assert_eq!(m.get(3), Some(1));
  assert_eq!(m.get(10), Some(0));
}

#[test]
fn overwrite_keeps_one_entry() {
  let mut m = Int2IntRbTreeMap::new();
  assert_eq!(m.insert(5, 10), None);
  assert_eq!(m.insert(5, 20), Some(10));
  assert_eq!(m.get(5), Some(20));
  assert_eq!(m.len(), 1);
}

#[test]
fn empty_map() {
  let mut m = Int2IntRbTreeMap::new();
  assert_eq!(m.remove(5), None);
  assert_eq!(m.remove(5), None);
  assert_eq!(m.len(), 0);
  assert_eq!(m.first_key(), Err(Error::EmptyMap));
  assert_eq!(m.pop_first(), Err(Error::EmptyMap));
  assert_eq!(m.iter().next(), None);
  assert!(!m.cursor().has_next());
  m.invariant();
}

#[test]
fn default_return_value() {
  let mut m = Long2LongRbTreeMap::new().with_default_return_value(-1);
  assert_eq!(m.default_return_value(), -1);
  assert_eq!(m.get_or_default(3), -1);
  assert_eq!(m.get(3), None);
  assert_eq!(m.put(3, 30), -1);
  assert_eq!(m.put(3, 31), 30);
  assert_eq!(m.replace_or_default(4, 1), -1);
  assert!(!m.contains_key(4));
  assert_eq!(m.remove_or_default(4), -1);
  assert_eq!(m.add_to(4, 5), -1);
  assert_eq!(m.get(4), Some(4));
  assert_eq!(m.remove_or_default(3), 31);
  m.set_default_return_value(0);
  assert_eq!(m.get_or_default(3), 0);
}

#[test]
fn insert_variants() {
  let mut m = Int2IntRbTreeMap::new();
  assert_eq!(m.insert_if_absent(1, 10), None);
  assert_eq!(m.insert_if_absent(1, 20), Some(10));
  assert_eq!(m.get(1), Some(10));
  let mut calls = 0;
  assert_eq!(m.compute_if_absent(2, |k| { calls += 1; k * 100 }), 200);
  assert_eq!(m.compute_if_absent(2, |_| { calls += 1; 0 }), 200);
  assert_eq!(calls, 1);
  assert_eq!(m.merge(2, 5, |a, b| a - b), 195);
  assert_eq!(m.merge(3, 5, |a, b| a - b), 5);
  assert_eq!(m.replace(9, 1), None);
  assert_eq!(m.replace(3, 1), Some(5));
  if let Some(v) = m.get_mut(1) {
    *v += 1
  }
  assert_eq!(m.get(1), Some(11));
  assert!(m.contains_value(195));
  assert!(!m.contains_value(5));
  m.invariant();
}

#[test]
fn pop_both_ends() {
  let mut m: Int2IntRbTreeMap = (0..100).map(|k| (k, -k)).collect();
  for i in 0..50 {
    assert_eq!(m.pop_first(), Ok((i, -i)));
    assert_eq!(m.pop_last(), Ok((99 - i, i - 99)));
    m.invariant();
  }
  assert!(m.is_empty());
  assert_eq!(m.pop_last(), Err(Error::EmptyMap));
}

#[test]
fn extremes_follow_mutation() {
  let mut m = Int2IntRbTreeMap::new();
  m.insert(10, 0);
  m.insert(5, 0);
  m.insert(20, 0);
  assert_eq!((m.first_key(), m.last_key()), (Ok(5), Ok(20)));
  m.remove(5);
  m.remove(20);
  assert_eq!((m.first_key(), m.last_key()), (Ok(10), Ok(10)));
  m.insert(1, 0);
  assert_eq!(m.first_key(), Ok(1));
  m.clear();
  assert_eq!(m.last_key(), Err(Error::EmptyMap));
  m.insert(7, 7);
  m.invariant();
  assert_eq!(m.len(), 1);
}

#[test]
fn clone_is_independent() {
  let mut m: Int2FloatRbTreeMap = (0..64).map(|k| (k, k as f32)).collect();
  let c = m.clone();
  m.remove(3);
  m.insert(100, 1.0);
  c.invariant();
  assert_eq!(c.len(), 64);
  assert_eq!(c.get(3), Some(3.0));
  assert_eq!(c.get(100), None);
  assert_ne!(c, m);
  let mut c = c;
  c.remove(3);
  c.insert(100, 1.0);
  assert_eq!(c, m);
}

#[test]
fn debug_and_default() {
  let mut m = Int2IntRbTreeMap::default();
  m.extend(vec![(2, 20), (1, 10)]);
  assert_eq!(format!("{:?}", m), "{1: 10, 2: 20}");
  assert_eq!(format!("{:?}", m.tail_map(2)), "{2: 20}");
}

#[test]
fn float_keys_total_order() {
  let mut m = Double2IntRbTreeMap::new();
  for (i, k) in [f64::NAN, 1.0, 0.0, -0.0, f64::NEG_INFINITY].into_iter().enumerate() {
    m.insert(k, i as i32);
  }
  m.insert(f64::NAN, 9);
  m.invariant();
  let bits: Vec<u64> = m.keys().map(f64::to_bits).collect();
  let expected: Vec<u64> = [f64::NEG_INFINITY, -0.0, 0.0, 1.0, f64::NAN]
    .iter().map(|k| k.to_bits()).collect();
  assert_eq!(bits, expected);
  assert_eq!(m.get(f64::NAN), Some(9));
  assert_eq!(m.get(-0.0), Some(3));
}

#[test]
fn custom_comparators() {
  // last digit first, then value
  let by_digit = |a: i32, b: i32| (a % 10).cmp(&(b % 10)).then(a.cmp(&b));
  let mut m = RbTreeMap::<i32, i32, _>::with_comparator(by_digit);
  m.extend([31, 12, 21, 2, 40].iter().map(|k| (*k, 0)));
  m.invariant();
  assert_eq!(m.keys().collect::<Vec<_>>(), vec![40, 21, 31, 2, 12]);
  assert_eq!(m.sub_map(21, 12).unwrap().keys().collect::<Vec<_>>(), vec![21, 31, 2]);

  let mut r = RbTreeMap::<i32, i32, _>::with_comparator(Reversed(Natural));
  r.extend((0..20).map(|k| (k, k)));
  r.invariant();
  assert_eq!(r.first_key(), Ok(19));
  assert_eq!(r.head_map(15).keys().collect::<Vec<_>>(), vec![19, 18, 17, 16]);
  let mut c = r.cursor_from(5);
  assert_eq!(c.next(), Some((4, 4)));
  assert_eq!(RbTreeMap::from_sorted_with(Reversed(Natural), vec![(1, 1), (2, 2)]).err(),
             Some(Error::Unsorted { index: 1 }));
}

#[test]
fn bulk_load_rejects_bad_input() {
  assert_eq!(Int2IntRbTreeMap::from_sorted(vec![(1, 0), (1, 0)]).err(),
             Some(Error::Unsorted { index: 1 }));
  assert_eq!(Int2IntRbTreeMap::from_sorted(vec![(1, 0), (2, 0), (0, 0)]).err(),
             Some(Error::Unsorted { index: 2 }));
  let m = Int2IntRbTreeMap::from_sorted(Vec::new()).unwrap();
  assert!(m.is_empty());
  for n in 1..70 {
    let m = Int2IntRbTreeMap::from_sorted((0..n).map(|k| (k, k))).unwrap();
    m.invariant();
    assert_eq!(m.len(), n as usize);
  }
}

#[test]
fn cursor_protocol() {
  let mut m: Int2IntRbTreeMap = (0..5).map(|k| (k, k)).collect();
  let mut c = m.cursor_mut();
  assert_eq!(c.set_value(1), Err(Error::NoCurrentEntry));
  assert_eq!(c.previous(), None);
  assert_eq!(c.next(), Some((0, 0)));
  assert_eq!(c.next(), Some((1, 1)));
  assert_eq!(c.next_index(), 2);
  assert_eq!(c.previous(), Some((1, 1)));
  assert_eq!(c.next_index(), 1);
  // removing what `previous` returned leaves the index alone
  assert_eq!(c.remove(), Ok((1, 1)));
  assert_eq!(c.next_index(), 1);
  assert_eq!(c.current(), None);
  assert_eq!(c.next(), Some((2, 2)));
  assert_eq!(c.set_value(20), Ok(2));
  assert_eq!(c.remove(), Ok((2, 20)));
  assert_eq!(c.previous_index(), 0);
  assert_eq!(c.advance(10), 2);
  assert!(!c.has_next());
  assert_eq!(c.retreat(1), 1);
  assert_eq!(c.current(), Some((4, 4)));
  assert_eq!(m.keys().collect::<Vec<_>>(), vec![0, 3, 4]);
  m.invariant();

  let c = m.cursor_from(-1);
  assert!(!c.has_previous());
  assert_eq!(c.collect::<Vec<_>>(), vec![(0, 0), (3, 3), (4, 4)]);
  let mut c = m.cursor_from(3);
  assert_eq!(c.previous(), Some((3, 3)));
  let mut c = m.cursor_from(100);
  assert_eq!(c.next(), None);
  assert_eq!(c.previous(), Some((4, 4)));
}

#[test]
fn boolean_keys() {
  let mut m = Boolean2IntRbTreeMap::new();
  m.add_to(true, 1);
  m.add_to(false, 1);
  m.add_to(true, 1);
  assert_eq!(m.iter().collect::<Vec<_>>(), vec![(false, 1), (true, 2)]);
  assert_eq!(m.head_map(true).len(), 1);
}

#[test]
fn add_to_wraps() {
  let mut m = Int2IntRbTreeMap::new();
  m.insert(1, i32::MAX);
  assert_eq!(m.add_to(1, 1), i32::MAX);
  assert_eq!(m.get(1), Some(i32::MIN));
  m.set_default_return_value(i32::MIN);
  assert_eq!(m.add_to(2, -1), i32::MIN);
  assert_eq!(m.get(2), Some(i32::MAX));
  let mut f = Int2FloatRbTreeMap::new();
  f.add_to(0, 0.5);
  f.add_to(0, 0.25);
  assert_eq!(f.get(0), Some(0.75));
  m.invariant();
}

#[test]
fn keys_from_seeks() {
  let m: Int2IntRbTreeMap = (0..50).map(|k| (k * 2, k)).collect();
  assert_eq!(m.keys_from(90).collect::<Vec<_>>(), vec![92, 94, 96, 98]);
  assert_eq!(m.keys_from(91).collect::<Vec<_>>(), vec![92, 94, 96, 98]);
  assert_eq!(m.keys_from(-5).count(), 50);
  assert_eq!(m.keys_from(98).next(), None);
  assert_eq!(m.values_from(93).rev().collect::<Vec<_>>(), vec![49, 48, 47]);
  let mut it = m.iter_from(10);
  assert_eq!(it.next(), Some((12, 6)));
  assert_eq!(it.next_back(), Some((98, 49)));
  let empty = Int2IntRbTreeMap::new();
  assert_eq!(empty.keys_from(0).next(), None);
}

#[test]
fn into_iter_and_values() {
  let m: Int2IntRbTreeMap = (0..10).rev().map(|k| (k, k * k)).collect();
  let mut total = 0;
  for (k, v) in &m {
    assert_eq!(v, k * k);
    total += v;
  }
  assert_eq!(total, m.values().sum::<i32>());
  assert_eq!(m.values().rev().next(), Some(81));
  let mut it = m.iter();
  assert_eq!(it.next(), Some((0, 0)));
  assert_eq!(it.next_back(), Some((9, 81)));
  assert_eq!(it.clone().count(), 8);
  assert_eq!(it.by_ref().rev().take(7).count(), 7);
  assert_eq!(it.next(), Some((1, 1)));
  assert_eq!(it.next(), None);
  assert_eq!(it.next_back(), None);
}
