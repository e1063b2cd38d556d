use crate::utils;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

fn bench_add(len: usize) -> (BTreeMap<i64, i64>, Vec<i64>, Duration) {
  let mut m = BTreeMap::new();
  let data = utils::randvec::<i64>(len);
  let begin = Instant::now();
  for k in &data { m.insert(*k, *k); }
  (m, data, begin.elapsed())
}

fn bench_find(m: &BTreeMap<i64, i64>, d: &[i64]) -> Duration {
  let begin = Instant::now();
  for k in d { assert!(m.get(k).is_some()); }
  begin.elapsed()
}

fn bench_iter(m: &BTreeMap<i64, i64>) -> Duration {
  let begin = Instant::now();
  let mut sum = 0i64;
  for (_, v) in m { sum = sum.wrapping_add(*v) }
  let t = begin.elapsed();
  println!("checksum {}", sum);
  t
}

fn bench_remove(m: &mut BTreeMap<i64, i64>, d: &[i64]) -> Duration {
  let begin = Instant::now();
  for k in d { assert!(m.remove(k).is_some()); }
  begin.elapsed()
}

pub(crate) fn run(size: usize) {
  let (mut m, d, add) = bench_add(size);
  let find = bench_find(&m, &d);
  let iter = bench_iter(&m);
  let rm = bench_remove(&mut m, &d);
  println!("add: {}ms ({:.1}ns/op), find: {}ms ({:.1}ns/op), iter: {}ms, remove: {}ms ({:.1}ns/op)",
    utils::to_ms(add), utils::to_ns_per(add, size),
    utils::to_ms(find), utils::to_ns_per(find, size),
    utils::to_ms(iter),
    utils::to_ms(rm), utils::to_ns_per(rm, size));
}
