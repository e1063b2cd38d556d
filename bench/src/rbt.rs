use crate::utils;
use rbtree_primitive_map::Long2LongRbTreeMap;
use std::time::{Duration, Instant};

fn bench_add(len: usize) -> (Long2LongRbTreeMap, Vec<i64>, Duration) {
  let mut m = Long2LongRbTreeMap::new();
  let data = utils::randvec::<i64>(len);
  let begin = Instant::now();
  for k in &data { m.insert(*k, *k); }
  (m, data, begin.elapsed())
}

fn bench_bulk(m: &Long2LongRbTreeMap) -> Duration {
  let sorted: Vec<(i64, i64)> = m.iter().collect();
  let begin = Instant::now();
  let bulk = Long2LongRbTreeMap::from_sorted(sorted);
  let t = begin.elapsed();
  assert!(bulk.map(|b| b.len() == m.len()).unwrap_or(false));
  t
}

fn bench_find(m: &Long2LongRbTreeMap, d: &[i64]) -> Duration {
  let begin = Instant::now();
  for k in d { assert!(m.get(*k).is_some()); }
  begin.elapsed()
}

fn bench_iter(m: &Long2LongRbTreeMap) -> Duration {
  let begin = Instant::now();
  let mut sum = 0i64;
  for (_, v) in m { sum = sum.wrapping_add(v) }
  let t = begin.elapsed();
  println!("checksum {}", sum);
  t
}

fn bench_remove(m: &mut Long2LongRbTreeMap, d: &[i64]) -> Duration {
  let begin = Instant::now();
  for k in d { assert!(m.remove(*k).is_some()); }
  begin.elapsed()
}

pub(crate) fn run(size: usize) {
  let (mut m, d, add) = bench_add(size);
  let bulk = bench_bulk(&m);
  let find = bench_find(&m, &d);
  let iter = bench_iter(&m);
  let rm = bench_remove(&mut m, &d);
  println!("add: {}ms ({:.1}ns/op), bulk: {}ms, find: {}ms ({:.1}ns/op), iter: {}ms, remove: {}ms ({:.1}ns/op)",
    utils::to_ms(add), utils::to_ns_per(add, size),
    utils::to_ms(bulk),
    utils::to_ms(find), utils::to_ns_per(find, size),
    utils::to_ms(iter),
    utils::to_ms(rm), utils::to_ns_per(rm, size));
}
