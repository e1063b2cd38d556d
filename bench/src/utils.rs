use rand::Rng;
use std::{collections::HashSet, time::Duration};

pub(crate) trait Rand: Sized {
  fn rand<R: Rng>(r: &mut R) -> Self;
}

impl Rand for i64 {
  fn rand<R: Rng>(r: &mut R) -> Self { r.gen() }
}

/// `len` distinct random keys
pub(crate) fn randvec<T>(len: usize) -> Vec<T>
where T: Rand + Eq + std::hash::Hash + Copy
{
  let mut rng = rand::thread_rng();
  let mut seen = HashSet::with_capacity(len);
  let mut v = Vec::with_capacity(len);
  while v.len() < len {
    let k = T::rand(&mut rng);
    if seen.insert(k) { v.push(k) }
  }
  v
}

pub(crate) fn to_ms(t: Duration) -> u64 {
  t.as_secs() * 1000 + ((t.subsec_nanos() / 1000000) as u64)
}

pub(crate) fn to_ns_per(t: Duration, n: usize) -> f64 {
  (t.as_nanos() as f64) / (n as f64)
}
