use crate::order::KeyComparator;
use std::cmp::Ordering;

/// The key range covered by a view: `lower` is inclusive, `upper` exclusive,
/// and a missing side is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Bounds<K> {
    pub(crate) lower: Option<K>,
    pub(crate) upper: Option<K>,
}

impl<K: Copy> Bounds<K> {
    pub(crate) fn unbounded() -> Self {
        Bounds {
            lower: None,
            upper: None,
        }
    }

    #[inline]
    pub(crate) fn too_low<C: KeyComparator<K>>(&self, cmp: &C, k: K) -> bool {
        match self.lower {
            None => false,
            Some(lower) => cmp.compare(k, lower) == Ordering::Less,
        }
    }

    #[inline]
    pub(crate) fn too_high<C: KeyComparator<K>>(&self, cmp: &C, k: K) -> bool {
        match self.upper {
            None => false,
            Some(upper) => cmp.compare(k, upper) != Ordering::Less,
        }
    }

    #[inline]
    pub(crate) fn contains<C: KeyComparator<K>>(&self, cmp: &C, k: K) -> bool {
        !self.too_low(cmp, k) && !self.too_high(cmp, k)
    }

    /// the range covered by both `self` and `other`
    pub(crate) fn intersect<C: KeyComparator<K>>(&self, cmp: &C, other: &Bounds<K>) -> Self {
        let lower = match (self.lower, other.lower) {
            (Some(a), Some(b)) => Some(if cmp.compare(a, b) == Ordering::Less { b } else { a }),
            (a, b) => a.or(b),
        };
        let upper = match (self.upper, other.upper) {
            (Some(a), Some(b)) => Some(if cmp.compare(a, b) == Ordering::Greater { b } else { a }),
            (a, b) => a.or(b),
        };
        Bounds { lower, upper }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Natural;

    #[test]
    fn half_open() {
        let b = Bounds {
            lower: Some(3),
            upper: Some(7),
        };
        assert!(!b.contains(&Natural, 2));
        assert!(b.contains(&Natural, 3));
        assert!(b.contains(&Natural, 6));
        assert!(!b.contains(&Natural, 7));
        assert!(Bounds::<i32>::unbounded().contains(&Natural, i32::MIN));
    }

    #[test]
    fn intersection_narrows() {
        let a = Bounds {
            lower: Some(3),
            upper: None,
        };
        let b = Bounds {
            lower: Some(1),
            upper: Some(5),
        };
        assert_eq!(
            a.intersect(&Natural, &b),
            Bounds {
                lower: Some(3),
                upper: Some(5)
            }
        );
        assert_eq!(b.intersect(&Natural, &Bounds::unbounded()), b);
    }
}
