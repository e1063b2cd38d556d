//! Key ordering.
//!
//! Every tree operation compares keys through a single [`KeyComparator`]
//! chosen when the map is built. Without an explicit comparator the map uses
//! [`Natural`], which forwards to the key type's own total order. Keys are
//! passed by value, so a custom order costs one call and no allocation.

use std::{cmp::Ordering, fmt::Debug};

/// A primitive key with a natural total order.
pub trait Key: Copy + Debug {
    fn natural_cmp(self, other: Self) -> Ordering;
}

macro_rules! integral_keys {
    ($($t:ty),*) => {
        $(
            impl Key for $t {
                #[inline]
                fn natural_cmp(self, other: Self) -> Ordering {
                    self.cmp(&other)
                }
            }
        )*
    };
}

// IEEE-754 total order: -0.0 sorts before 0.0 and NaNs are never equal to a
// number, so float keys still form a strict order.
macro_rules! float_keys {
    ($($t:ty),*) => {
        $(
            impl Key for $t {
                #[inline]
                fn natural_cmp(self, other: Self) -> Ordering {
                    self.total_cmp(&other)
                }
            }
        )*
    };
}

integral_keys!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, char, bool);
float_keys!(f32, f64);

/// A value that `add_to` can accumulate into. Integers wrap on overflow.
pub trait Increment: Copy {
    fn increment(self, by: Self) -> Self;
}

macro_rules! wrapping_increments {
    ($($t:ty),*) => {
        $(
            impl Increment for $t {
                #[inline]
                fn increment(self, by: Self) -> Self {
                    self.wrapping_add(by)
                }
            }
        )*
    };
}

macro_rules! float_increments {
    ($($t:ty),*) => {
        $(
            impl Increment for $t {
                #[inline]
                fn increment(self, by: Self) -> Self {
                    self + by
                }
            }
        )*
    };
}

wrapping_increments!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
float_increments!(f32, f64);

/// A total order over keys of type `K`.
///
/// Any closure `Fn(K, K) -> Ordering` is a comparator.
pub trait KeyComparator<K> {
    fn compare(&self, a: K, b: K) -> Ordering;
}

/// The key type's natural order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Natural;

impl<K: Key> KeyComparator<K> for Natural {
    #[inline]
    fn compare(&self, a: K, b: K) -> Ordering {
        a.natural_cmp(b)
    }
}

/// The inverse of the wrapped order.
///
/// # Examples
/// ```
/// use rbtree_primitive_map::{order::{Natural, Reversed}, RbTreeMap};
///
/// let mut m = RbTreeMap::<i32, f32, _>::with_comparator(Reversed(Natural));
/// m.insert(1, 1.0);
/// m.insert(2, 2.0);
/// assert_eq!(m.keys().collect::<Vec<_>>(), vec![2, 1]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Reversed<C>(pub C);

impl<K, C: KeyComparator<K>> KeyComparator<K> for Reversed<C> {
    #[inline]
    fn compare(&self, a: K, b: K) -> Ordering {
        self.0.compare(b, a)
    }
}

impl<K, F> KeyComparator<K> for F
where
    F: Fn(K, K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: K, b: K) -> Ordering {
        self(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_floats_are_totally_ordered() {
        assert_eq!(Natural.compare(-0.0f64, 0.0), Ordering::Less);
        assert_eq!(Natural.compare(f64::NAN, f64::NAN), Ordering::Equal);
        assert_eq!(Natural.compare(1.0f32, f32::NAN), Ordering::Less);
    }

    #[test]
    fn closures_and_reversal() {
        let by_abs = |a: i32, b: i32| a.abs().cmp(&b.abs());
        assert_eq!(by_abs.compare(-3, 2), Ordering::Greater);
        assert_eq!(Reversed(Natural).compare(1u8, 2u8), Ordering::Greater);
        assert_eq!(Natural.compare(false, true), Ordering::Less);
        assert_eq!(Natural.compare('b', 'a'), Ordering::Greater);
    }

    #[test]
    fn increments_wrap() {
        assert_eq!(i32::MAX.increment(1), i32::MIN);
        assert_eq!(0u8.increment(255), 255);
        assert_eq!(1.5f64.increment(0.25), 1.75);
    }
}
