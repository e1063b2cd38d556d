//! Live range views.
//!
//! A [`SubMap`] is a lens over the keys of a map between an optional
//! inclusive lower bound and an optional exclusive upper bound. It caches
//! nothing: every call walks the backing tree, so a view always reflects the
//! map as it is now. Narrowing a view intersects bounds and yields another
//! view over the same map, never a view of a view.

use crate::{
    bounds::Bounds,
    error::{Error, Result},
    iter::{Cursor, CursorMut, Iter, Keys, Values},
    map::RbTreeMap,
    order::{Increment, KeyComparator, Natural},
};
use std::{
    cmp::Ordering,
    fmt::{self, Debug, Formatter},
    ops::{Deref, DerefMut},
};

/// A bounded view over a map. `M` is either `&RbTreeMap` for a read-only
/// view or `&mut RbTreeMap` for a view that can also insert and remove.
pub struct SubMap<M, K> {
    map: M,
    bounds: Bounds<K>,
}

/// a read-only view, see [`RbTreeMap::sub_map`]
pub type SubMapRef<'a, K, V, C = Natural> = SubMap<&'a RbTreeMap<K, V, C>, K>;

/// a read/write view, see [`RbTreeMap::sub_map_mut`]
pub type SubMapMut<'a, K, V, C = Natural> = SubMap<&'a mut RbTreeMap<K, V, C>, K>;

impl<M, K> SubMap<M, K> {
    pub(crate) fn new(map: M, bounds: Bounds<K>) -> Self {
        SubMap { map, bounds }
    }
}

impl<M, K, V, C> Debug for SubMap<M, K>
where
    M: Deref<Target = RbTreeMap<K, V, C>>,
    K: Copy + Debug,
    V: Copy + Debug,
    C: KeyComparator<K>,
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<M, K, V, C> SubMap<M, K>
where
    M: Deref<Target = RbTreeMap<K, V, C>>,
    K: Copy + Debug,
    V: Copy,
    C: KeyComparator<K>,
{
    /// the inclusive lower bound, if any
    pub fn lower_bound(&self) -> Option<K> {
        self.bounds.lower
    }

    /// the exclusive upper bound, if any
    pub fn upper_bound(&self) -> Option<K> {
        self.bounds.upper
    }

    /// whether the view covers `k`, whether or not the map holds it
    pub fn in_range(&self, k: K) -> bool {
        self.bounds.contains(self.map.comparator(), k)
    }

    pub fn comparator<'s>(&'s self) -> &'s C
    where
        V: 's,
        C: 's,
    {
        self.map.comparator()
    }

    pub fn default_return_value(&self) -> V {
        self.map.default_return_value()
    }

    /// Lookup k. Keys outside the view are absent.
    pub fn get(&self, k: K) -> Option<V> {
        if self.in_range(k) {
            self.map.get(k)
        } else {
            None
        }
    }

    pub fn get_or_default(&self, k: K) -> V {
        self.get(k).unwrap_or(self.map.default_return_value())
    }

    pub fn contains_key(&self, k: K) -> bool {
        self.in_range(k) && self.map.contains_key(k)
    }

    /// Number of entries in the view. This counts them, so it is O(k) in
    /// the size of the view.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.map.tree().first_in(&self.bounds).is_none()
    }

    /// the smallest key in the view, O(log(N))
    pub fn first_key(&self) -> Result<K> {
        self.first_entry().map(|(k, _)| k).ok_or(Error::EmptyMap)
    }

    /// the largest key in the view, O(log(N))
    pub fn last_key(&self) -> Result<K> {
        self.last_entry().map(|(k, _)| k).ok_or(Error::EmptyMap)
    }

    pub fn first_entry(&self) -> Option<(K, V)> {
        let t = self.map.tree();
        t.first_in(&self.bounds).map(|id| t.entry(id))
    }

    pub fn last_entry(&self) -> Option<(K, V)> {
        let t = self.map.tree();
        t.last_in(&self.bounds).map(|id| t.entry(id))
    }

    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter::new(self.map.tree(), &self.bounds)
    }

    pub fn keys(&self) -> Keys<'_, K, V, C> {
        Keys(self.iter())
    }

    pub fn values(&self) -> Values<'_, K, V, C> {
        Values(self.iter())
    }

    /// the entries of the view whose keys sort after k
    pub fn iter_from(&self, k: K) -> Iter<'_, K, V, C> {
        Iter::new_from(self.map.tree(), &self.bounds, k)
    }

    pub fn keys_from(&self, k: K) -> Keys<'_, K, V, C> {
        Keys(self.iter_from(k))
    }

    pub fn values_from(&self, k: K) -> Values<'_, K, V, C> {
        Values(self.iter_from(k))
    }

    pub fn cursor(&self) -> Cursor<'_, K, V, C> {
        Cursor::new(self.map.tree(), self.bounds)
    }

    /// a cursor positioned just after k, confined to the view
    pub fn cursor_from(&self, k: K) -> Cursor<'_, K, V, C> {
        Cursor::new_at(self.map.tree(), self.bounds, k)
    }

    fn narrow(&self, other: Bounds<K>) -> Bounds<K> {
        self.bounds.intersect(self.map.comparator(), &other)
    }

    fn checked(&self, from: K, to: K) -> Result<Bounds<K>> {
        if self.map.comparator().compare(from, to) == Ordering::Greater {
            tracing::debug!(from = ?from, to = ?to, "rejected inverted range");
            return Err(Error::InvalidRange {
                from: format!("{:?}", from),
                to: format!("{:?}", to),
            });
        }
        Ok(self.narrow(Bounds {
            lower: Some(from),
            upper: Some(to),
        }))
    }

    /// the part of this view below `to`
    pub fn head_map(&self, to: K) -> SubMapRef<'_, K, V, C> {
        let bounds = self.narrow(Bounds { lower: None, upper: Some(to) });
        SubMap::new(&*self.map, bounds)
    }

    /// the part of this view at or above `from`
    pub fn tail_map(&self, from: K) -> SubMapRef<'_, K, V, C> {
        let bounds = self.narrow(Bounds { lower: Some(from), upper: None });
        SubMap::new(&*self.map, bounds)
    }

    /// the part of this view in `[from, to)`
    pub fn sub_map(&self, from: K, to: K) -> Result<SubMapRef<'_, K, V, C>> {
        let bounds = self.checked(from, to)?;
        Ok(SubMap::new(&*self.map, bounds))
    }
}

impl<M, K, V, C> SubMap<M, K>
where
    M: DerefMut<Target = RbTreeMap<K, V, C>>,
    K: Copy + Debug,
    V: Copy,
    C: KeyComparator<K>,
{
    fn admit(&self, k: K) -> Result<()> {
        if self.in_range(k) {
            Ok(())
        } else {
            tracing::debug!(key = ?k, bounds = ?self.bounds, "key outside view");
            Err(Error::OutOfRange {
                key: format!("{:?}", k),
            })
        }
    }

    /// Bind k to v through the view. A key the view does not cover is
    /// rejected and the map is left unchanged.
    pub fn insert(&mut self, k: K, v: V) -> Result<Option<V>> {
        self.admit(k)?;
        Ok(self.map.insert(k, v))
    }

    pub fn put(&mut self, k: K, v: V) -> Result<V> {
        self.admit(k)?;
        Ok(self.map.put(k, v))
    }

    pub fn insert_if_absent(&mut self, k: K, v: V) -> Result<Option<V>> {
        self.admit(k)?;
        Ok(self.map.insert_if_absent(k, v))
    }

    pub fn add_to(&mut self, k: K, incr: V) -> Result<V>
    where
        V: Increment,
    {
        self.admit(k)?;
        Ok(self.map.add_to(k, incr))
    }

    pub fn get_mut<'s>(&'s mut self, k: K) -> Option<&'s mut V>
    where
        V: 's,
        C: 's,
    {
        if self.in_range(k) {
            self.map.get_mut(k)
        } else {
            None
        }
    }

    /// Remove k through the view. Keys outside the view are absent, so they
    /// are never removed.
    pub fn remove(&mut self, k: K) -> Option<V> {
        if self.in_range(k) {
            self.map.remove(k)
        } else {
            None
        }
    }

    pub fn remove_or_default(&mut self, k: K) -> V {
        self.remove(k).unwrap_or(self.map.default_return_value())
    }

    pub fn pop_first(&mut self) -> Result<(K, V)> {
        let (k, v) = self.first_entry().ok_or(Error::EmptyMap)?;
        self.map.remove(k);
        Ok((k, v))
    }

    pub fn pop_last(&mut self) -> Result<(K, V)> {
        let (k, v) = self.last_entry().ok_or(Error::EmptyMap)?;
        self.map.remove(k);
        Ok((k, v))
    }

    /// remove every entry the view covers, leaving the rest of the map
    pub fn clear(&mut self) {
        let bounds = self.bounds;
        let tree = self.map.tree_mut();
        while let Some(id) = tree.first_in(&bounds) {
            let k = tree.key(id);
            tree.remove(k);
        }
    }

    pub fn cursor_mut(&mut self) -> CursorMut<'_, K, V, C> {
        CursorMut::new(self.map.tree_mut(), self.bounds)
    }

    pub fn cursor_mut_from(&mut self, k: K) -> CursorMut<'_, K, V, C> {
        CursorMut::new_at(self.map.tree_mut(), self.bounds, k)
    }

    pub fn head_map_mut(&mut self, to: K) -> SubMapMut<'_, K, V, C> {
        let bounds = self.narrow(Bounds { lower: None, upper: Some(to) });
        SubMap::new(&mut *self.map, bounds)
    }

    pub fn tail_map_mut(&mut self, from: K) -> SubMapMut<'_, K, V, C> {
        let bounds = self.narrow(Bounds { lower: Some(from), upper: None });
        SubMap::new(&mut *self.map, bounds)
    }

    pub fn sub_map_mut(&mut self, from: K, to: K) -> Result<SubMapMut<'_, K, V, C>> {
        let bounds = self.checked(from, to)?;
        Ok(SubMap::new(&mut *self.map, bounds))
    }
}

impl<'a, 'b, K, V, C> IntoIterator for &'b SubMap<&'a RbTreeMap<K, V, C>, K>
where
    K: Copy + Debug,
    V: Copy,
    C: KeyComparator<K>,
{
    type Item = (K, V);
    type IntoIter = Iter<'b, K, V, C>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten() -> RbTreeMap<i32, i32> {
        (1..=10).map(|k| (k, k * 10)).collect()
    }

    #[test]
    fn bounded_reads() {
        let m = ten();
        let s = m.sub_map(3, 7).unwrap();
        assert_eq!(s.keys().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
        assert_eq!(s.keys().rev().collect::<Vec<_>>(), vec![6, 5, 4, 3]);
        assert_eq!(s.len(), 4);
        assert_eq!(s.first_key(), Ok(3));
        assert_eq!(s.last_key(), Ok(6));
        assert_eq!(s.get(7), None);
        assert_eq!(s.get(5), Some(50));
        assert!(!s.contains_key(2));
        assert!(s.in_range(3) && !s.in_range(7));
        assert_eq!(s.get_or_default(8), 0);
    }

    #[test]
    fn empty_view() {
        let m = ten();
        let s = m.sub_map(11, 20).unwrap();
        assert!(s.is_empty());
        assert_eq!(s.first_key(), Err(Error::EmptyMap));
        assert_eq!(s.iter().next(), None);
        let s = m.sub_map(4, 4).unwrap();
        assert!(s.is_empty());
        assert_eq!(s.len(), 0);
    }

    #[test]
    fn nested_views_intersect() {
        let m = ten();
        let s = m.tail_map(4);
        let h = s.head_map(8);
        assert_eq!((h.lower_bound(), h.upper_bound()), (Some(4), Some(8)));
        assert_eq!(h.keys().collect::<Vec<_>>(), vec![4, 5, 6, 7]);
        let n = h.sub_map(1, 6).unwrap();
        assert_eq!(n.keys().collect::<Vec<_>>(), vec![4, 5]);
        assert!(h.sub_map(6, 1).is_err());
        assert!(m.head_map(0).is_empty());
    }

    #[test]
    fn writes_stay_inside() {
        let mut m = ten();
        {
            let mut s = m.sub_map_mut(3, 7).unwrap();
            assert_eq!(s.insert(3, 33), Ok(Some(30)));
            assert_eq!(
                s.insert(10, 0),
                Err(Error::OutOfRange {
                    key: "10".to_string()
                })
            );
            assert_eq!(s.put(7, 0), Err(Error::OutOfRange { key: "7".into() }));
            assert_eq!(s.remove(9), None);
            assert_eq!(s.remove(4), Some(40));
            assert_eq!(s.add_to(5, 1), Ok(50));
            if let Some(v) = s.get_mut(6) {
                *v = 66
            }
            assert!(s.get_mut(1).is_none());
            assert_eq!(s.pop_last(), Ok((6, 66)));
        }
        m.invariant();
        assert_eq!(m.get(3), Some(33));
        assert_eq!(m.get(4), None);
        assert_eq!(m.get(5), Some(51));
        assert_eq!(m.get(9), Some(90));
        assert_eq!(m.get(10), Some(100));
        assert_eq!(m.len(), 8);
    }

    #[test]
    fn view_sees_later_changes() {
        let mut m = ten();
        {
            let mut s = m.tail_map_mut(5);
            s.clear();
            assert!(s.is_empty());
            s.insert(100, 1).unwrap();
            assert_eq!(s.first_key(), Ok(100));
        }
        m.invariant();
        assert_eq!(m.keys().collect::<Vec<_>>(), vec![1, 2, 3, 4, 100]);
        m.insert(6, 6);
        assert_eq!(m.tail_map(5).keys().collect::<Vec<_>>(), vec![6, 100]);
    }

    #[test]
    fn cursor_confined_to_view() {
        let mut m = ten();
        let s = m.sub_map(3, 7).unwrap();
        let mut c = s.cursor_from(5);
        assert_eq!(c.next(), Some((6, 60)));
        assert!(!c.has_next());
        assert_eq!(c.retreat(10), 4);
        assert!(!c.has_previous());
        let mut s = m.head_map_mut(5);
        let mut c = s.cursor_mut();
        while let Some((k, _)) = c.next() {
            if k % 2 == 0 {
                c.set_value(-1).unwrap();
            } else {
                c.remove().unwrap();
            }
        }
        assert_eq!(
            m.iter().take(5).collect::<Vec<_>>(),
            vec![(2, -1), (4, -1), (5, 50), (6, 60), (7, 70)]
        );
        m.invariant();
    }

    #[test]
    fn reversed_order_views() {
        use crate::order::Reversed;
        let mut m = RbTreeMap::<i32, i32, _>::with_comparator(Reversed(Natural));
        m.extend((1..=10).map(|k| (k, k)));
        let s = m.sub_map(8, 4).unwrap();
        assert_eq!(s.keys().collect::<Vec<_>>(), vec![8, 7, 6, 5]);
        assert_eq!(*s.comparator(), Reversed(Natural));
        assert!(m.sub_map(4, 8).is_err());
        let mut w = m.sub_map_mut(8, 4).unwrap();
        assert_eq!(*w.comparator(), Reversed(Natural));
        *w.get_mut(6).unwrap() += 100;
        assert_eq!(w.get_mut(3), None);
        assert_eq!(m.get(6), Some(106));
    }

    #[test]
    fn seek_inside_view() {
        let m = ten();
        let s = m.sub_map(3, 8).unwrap();
        assert_eq!(s.keys_from(5).collect::<Vec<_>>(), vec![6, 7]);
        assert_eq!(s.keys_from(0).collect::<Vec<_>>(), vec![3, 4, 5, 6, 7]);
        assert_eq!(s.keys_from(7).next(), None);
        assert_eq!(s.keys_from(50).next(), None);
        assert_eq!(s.values_from(4).rev().collect::<Vec<_>>(), vec![70, 60, 50]);
        assert_eq!(s.iter_from(6).next(), Some((7, 70)));
        let e = m.sub_map(4, 4).unwrap();
        assert_eq!(e.keys_from(1).next(), None);
    }
}
